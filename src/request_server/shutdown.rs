use std::io;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative stop request shared between a serve loop and whoever wants it
/// stopped. The loop checks it between requests; an in-flight request always
/// runs to completion.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Flag raised by the process-wide signal handler.
static SIGNAL_TARGET: OnceLock<ShutdownFlag> = OnceLock::new();

/// Routes SIGINT and SIGTERM to `flag`.
///
/// The handler only raises the flag. Both transports wait for clients in
/// short polls, so the serve loop sees it within one poll interval. Only the
/// first call installs handlers; later calls are no-ops.
#[cfg(unix)]
pub fn install_signal_handlers(flag: &ShutdownFlag) -> io::Result<()> {
    if SIGNAL_TARGET.set(flag.clone()).is_err() {
        return Ok(());
    }

    for signal in [libc::SIGINT, libc::SIGTERM] {
        // SAFETY: `action` is fully initialized before use, and the handler
        // only performs an atomic store.
        let rc = unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
            action.sa_flags = 0;
            libc::sigemptyset(&mut action.sa_mask);
            libc::sigaction(signal, &action, std::ptr::null_mut())
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
    }

    Ok(())
}

#[cfg(not(unix))]
pub fn install_signal_handlers(flag: &ShutdownFlag) -> io::Result<()> {
    let _ = SIGNAL_TARGET.set(flag.clone());
    Ok(())
}

#[cfg(unix)]
extern "C" fn on_signal(_signal: libc::c_int) {
    if let Some(flag) = SIGNAL_TARGET.get() {
        flag.request();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let flag = ShutdownFlag::new();
        let observer = flag.clone();
        assert!(!observer.is_requested());
        flag.request();
        assert!(observer.is_requested());
    }
}
