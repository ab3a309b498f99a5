use indoc::indoc;

// Help text template with placeholder for the binary name.
pub const HELP_TEMPLATE: &str = indoc! {r#"
    Examples:
      # Serve the index in the current directory on a random port on 127.0.0.1
      %BINARY_NAME% .

      # Listen on a specific host and port
      %BINARY_NAME% /srv/checkouts --listen 0.0.0.0:7000

      # Cap each response at 16 MiB
      %BINARY_NAME% /srv/checkouts --listen 127.0.0.1:7000 --max-response-size 16M

    Requests are `id|year|month` terminated by a newline or NUL byte.
    Each response is terminated by a NUL byte.
"#};
