/// Renders a byte count with a binary unit suffix.
///
/// Sizes below 1 KB are printed as raw bytes; larger sizes use two decimals.
///
/// # Examples
/// ```
/// use checkout_index::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 bytes");
/// assert_eq!(format_bytes(2048), "2.00 KB");
/// assert_eq!(format_bytes(524_288), "512.00 KB");
/// assert_eq!(format_bytes(5_242_880), "5.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [(&str, u64); 4] = [
        ("TB", 1 << 40),
        ("GB", 1 << 30),
        ("MB", 1 << 20),
        ("KB", 1 << 10),
    ];

    UNITS
        .iter()
        .find(|&&(_, scale)| bytes >= scale)
        .map(|&(unit, scale)| format!("{:.2} {unit}", bytes as f64 / scale as f64))
        .unwrap_or_else(|| format!("{bytes} bytes"))
}
