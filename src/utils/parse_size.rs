/// Parses a human-readable byte size such as `512`, `64k`, `16MB` or `1g`.
///
/// Units are binary (`k` = 1024). A missing unit means bytes.
pub fn parse_size(size_str: &str) -> Result<usize, String> {
    let size_str = size_str.trim().to_ascii_lowercase();

    let num_end = size_str
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(size_str.len());

    let (num_part, unit_part) = size_str.split_at(num_end);

    let multiplier: usize = match unit_part.trim() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => 1024,
        "m" | "mb" | "mib" => 1024 * 1024,
        "g" | "gb" | "gib" => 1024 * 1024 * 1024,
        other => return Err(format!("Invalid size unit: {other}")),
    };

    num_part
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(|| format!("Failed to parse size: {size_str}"))
}
