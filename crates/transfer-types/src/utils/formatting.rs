//! Hex string formatting helpers used when logging and printing orders.

/// Shortens a hex identifier (nonce, hash) for log output.
///
/// Keeps the `0x` prefix plus the first 8 hex digits.
pub fn truncate_id(id: &str) -> String {
	let digits = without_0x_prefix(id);
	if digits.len() <= 8 {
		with_0x_prefix(digits)
	} else {
		format!("0x{}..", &digits[..8])
	}
}

/// Adds the "0x" prefix to a hex string if it doesn't already have one.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.starts_with("0x") || hex_str.starts_with("0X") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Removes the "0x" or "0X" prefix from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}
