//! Conversion helpers for values supplied as text.

use alloy_primitives::U256;

/// Parses a token amount given as a base-10 string into a `uint256`.
///
/// Rejects empty input, signs, decimal points, hex and anything wider than 256 bits.
pub fn parse_token_amount(raw: &str) -> Result<U256, String> {
	let trimmed = raw.trim();
	if trimmed.is_empty() {
		return Err("amount is empty".to_string());
	}
	if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
		return Err(format!(
			"amount '{}' is not a non-negative decimal integer",
			raw
		));
	}
	U256::from_str_radix(trimmed, 10)
		.map_err(|e| format!("amount '{}' does not fit in uint256: {}", raw, e))
}
