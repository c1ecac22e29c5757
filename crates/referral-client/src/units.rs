//! Fixed-point token amounts to display strings

use alloy_primitives::U256;

use crate::constants::PLACEHOLDER;

fn scale(decimals: u8) -> Option<U256> {
    U256::from(10u64).checked_pow(U256::from(decimals))
}

/// Whole tokens to base units (`tokens * 10^decimals`), None on overflow
pub fn parse_whole_units(tokens: u64, decimals: u8) -> Option<U256> {
    scale(decimals)?.checked_mul(U256::from(tokens))
}

/// Format a base-unit amount as a decimal string.
///
/// The integer part is kept in full; the fraction drops trailing zeros (a whole
/// amount keeps one `0`, e.g. `"1.0"`) and is then cut to `max_frac` digits
/// without rounding. Returns `-` when the scale does not fit in 256 bits.
pub fn format_units(value: U256, decimals: u8, max_frac: usize) -> String {
    let Some(scale) = scale(decimals) else {
        return PLACEHOLDER.to_string();
    };

    let whole = value / scale;
    let fraction = value % scale;

    let padded = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    let trimmed = padded.trim_end_matches('0');
    let fraction = if trimmed.is_empty() { "0" } else { trimmed };

    let kept = &fraction[..fraction.len().min(max_frac)];
    if kept.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, kept)
    }
}

/// Format a decimal base-unit string, `-` if it does not parse
pub fn format_units_str(raw: &str, decimals: u8, max_frac: usize) -> String {
    match U256::from_str_radix(raw.trim(), 10) {
        Ok(value) => format_units(value, decimals, max_frac),
        Err(_) => PLACEHOLDER.to_string(),
    }
}
