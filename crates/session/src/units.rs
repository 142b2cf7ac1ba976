//! Conversion between human-entered decimal amounts and integer smallest units.

use crate::AmountError;
use alloy_primitives::{
    U256,
    utils::{ParseUnits, format_units, parse_units},
};

/// Decimals of the native currency.
pub const NATIVE_DECIMALS: u8 = 18;

/// Converts a decimal string such as `"1.5"` into the smallest unit of a token with `decimals`.
pub fn to_smallest_unit(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    let trimmed = amount.trim();
    match parse_units(trimmed, decimals) {
        Ok(ParseUnits::U256(value)) => Ok(value),
        Ok(ParseUnits::I256(_)) => Err(AmountError::Negative(trimmed.to_string())),
        Err(source) => Err(AmountError::Invalid { amount: trimmed.to_string(), source }),
    }
}

/// Formats a smallest-unit amount as a decimal string without trailing zeros.
pub fn format_smallest_unit(value: U256, decimals: u8) -> String {
    let Ok(formatted) = format_units(value, decimals) else {
        return value.to_string();
    };
    if !formatted.contains('.') {
        return formatted;
    }
    let trimmed = formatted.trim_end_matches('0');
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    trimmed.to_string()
}
