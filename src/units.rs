use ethers::types::U256;
use ethers::utils::{format_units, parse_units};
use eyre::{bail, Result, WrapErr};

/// Converts a base-unit price into the decimal string shown to the user.
/// Trailing fractional zeros are trimmed down to a single digit, so one
/// whole unit renders as "1.0" rather than "1.000000000000000000".
pub fn to_decimal_string(value: U256) -> Result<String> {
    let formatted = format_units(value, "ether").wrap_err("format price")?;
    let trimmed = formatted.trim_end_matches('0');

    if trimmed.ends_with('.') {
        Ok(format!("{}0", trimmed))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Converts a decimal price string back into base units. Exact inverse of
/// `to_decimal_string` for every value that function produces.
pub fn to_base_units(value: &str) -> Result<U256> {
    let value = value.trim();
    if value.starts_with('-') {
        bail!("price must be a non-negative decimal, got {:?}", value);
    }

    let parsed =
        parse_units(value, "ether").wrap_err_with(|| format!("parse price {:?}", value))?;

    Ok(parsed.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_whole_units() {
        assert_eq!(to_decimal_string(U256::exp10(18)).unwrap(), "1.0");
        assert_eq!(to_decimal_string(U256::zero()).unwrap(), "0.0");
    }

    #[test]
    fn keeps_significant_fraction_digits() {
        let value = U256::from(1_500_000_000_000_000_000u64);
        assert_eq!(to_decimal_string(value).unwrap(), "1.5");
        assert_eq!(
            to_decimal_string(U256::one()).unwrap(),
            "0.000000000000000001"
        );
    }

    #[test]
    fn parses_display_strings_back_to_base_units() {
        assert_eq!(to_base_units("1.0").unwrap(), U256::exp10(18));
        assert_eq!(
            to_base_units("0.5").unwrap(),
            U256::exp10(17) * U256::from(5u64)
        );
    }

    #[test]
    fn round_trips_exactly() {
        let samples = [
            U256::zero(),
            U256::one(),
            U256::exp10(18),
            U256::from(1_234_567_890_123_456_789u64),
            U256::exp10(24) + U256::one(),
        ];

        for value in samples {
            let display = to_decimal_string(value).unwrap();
            assert_eq!(to_base_units(&display).unwrap(), value, "via {}", display);
        }
    }

    #[test]
    fn rejects_negative_prices() {
        assert!(to_base_units("-1.0").is_err());
    }

    #[test]
    fn rejects_garbage_prices() {
        assert!(to_base_units("not-a-price").is_err());
    }
}
