//! Cross-currency conversion through the pivot currency

use super::currency::ExchangeRateSet;
use super::error::ConversionError;

/// Converts `amount` of `from` into `to` using `rates`.
///
/// The amount is first expressed in pivot units, then in `to`. A missing or
/// zero quote is reported as [`ConversionError::UnsupportedCurrency`]. No
/// rounding is applied.
pub fn convert(
    amount: f64,
    from: &str,
    to: &str,
    rates: &ExchangeRateSet,
) -> Result<f64, ConversionError> {
    let from_rate = usable_rate(rates, from)?;
    let to_rate = usable_rate(rates, to)?;
    Ok(amount / from_rate * to_rate)
}

fn usable_rate(rates: &ExchangeRateSet, code: &str) -> Result<f64, ConversionError> {
    match rates.rate_of(code) {
        Some(rate) if rate != 0.0 && rate.is_finite() => Ok(rate),
        _ => Err(ConversionError::UnsupportedCurrency(code.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn rates(quotes: &[(&str, f64)]) -> ExchangeRateSet {
        ExchangeRateSet {
            timestamp: 0,
            source: "USD".to_string(),
            quotes: quotes
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_usd_pivot_conversion() {
        let rates = rates(&[("USDBRL", 5.6), ("USDEUR", 0.92)]);

        let brl = convert(560.0, "USD", "BRL", &rates).unwrap();
        assert!((brl - 3136.0).abs() < 0.01);

        let eur = convert(100.0, "BRL", "EUR", &rates).unwrap();
        assert!((eur - 16.43).abs() < 0.01);

        let usd = convert(92.0, "EUR", "USD", &rates).unwrap();
        assert!((usd - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_currency_is_identity() {
        let rates = rates(&[("USDBRL", 5.6), ("USDEUR", 0.92)]);
        for code in ["USD", "BRL", "EUR"] {
            for amount in [0.01, 1.0, 250.5, 1e9] {
                let converted = convert(amount, code, code, &rates).unwrap();
                assert!((converted - amount).abs() <= amount * 1e-12);
            }
        }
    }

    #[test]
    fn test_matches_formula() {
        let rates = rates(&[("USDBRL", 5.6), ("USDEUR", 0.92), ("USDJPY", 149.3)]);
        let converted = convert(42.0, "JPY", "BRL", &rates).unwrap();
        assert_eq!(converted, 42.0 / 149.3 * 5.6);
    }

    #[test]
    fn test_unsupported_currency() {
        let rates = rates(&[("USDBRL", 5.6)]);
        assert_eq!(
            convert(100.0, "XYZ", "BRL", &rates),
            Err(ConversionError::UnsupportedCurrency("XYZ".to_string()))
        );
        assert_eq!(
            convert(100.0, "BRL", "ABC", &rates),
            Err(ConversionError::UnsupportedCurrency("ABC".to_string()))
        );
    }

    #[test]
    fn test_zero_quote_is_unsupported() {
        let rates = rates(&[("USDBRL", 5.6), ("USDVES", 0.0)]);
        assert_eq!(
            convert(10.0, "VES", "BRL", &rates),
            Err(ConversionError::UnsupportedCurrency("VES".to_string()))
        );
        assert_eq!(
            convert(10.0, "BRL", "VES", &rates),
            Err(ConversionError::UnsupportedCurrency("VES".to_string()))
        );
    }

    #[test]
    fn test_non_positive_amounts_are_allowed() {
        let rates = rates(&[("USDBRL", 5.6)]);
        assert_eq!(convert(0.0, "USD", "BRL", &rates).unwrap(), 0.0);
        assert!((convert(-10.0, "USD", "BRL", &rates).unwrap() + 56.0).abs() < 1e-9);
    }
}
