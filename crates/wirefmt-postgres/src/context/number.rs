//! Locale-style number formatting.
//!
//! Numbers cross the codec boundary as canonical decimal text (`-1234.5`)
//! or as scaled integers (cents). A [`NumberFormat`] converts those to and
//! from the separators and symbols of the session's locale.

use serde::Deserialize;
use wirefmt_core::{Error, Result};

/// Separators, fraction padding and currency symbol for one kind of number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    /// Thousands separator, if digits are grouped
    pub grouping_separator: Option<char>,
    pub decimal_separator: char,
    /// Pad fractions with zeros up to this many digits
    pub min_fraction_digits: u8,
    /// Symbol printed before the digits
    pub currency_symbol: Option<String>,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::decimal()
    }
}

impl NumberFormat {
    /// Plain integers: no grouping, no fraction.
    pub fn integer() -> Self {
        Self {
            grouping_separator: None,
            decimal_separator: '.',
            min_fraction_digits: 0,
            currency_symbol: None,
        }
    }

    /// Plain decimals.
    pub fn decimal() -> Self {
        Self::integer()
    }

    /// Currency amounts the way the server prints `money` under `lc_monetary = C`
    /// with a dollar sign: `$1,234.50`, `-$0.01`.
    pub fn currency(symbol: impl Into<String>) -> Self {
        Self {
            grouping_separator: Some(','),
            decimal_separator: '.',
            min_fraction_digits: 2,
            currency_symbol: Some(symbol.into()),
        }
    }

    pub fn format_integer(&self, value: i64) -> String {
        self.render(value < 0, &value.unsigned_abs().to_string(), "")
    }

    pub fn parse_integer(&self, text: &str) -> Result<i64> {
        let canonical = self.parse_decimal(text)?;
        if canonical.contains('.') {
            return Err(Error::type_mismatch("integer", text));
        }
        canonical
            .parse()
            .map_err(|_| Error::type_mismatch("integer", text))
    }

    /// Format canonical decimal text (`-1234.5`).
    pub fn format_decimal(&self, canonical: &str) -> Result<String> {
        let (negative, int_part, frac_part) = split_canonical(canonical)
            .ok_or_else(|| Error::type_mismatch("decimal", canonical))?;
        Ok(self.render(negative, int_part, frac_part))
    }

    /// Parse locale text back into canonical decimal text.
    ///
    /// Accepts a leading `-` or surrounding parentheses for negatives, the
    /// currency symbol, and grouping separators anywhere in the integer part.
    pub fn parse_decimal(&self, text: &str) -> Result<String> {
        let invalid = || Error::type_mismatch("number", text);

        let mut rest = text.trim();
        let mut negative = false;
        if let Some(inner) = rest.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
            negative = true;
            rest = inner.trim();
        }
        if let Some(r) = rest.strip_prefix('-') {
            negative = !negative;
            rest = r.trim_start();
        }
        if let Some(symbol) = &self.currency_symbol {
            if let Some(r) = rest.strip_prefix(symbol.as_str()) {
                rest = r.trim_start();
            }
        }

        let (int_text, frac_text) = match rest.split_once(self.decimal_separator) {
            Some((i, f)) => (i, f),
            None => (rest, ""),
        };

        let int_digits: String = int_text
            .chars()
            .filter(|c| Some(*c) != self.grouping_separator)
            .collect();
        if int_digits.is_empty() || !int_digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if !frac_text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let int_digits = int_digits.trim_start_matches('0');
        let int_digits = if int_digits.is_empty() { "0" } else { int_digits };
        let is_zero = int_digits == "0" && frac_text.bytes().all(|b| b == b'0');

        let mut out = String::with_capacity(int_digits.len() + frac_text.len() + 2);
        if negative && !is_zero {
            out.push('-');
        }
        out.push_str(int_digits);
        if !frac_text.is_empty() {
            out.push('.');
            out.push_str(frac_text);
        }
        Ok(out)
    }

    /// Format an integer count of `10^-scale` units, e.g. cents with `scale = 2`.
    pub fn format_scaled(&self, units: i64, scale: u32) -> String {
        let scale = scale as usize;
        let digits = format!("{:0width$}", units.unsigned_abs(), width = scale + 1);
        let (int_part, frac_part) = digits.split_at(digits.len() - scale);
        self.render(units < 0, int_part, frac_part)
    }

    /// Parse locale text into an integer count of `10^-scale` units.
    ///
    /// Fractions with more than `scale` digits are rejected rather than rounded.
    pub fn parse_scaled(&self, text: &str, scale: u32) -> Result<i64> {
        let canonical = self.parse_decimal(text)?;
        let (negative, int_part, frac_part) =
            split_canonical(&canonical).ok_or_else(|| Error::type_mismatch("number", text))?;
        let frac_part = frac_part.trim_end_matches('0');
        if frac_part.len() > scale as usize {
            return Err(Error::type_mismatch("number within the fraction digits of its scale", text));
        }

        let overflow = || Error::type_mismatch("amount within range", text);
        let pow10 = |exp: u32| 10_i128.checked_pow(exp).ok_or_else(overflow);
        let int_units: i128 = int_part.parse().map_err(|_| overflow())?;
        let mut units = int_units.checked_mul(pow10(scale)?).ok_or_else(overflow)?;
        if !frac_part.is_empty() {
            let frac: i128 = frac_part.parse().map_err(|_| overflow())?;
            let frac_units = frac
                .checked_mul(pow10(scale - frac_part.len() as u32)?)
                .ok_or_else(overflow)?;
            units = units.checked_add(frac_units).ok_or_else(overflow)?;
        }
        if negative {
            units = -units;
        }
        i64::try_from(units).map_err(|_| overflow())
    }

    fn render(&self, negative: bool, int_digits: &str, frac_digits: &str) -> String {
        let mut out = String::with_capacity(int_digits.len() * 4 / 3 + frac_digits.len() + 4);
        if negative {
            out.push('-');
        }
        if let Some(symbol) = &self.currency_symbol {
            out.push_str(symbol);
        }

        match self.grouping_separator {
            Some(sep) => {
                let len = int_digits.len();
                for (i, c) in int_digits.chars().enumerate() {
                    if i > 0 && (len - i) % 3 == 0 {
                        out.push(sep);
                    }
                    out.push(c);
                }
            }
            None => out.push_str(int_digits),
        }

        let min = usize::from(self.min_fraction_digits);
        if !frac_digits.is_empty() || min > 0 {
            out.push(self.decimal_separator);
            out.push_str(frac_digits);
            for _ in frac_digits.len()..min {
                out.push('0');
            }
        }
        out
    }
}

/// Split `-123.45` into `(true, "123", "45")`.
fn split_canonical(s: &str) -> Option<(bool, &str, &str)> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    let valid = !int_part.is_empty()
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit());
    valid.then_some((negative, int_part, frac_part))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_format() {
        let fmt = NumberFormat::integer();
        assert_eq!(fmt.format_integer(-1_234_567), "-1234567");
        assert_eq!(fmt.format_integer(i64::MIN), "-9223372036854775808");
        assert_eq!(fmt.parse_integer("0042").unwrap(), 42);
        assert!(fmt.parse_integer("4.2").is_err());
    }

    #[test]
    fn test_grouped_decimal() {
        let fmt = NumberFormat {
            grouping_separator: Some('.'),
            decimal_separator: ',',
            min_fraction_digits: 2,
            currency_symbol: None,
        };
        assert_eq!(fmt.format_decimal("1234567.5").unwrap(), "1.234.567,50");
        assert_eq!(fmt.parse_decimal("1.234.567,50").unwrap(), "1234567.50");
        assert_eq!(fmt.format_decimal("-12").unwrap(), "-12,00");
        assert!(fmt.format_decimal("12a").is_err());
    }

    #[test]
    fn test_currency_format() {
        let fmt = NumberFormat::currency("$");
        assert_eq!(fmt.format_scaled(123_450, 2), "$1,234.50");
        assert_eq!(fmt.format_scaled(-1, 2), "-$0.01");
        assert_eq!(fmt.format_scaled(100_000_000, 2), "$1,000,000.00");
        assert_eq!(
            fmt.format_scaled(i64::MIN, 2),
            "-$92,233,720,368,547,758.08"
        );
    }

    #[test]
    fn test_currency_parse() {
        let fmt = NumberFormat::currency("$");
        assert_eq!(fmt.parse_scaled("$1,234.50", 2).unwrap(), 123_450);
        assert_eq!(fmt.parse_scaled("-$0.01", 2).unwrap(), -1);
        assert_eq!(fmt.parse_scaled("($5.00)", 2).unwrap(), -500);
        assert_eq!(fmt.parse_scaled("7", 2).unwrap(), 700);
        assert_eq!(
            fmt.parse_scaled("-$92,233,720,368,547,758.08", 2).unwrap(),
            i64::MIN
        );
        assert!(fmt.parse_scaled("$0.001", 2).is_err());
        assert!(fmt.parse_scaled("$92,233,720,368,547,758.08", 2).is_err());
        assert!(fmt.parse_scaled("$", 2).is_err());
    }

    #[test]
    fn test_scaled_parse_overflow_is_type_error() {
        let fmt = NumberFormat::currency("$");
        let huge = format!("${}.00", "1".repeat(39));
        assert!(matches!(fmt.parse_scaled(&huge, 2), Err(Error::Type(_))));
        let fits_i128 = format!("1{}", "0".repeat(38));
        assert!(matches!(fmt.parse_scaled(&fits_i128, 2), Err(Error::Type(_))));
        assert!(matches!(fmt.parse_scaled("1", 40), Err(Error::Type(_))));
    }

    #[test]
    fn test_scaled_format_any_scale() {
        let fmt = NumberFormat::decimal();
        assert_eq!(fmt.format_scaled(5, 0), "5");
        assert_eq!(fmt.format_scaled(-5, 3), "-0.005");
        assert_eq!(fmt.format_scaled(12, 25), format!("0.{}12", "0".repeat(23)));
        assert_eq!(
            fmt.format_scaled(i64::MAX, 19),
            "0.9223372036854775807"
        );
    }

    #[test]
    fn test_negative_zero_is_zero() {
        let fmt = NumberFormat::decimal();
        assert_eq!(fmt.parse_decimal("-0.00").unwrap(), "0.00");
    }
}
