//! Locale-aware number formatting.

use super::Locale;

/// Fraction digits kept when the caller does not ask for a fixed count.
pub const DEFAULT_MAX_FRACTION_DIGITS: usize = 3;

/// Largest fixed fraction digit count; larger requests are clamped.
pub const MAX_FRACTION_DIGITS: usize = 20;

/// Grouping and decimal separators for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    grouping: char,
    decimal: char,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            grouping: ',',
            decimal: '.',
        }
    }
}

impl NumberFormat {
    /// Separators for the given locale; unknown languages use `1,234.5`.
    pub fn for_locale(locale: &Locale) -> Self {
        let (grouping, decimal) = match (locale.language(), locale.country()) {
            ("de", Some("CH")) | ("it", Some("CH")) => ('\'', '.'),
            ("de" | "es" | "it" | "nl" | "pt" | "id" | "da" | "tr" | "el" | "ro", _) => ('.', ','),
            ("fr" | "ru" | "pl" | "cs" | "sk" | "sv" | "fi" | "nb" | "no" | "uk" | "hu", _) => {
                ('\u{a0}', ',')
            }
            _ => (',', '.'),
        };
        Self { grouping, decimal }
    }

    /// Grouping separator.
    pub fn grouping(&self) -> char {
        self.grouping
    }

    /// Decimal separator.
    pub fn decimal(&self) -> char {
        self.decimal
    }

    /// Format an integer with grouping separators.
    pub fn format_integer(&self, value: i64) -> String {
        let digits = value.unsigned_abs().to_string();
        let grouped = self.group(&digits);
        if value < 0 {
            format!("-{grouped}")
        } else {
            grouped
        }
    }

    /// Format a float.
    ///
    /// With `fraction_digits` the output has exactly that many fraction
    /// digits, at most [`MAX_FRACTION_DIGITS`]; without it up to three are
    /// kept and trailing zeros dropped.
    pub fn format(&self, value: f64, fraction_digits: Option<usize>) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        if value.is_infinite() {
            return if value < 0.0 { "-\u{221e}" } else { "\u{221e}" }.to_string();
        }

        let digits = fraction_digits
            .unwrap_or(DEFAULT_MAX_FRACTION_DIGITS)
            .min(MAX_FRACTION_DIGITS);
        let mut plain = format!("{:.*}", digits, value.abs());
        if fraction_digits.is_none() && plain.contains('.') {
            let trimmed = plain.trim_end_matches('0').trim_end_matches('.').len();
            plain.truncate(trimmed);
        }

        let (int_part, frac_part) = match plain.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (plain.as_str(), None),
        };

        let mut out = String::with_capacity(plain.len() + plain.len() / 3 + 1);
        let is_zero = plain.chars().all(|c| c == '0' || c == '.');
        if value.is_sign_negative() && !is_zero {
            out.push('-');
        }
        out.push_str(&self.group(int_part));
        if let Some(frac) = frac_part {
            out.push(self.decimal);
            out.push_str(frac);
        }
        out
    }

    fn group(&self, digits: &str) -> String {
        let len = digits.len();
        let mut out = String::with_capacity(len + len / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push(self.grouping);
            }
            out.push(c);
        }
        out
    }
}
