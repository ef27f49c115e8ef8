//! Numeral formatting for amounts shown to participants and written to
//! exported sheets.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumeralStyle {
    #[default]
    Western,
    /// Extended Arabic-Indic digits (U+06F0..U+06F9).
    Persian,
}

impl NumeralStyle {
    /// Format a signed amount. Negative values keep an ASCII `-` prefix.
    pub fn format_amount(self, amount: i64) -> String {
        let digits = amount.unsigned_abs().to_string();
        let body: String = match self {
            NumeralStyle::Western => digits,
            NumeralStyle::Persian => digits.chars().map(persian_digit).collect(),
        };
        if amount < 0 {
            format!("-{body}")
        } else {
            body
        }
    }
}

fn persian_digit(c: char) -> char {
    match c.to_digit(10) {
        Some(d) => char::from_u32(0x06F0 + d).unwrap_or(c),
        None => c,
    }
}
