use std::borrow::Cow;
use std::fmt;

/// Text a user types in the date field to ask for the current date.
pub const DATE_SENTINEL: &str = "a";

/// A single ledger record. Entries are immutable once appended; corrections are
/// made by appending new records, never by rewriting lines.
///
/// Line breaks inside a field are replaced with spaces, so one entry is always
/// exactly one ledger line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Amount in its literal text form (already checked to be numeric)
    pub amount: String,
    /// Free text, not checked for embedded delimiters
    pub description: String,
    /// Either user-supplied text or a resolved timestamp
    pub date: String,
}

impl LedgerEntry {
    pub fn new(
        amount: impl Into<String>,
        description: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            amount: single_line(&amount.into()).into_owned(),
            description: single_line(&description.into()).into_owned(),
            date: single_line(&date.into()).into_owned(),
        }
    }

    /// The record as it is written to the ledger, including the trailing newline.
    /// Example: "10.5, coffee, 2024-01-01;\n"
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for LedgerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {};",
            single_line(&self.amount),
            single_line(&self.description),
            single_line(&self.date)
        )
    }
}

fn single_line(field: &str) -> Cow<'_, str> {
    if field.contains(['\r', '\n']) {
        Cow::Owned(field.replace(['\r', '\n'], " "))
    } else {
        Cow::Borrowed(field)
    }
}

/// Returns true when the date field asks for the date to be resolved.
/// Comparison ignores case and surrounding whitespace.
pub fn is_date_sentinel(date_text: &str) -> bool {
    date_text.trim().eq_ignore_ascii_case(DATE_SENTINEL)
}

/// Returns true when the amount text parses as a floating-point number.
pub fn is_numeric_amount(amount_text: &str) -> bool {
    amount_text.trim().parse::<f64>().is_ok()
}

/// How much of the resolved instant ends up in the date field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    /// YYYY-MM-DD
    #[default]
    DateOnly,
    /// YYYY-MM-DD HH:MM:SS
    DateTime,
}

impl Precision {
    pub fn format_str(&self) -> &'static str {
        match self {
            Precision::DateOnly => "%Y-%m-%d",
            Precision::DateTime => "%Y-%m-%d %H:%M:%S",
        }
    }
}
