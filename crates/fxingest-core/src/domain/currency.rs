use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_CODE_LEN: usize = 10;

/// Normalized (trimmed, uppercase) currency code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse and normalize a currency code to uppercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(ValidationError::EmptyBase);
        }

        let valid = normalized.len() <= MAX_CODE_LEN
            && normalized.chars().all(|ch| ch.is_ascii_alphanumeric());
        if !valid {
            return Err(ValidationError::InvalidCurrency {
                value: input.to_owned(),
                max: MAX_CODE_LEN,
            });
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

/// Parse a list of quote symbols, dropping blank entries.
///
/// Fails with [`ValidationError::EmptySymbols`] when nothing remains.
pub fn parse_symbols<S: AsRef<str>>(raw: &[S]) -> Result<Vec<CurrencyCode>, ValidationError> {
    let symbols = raw
        .iter()
        .map(AsRef::as_ref)
        .filter(|value| !value.trim().is_empty())
        .map(CurrencyCode::parse)
        .collect::<Result<Vec<_>, _>>()?;

    if symbols.is_empty() {
        return Err(ValidationError::EmptySymbols);
    }
    Ok(symbols)
}

/// Parse a comma-separated symbol list such as `"brl, eur"`.
pub fn parse_symbol_list(raw: &str) -> Result<Vec<CurrencyCode>, ValidationError> {
    let parts: Vec<&str> = raw.split(',').collect();
    parse_symbols(&parts)
}
