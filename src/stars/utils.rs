//! Low-level token utilities

use std::str::FromStr;

use encoding_rs::Encoding;
use log::warn;

use super::types::error::{Result, StarsError};

/// Resolve an encoding label (e.g. "utf-8", "windows-1252"), falling back to UTF-8.
pub fn parse_encoding(label: &str) -> &'static Encoding {
    Encoding::for_label(label.trim().as_bytes()).unwrap_or_else(|| {
        warn!("Unknown encoding label '{}', using UTF-8", label);
        encoding_rs::UTF_8
    })
}

/// Remove every single quote. Names in the index stream are written as `'O2'`.
pub fn strip_quotes(token: &str) -> String {
    token.replace('\'', "")
}

/// Fetch token `index` of a line, or report which record was too short.
pub fn token<'a>(tokens: &'a [String], index: usize, line: usize, keyword: &str) -> Result<&'a str> {
    tokens
        .get(index)
        .map(String::as_str)
        .ok_or_else(|| StarsError::MalformedIndex {
            line,
            reason: format!(
                "{} record has {} tokens, expected at least {}",
                keyword,
                tokens.len(),
                index + 1
            ),
        })
}

/// Parse token `index` of a line as a number.
pub fn numeric_token<T: FromStr>(
    tokens: &[String],
    index: usize,
    line: usize,
    keyword: &str,
    field: &'static str,
) -> Result<T> {
    let raw = token(tokens, index, line, keyword)?;
    raw.parse().map_err(|_| StarsError::InvalidField {
        line,
        keyword: keyword.to_string(),
        field,
        value: raw.to_string(),
    })
}
