//! SQL identifier validation.
//!
//! Table and column names cannot be bound as parameters, so anything that
//! ends up spliced into statement text goes through [`Ident::parse`] first.
//! Each `.`-separated part must match `[A-Za-z_][A-Za-z0-9_$]*`.

use crate::error::{DbError, DbResult};
use std::fmt;

/// A validated, unquoted SQL identifier (`column`, `table` or `schema.table`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident(String);

impl Ident {
    /// Parse a possibly dotted identifier.
    pub fn parse(s: &str) -> DbResult<Self> {
        if s.is_empty() {
            return Err(DbError::invalid_input("Identifier cannot be empty"));
        }

        for part in s.split('.') {
            let mut chars = part.chars();
            match chars.next() {
                None => {
                    return Err(DbError::invalid_input(format!(
                        "Empty identifier segment in '{s}'"
                    )));
                }
                Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
                Some(c) => {
                    return Err(DbError::invalid_input(format!(
                        "Invalid identifier start character '{c}' in '{s}'"
                    )));
                }
            }
            if let Some(c) = chars.find(|&c| !(c == '_' || c == '$' || c.is_ascii_alphanumeric())) {
                return Err(DbError::invalid_input(format!(
                    "Invalid character '{c}' in identifier '{s}'"
                )));
            }
        }

        Ok(Self(s.to_string()))
    }

    /// Parse a single (undotted) identifier, e.g. a column name.
    pub fn parse_column(s: &str) -> DbResult<Self> {
        if s.contains('.') {
            return Err(DbError::invalid_input(format!(
                "Column name '{s}' must not be qualified"
            )));
        }
        Self::parse(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
