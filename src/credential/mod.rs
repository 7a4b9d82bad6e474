//! Credential records and the two text grammars that produce them.
//!
//! - [`parser`]: bulk ingestion of `user:pass` lines and labeled blocks
//! - [`detector`]: passive recognition of the `Name`/`Password`/`Combo`
//!   template inside arbitrary chat text

pub mod detector;
pub mod parser;

pub use detector::{Detector, FormattedCredentials};
pub use parser::parse;

use std::fmt;

/// Separator between username and password in a combo line.
pub const SEPARATOR: char = ':';

/// A username/password pair handed out as one unit of stock.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CredentialRecord {
    pub username: String,
    pub password: String,
}

impl CredentialRecord {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Split a `username:password` line on the first separator.
    ///
    /// Returns `None` when the line carries no separator at all.
    pub fn from_line(line: &str) -> Option<Self> {
        let (username, password) = line.split_once(SEPARATOR)?;
        Some(Self::new(username, password))
    }

    /// The serialized `username:password` form.
    pub fn combo(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.username, SEPARATOR, self.password)
    }
}
