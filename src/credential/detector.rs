//! Passive credential template detection.
//!
//! Scans free-form chat text for the template
//!
//! ```text
//! Username
//! alice
//! Password
//! secret1
//! Combo
//! alice:secret1
//! ```
//!
//! and produces the compact three-line form. Detection is read-only; the input
//! is never modified.

use regex::Regex;
use std::fmt;

const NAME_PATTERN: &str = r"(?i)(?:Name|Username)\s*\n\s*(\S+)";
const PASSWORD_PATTERN: &str = r"(?i)Password\s*\n\s*(\S+)";
const COMBO_PATTERN: &str = r"(?i)Combo\s*\n\s*(\S+:\S+)";

/// Normalized credentials extracted from a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedCredentials {
    pub username: String,
    pub password: String,
    pub combo: String,
}

impl fmt::Display for FormattedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Username: {}\nPassword: {}\nCombo: {}",
            self.username, self.password, self.combo
        )
    }
}

/// Compiled template matcher.
#[derive(Debug, Clone)]
pub struct Detector {
    name: Regex,
    password: Regex,
    combo: Regex,
}

impl Detector {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            name: Regex::new(NAME_PATTERN)?,
            password: Regex::new(PASSWORD_PATTERN)?,
            combo: Regex::new(COMBO_PATTERN)?,
        })
    }

    /// Whether all three template markers appear somewhere in the text.
    pub fn has_markers(text: &str) -> bool {
        let lower = text.to_lowercase();
        lower.contains("name") && lower.contains("password") && lower.contains("combo")
    }

    /// Extract the template from `text`, if it is fully present.
    pub fn detect(&self, text: &str) -> Option<FormattedCredentials> {
        if !Self::has_markers(text) {
            return None;
        }

        let username = capture(&self.name, text)?;
        let password = capture(&self.password, text)?;
        let combo = capture(&self.combo, text)?;

        Some(FormattedCredentials {
            username,
            password,
            combo,
        })
    }
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
