//! Plain chat messages: prefixed text commands and passive template detection.

use crate::network::protocol::Outcome;
use crate::state::BotState;
use tracing::debug;

/// Commands reachable as `<prefix><name> <text>` in a plain message.
const TEXT_COMMANDS: &[&str] = &["format"];

/// Split a prefixed text command into its name and argument.
///
/// Returns `None` when the message does not start with the prefix followed
/// by a known text command. The argument keeps its inner line breaks.
pub fn text_command<'c>(prefix: &str, content: &'c str) -> Option<(&'c str, Option<&'c str>)> {
    let rest = content.strip_prefix(prefix)?;
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    if !TEXT_COMMANDS.contains(&name) {
        return None;
    }

    Some((name, (!arg.is_empty()).then_some(arg)))
}

/// Reformat a credential template found in an ordinary message.
pub fn scan(state: &BotState, content: &str) -> Option<Outcome> {
    let found = state.detector.detect(content)?;
    crate::metrics::record_formatted();
    debug!(user = %found.username, "credential template reformatted");

    Some(Outcome::Formatted {
        text: found.to_string(),
        delete_original: state.bot.auto_delete_formatted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_command_with_multiline_argument() {
        let parsed = text_command("!", "!format Name\nbob\nPassword\nx\nCombo\nbob:x");
        assert_eq!(parsed, Some(("format", Some("Name\nbob\nPassword\nx\nCombo\nbob:x"))));
    }

    #[test]
    fn test_text_command_without_argument() {
        assert_eq!(text_command("!", "!format"), Some(("format", None)));
        assert_eq!(text_command("!", "!format   "), Some(("format", None)));
    }

    #[test]
    fn test_unknown_or_unprefixed_text_is_not_a_command() {
        assert_eq!(text_command("!", "!generate"), None);
        assert_eq!(text_command("!", "format this"), None);
        assert_eq!(text_command("?", "!format x"), None);
        assert_eq!(text_command("!", "!formatted x"), None);
    }

    #[test]
    fn test_multichar_prefix() {
        assert_eq!(text_command("acc.", "acc.format a"), Some(("format", Some("a"))));
    }
}
