//! Bulk credential parser.
//!
//! Accepts two surface formats, freely mixed in one input:
//!
//! ```text
//! alice:secret1          <- combo line
//! Name                   <- labeled block
//! bob
//! Password
//! secret2
//! ```
//!
//! The scanner is a small state machine. A labeled block that does not complete
//! is abandoned and scanning resumes on the line right after its opening label,
//! so malformed input can never stall the scan.

use super::{CredentialRecord, SEPARATOR};

/// Labels that never start a combo line.
const RESERVED_LABELS: [&str; 4] = ["name", "username", "password", "combo"];

#[derive(Debug, Clone, Copy)]
enum State<'a> {
    /// Looking for a combo line or a block-opening label.
    Scanning,
    /// Username read, the next line must be the `Password` label.
    AwaitingPasswordLabel { opened_at: usize, username: &'a str },
    /// Label read, the next line is the password itself.
    AwaitingPasswordValue { opened_at: usize, username: &'a str },
}

/// Parse every credential record found in `text`, in order of discovery.
///
/// Blank input yields an empty vector. No deduplication is performed.
pub fn parse(text: &str) -> Vec<CredentialRecord> {
    let lines: Vec<&str> = text.trim().lines().map(str::trim).collect();
    let mut records = Vec::new();
    let mut state = State::Scanning;
    let mut cursor = 0;

    loop {
        let Some(&line) = lines.get(cursor) else {
            match state {
                State::Scanning => break,
                // Input ran out mid-block.
                State::AwaitingPasswordLabel { opened_at, .. }
                | State::AwaitingPasswordValue { opened_at, .. } => {
                    state = State::Scanning;
                    cursor = opened_at + 1;
                    continue;
                }
            }
        };

        (state, cursor) = match state {
            State::Scanning => {
                if is_combo_line(line) {
                    records.extend(CredentialRecord::from_line(line));
                    (State::Scanning, cursor + 1)
                } else if is_username_label(line) {
                    match lines.get(cursor + 1) {
                        Some(&username) => (
                            State::AwaitingPasswordLabel {
                                opened_at: cursor,
                                username,
                            },
                            cursor + 2,
                        ),
                        None => (State::Scanning, cursor + 1),
                    }
                } else {
                    (State::Scanning, cursor + 1)
                }
            }
            State::AwaitingPasswordLabel {
                opened_at,
                username,
            } => {
                if line.eq_ignore_ascii_case("password") {
                    (
                        State::AwaitingPasswordValue {
                            opened_at,
                            username,
                        },
                        cursor + 1,
                    )
                } else {
                    (State::Scanning, opened_at + 1)
                }
            }
            State::AwaitingPasswordValue { username, .. } => {
                records.push(CredentialRecord::new(username, line));
                (State::Scanning, cursor + 1)
            }
        };
    }

    records
}

fn is_combo_line(line: &str) -> bool {
    if !line.contains(SEPARATOR) {
        return false;
    }
    let lower = line.to_lowercase();
    !RESERVED_LABELS.iter().any(|label| lower.starts_with(label))
}

fn is_username_label(line: &str) -> bool {
    line.eq_ignore_ascii_case("name") || line.eq_ignore_ascii_case("username")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(u: &str, p: &str) -> CredentialRecord {
        CredentialRecord::new(u, p)
    }

    #[test]
    fn test_combo_lines() {
        let records = parse("alice:secret1\nbob:secret2");
        assert_eq!(records, vec![rec("alice", "secret1"), rec("bob", "secret2")]);
    }

    #[test]
    fn test_labeled_block() {
        let records = parse("Name\nalice\nPassword\nsecret1");
        assert_eq!(records, vec![rec("alice", "secret1")]);
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let records = parse("USERNAME\nalice\npassword\nsecret1");
        assert_eq!(records, vec![rec("alice", "secret1")]);
    }

    #[test]
    fn test_truncated_block_yields_nothing() {
        assert!(parse("Name\nalice").is_empty());
        assert!(parse("Name\nalice\nPassword").is_empty());
        assert!(parse("Name").is_empty());
    }

    #[test]
    fn test_blank_input() {
        assert!(parse("").is_empty());
        assert!(parse("  \n\n \t").is_empty());
    }

    #[test]
    fn test_reserved_prefix_is_not_a_combo() {
        assert!(parse("password:hunter2").is_empty());
        assert!(parse("Combo:alice:pw").is_empty());
    }

    #[test]
    fn test_abandoned_block_resumes_after_label() {
        // The block never reaches a Password label, so the scan restarts on
        // "alice:pw" and picks it up as a combo line.
        let records = parse("Name\nalice:pw\nbob:pw2");
        assert_eq!(records, vec![rec("alice", "pw"), rec("bob", "pw2")]);
    }

    #[test]
    fn test_mixed_formats_keep_discovery_order() {
        let text = "carol:one\n\nUsername\ndave\nPassword\ntwo\nerin:three";
        let records = parse(text);
        assert_eq!(
            records,
            vec![rec("carol", "one"), rec("dave", "two"), rec("erin", "three")]
        );
    }

    #[test]
    fn test_combo_line_after_block_is_its_own_record() {
        let text = "Name\nalice\nPassword\nsecret1\nCombo\nalice:secret1";
        let records = parse(text);
        assert_eq!(records, vec![rec("alice", "secret1"), rec("alice", "secret1")]);
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let records = parse("   name  \n  alice \n Password\n  s3cret  ");
        assert_eq!(records, vec![rec("alice", "s3cret")]);
    }
}
