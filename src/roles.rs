//! Role lookup.
//!
//! Role membership is owned by the chat platform. The bridge ships the
//! member's current roles with every event, so a role change takes effect on
//! the very next request. Nothing here caches.

use crate::network::protocol::Member;

/// Answers "does this user hold this role right now?".
pub trait RoleResolver: Send + Sync {
    fn is_in_role(&self, user_id: &str, role: &str) -> bool;
}

impl RoleResolver for Member {
    fn is_in_role(&self, user_id: &str, role: &str) -> bool {
        self.id == user_id && self.roles.iter().any(|r| r == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str, roles: &[&str]) -> Member {
        Member {
            id: id.to_string(),
            display_name: String::new(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_role_match_is_case_sensitive() {
        let m = member("1", &["Premium"]);
        assert!(m.is_in_role("1", "Premium"));
        assert!(!m.is_in_role("1", "premium"));
    }

    #[test]
    fn test_other_user_never_matches() {
        let m = member("1", &["Restock"]);
        assert!(!m.is_in_role("2", "Restock"));
    }
}
