//! ID prefix constants.
//!
//! Every document ID is `{prefix}-{8 hex chars}`, generated by the store.

pub const PREFIX_LOCATION: &str = "loc";
pub const PREFIX_TEAM: &str = "tea";
pub const PREFIX_MEMBER: &str = "mem";
pub const PREFIX_NOTE: &str = "not";
pub const PREFIX_TODO: &str = "tdo";
pub const PREFIX_DECISION: &str = "dec";
pub const PREFIX_EVENT: &str = "evt";
pub const PREFIX_CHANNEL: &str = "chn";
pub const PREFIX_MESSAGE: &str = "msg";
pub const PREFIX_NOTIFICATION: &str = "ntf";
pub const PREFIX_AUDIT: &str = "aud";

pub const ALL_PREFIXES: [&str; 11] = [
    PREFIX_LOCATION,
    PREFIX_TEAM,
    PREFIX_MEMBER,
    PREFIX_NOTE,
    PREFIX_TODO,
    PREFIX_DECISION,
    PREFIX_EVENT,
    PREFIX_CHANNEL,
    PREFIX_MESSAGE,
    PREFIX_NOTIFICATION,
    PREFIX_AUDIT,
];

/// Build a URL-friendly slug from a title: lowercase ASCII alphanumerics
/// separated by single dashes.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_unique_and_three_chars() {
        let mut seen = std::collections::HashSet::new();
        for prefix in ALL_PREFIXES {
            assert_eq!(prefix.len(), 3, "{prefix}");
            assert!(seen.insert(prefix), "duplicate prefix {prefix}");
        }
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Q3 Planning -- Kickoff! "), "q3-planning-kickoff");
        assert_eq!(slugify("Café notes"), "caf-notes");
        assert_eq!(slugify("!!!"), "");
    }
}
