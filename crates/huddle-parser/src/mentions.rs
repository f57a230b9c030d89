//! `@mention` and `#hashtag` scanning and resolution.
//!
//! A token starts at the beginning of the text or right after a non-word
//! character, so `ana@example.com` is not a mention. Token bodies are word
//! characters plus `.` and `-`; trailing `.`/`-` are trimmed so sentence
//! punctuation does not stick to the name.
//!
//! Resolution matches the normalized token as a substring of each
//! candidate's normalized label. Candidate lists are tried in a fixed order
//! (members, notes, todos, events, channels, decisions) and the first hit
//! wins. The sigil plays no part in resolution: `#ana` mentions a member
//! named Ana just like `@ana`, and `@sprint` links a note just like
//! `#sprint`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use huddle_core::entities::EntityRef;
use huddle_core::enums::EntityType;

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^\w])([@#])([\w.\-]+)").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sigil {
    Mention,
    Hashtag,
}

impl Sigil {
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Mention => '@',
            Self::Hashtag => '#',
        }
    }
}

/// One `@` or `#` occurrence in a text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub sigil: Sigil,
    pub text: String,
    /// Byte offset of the sigil.
    pub start: usize,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.sigil.as_char(), self.text)
    }
}

/// A resolvable document: its id and the label tokens are matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub label: String,
}

impl Candidate {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Candidate lists in resolution order.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    pub members: Vec<Candidate>,
    pub notes: Vec<Candidate>,
    pub todos: Vec<Candidate>,
    pub events: Vec<Candidate>,
    pub channels: Vec<Candidate>,
    pub decisions: Vec<Candidate>,
}

impl CandidateSet {
    fn ordered(&self) -> [(EntityType, &[Candidate]); 6] {
        [
            (EntityType::Member, &self.members),
            (EntityType::Note, &self.notes),
            (EntityType::Todo, &self.todos),
            (EntityType::Event, &self.events),
            (EntityType::Channel, &self.channels),
            (EntityType::Decision, &self.decisions),
        ]
    }
}

/// References materialized from a message text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedMessage {
    pub mentioned_members: Vec<String>,
    pub linked_note: Option<String>,
    pub linked_todo: Option<String>,
    pub linked_event: Option<String>,
    /// Every resolved reference, in text order, without duplicates.
    pub references: Vec<EntityRef>,
    /// Tokens that matched nothing, as written (`@zed`).
    pub unresolved: Vec<String>,
}

/// Lowercase and drop all whitespace.
#[must_use]
pub fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Find every `@`/`#` token in `text`.
#[must_use]
pub fn scan_tokens(text: &str) -> Vec<Token> {
    TOKEN_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let sigil_match = caps.get(1)?;
            let body = caps.get(2)?.as_str().trim_end_matches(['.', '-']);
            if body.is_empty() {
                return None;
            }
            let sigil = if sigil_match.as_str() == "@" {
                Sigil::Mention
            } else {
                Sigil::Hashtag
            };
            Some(Token {
                sigil,
                text: body.to_string(),
                start: sigil_match.start(),
            })
        })
        .collect()
}

/// Resolve one token text against the candidate lists.
#[must_use]
pub fn resolve(token: &str, candidates: &CandidateSet) -> Option<EntityRef> {
    let needle = normalize(token);
    if needle.is_empty() {
        return None;
    }
    candidates.ordered().into_iter().find_map(|(entity_type, list)| {
        list.iter()
            .find(|c| normalize(&c.label).contains(&needle))
            .map(|c| EntityRef::new(entity_type, c.id.clone()))
    })
}

/// Scan `text` and resolve every token.
#[must_use]
pub fn parse_message(text: &str, candidates: &CandidateSet) -> ParsedMessage {
    let mut parsed = ParsedMessage::default();
    for token in scan_tokens(text) {
        let Some(reference) = resolve(&token.text, candidates) else {
            let raw = token.to_string();
            if !parsed.unresolved.contains(&raw) {
                parsed.unresolved.push(raw);
            }
            continue;
        };
        if parsed.references.contains(&reference) {
            continue;
        }
        match reference.entity_type {
            EntityType::Member => parsed.mentioned_members.push(reference.id.clone()),
            EntityType::Note => {
                parsed.linked_note.get_or_insert_with(|| reference.id.clone());
            }
            EntityType::Todo => {
                parsed.linked_todo.get_or_insert_with(|| reference.id.clone());
            }
            EntityType::Event => {
                parsed.linked_event.get_or_insert_with(|| reference.id.clone());
            }
            _ => {}
        }
        parsed.references.push(reference);
    }
    parsed
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn texts(tokens: &[Token]) -> Vec<String> {
        tokens.iter().map(ToString::to_string).collect()
    }

    fn candidates() -> CandidateSet {
        CandidateSet {
            members: vec![
                Candidate::new("mem-ana", "Ana Lima"),
                Candidate::new("mem-bob", "Bob Stone"),
            ],
            notes: vec![Candidate::new("not-plan", "Sprint Planning")],
            todos: vec![Candidate::new("tdo-deck", "Finish deck")],
            events: vec![Candidate::new("evt-demo", "Friday Demo")],
            channels: vec![Candidate::new("chn-gen", "general")],
            decisions: vec![Candidate::new("dec-ship", "Ship on Fridays")],
        }
    }

    #[rstest]
    #[case("@ana hi", &["@ana"])]
    #[case("hi @ana, and #sprint.", &["@ana", "#sprint"])]
    #[case("mail ana@example.com now", &[])]
    #[case("@ana.lima-", &["@ana.lima"])]
    #[case("(@bob) #q3-plan!", &["@bob", "#q3-plan"])]
    #[case("@@ana", &["@ana"])]
    #[case("issue#12", &[])]
    #[case("@ #", &[])]
    fn scans_tokens(#[case] text: &str, #[case] expected: &[&str]) {
        assert_eq!(texts(&scan_tokens(text)), expected);
    }

    #[test]
    fn token_offsets_point_at_sigil() {
        let tokens = scan_tokens("ping @ana");
        assert_eq!(tokens[0].start, 5);
        assert_eq!(tokens[0].sigil, Sigil::Mention);
    }

    #[rstest]
    #[case("Ana Lima", "analima")]
    #[case("  Sprint\tPlanning ", "sprintplanning")]
    #[case("ÉQUIPE", "équipe")]
    fn normalizes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[rstest]
    #[case("ana", EntityType::Member, "mem-ana")]
    #[case("AnaLima", EntityType::Member, "mem-ana")]
    #[case("sprint", EntityType::Note, "not-plan")]
    #[case("deck", EntityType::Todo, "tdo-deck")]
    #[case("demo", EntityType::Event, "evt-demo")]
    #[case("general", EntityType::Channel, "chn-gen")]
    #[case("ship", EntityType::Decision, "dec-ship")]
    fn resolves_in_fixed_order(
        #[case] token: &str,
        #[case] entity_type: EntityType,
        #[case] id: &str,
    ) {
        assert_eq!(
            resolve(token, &candidates()),
            Some(EntityRef::new(entity_type, id))
        );
    }

    #[test]
    fn members_win_over_documents() {
        // "fri" is in both the event and the decision labels; "st" in a member name.
        let set = candidates();
        assert_eq!(
            resolve("fri", &set),
            Some(EntityRef::new(EntityType::Event, "evt-demo"))
        );
        assert_eq!(
            resolve("st", &set),
            Some(EntityRef::new(EntityType::Member, "mem-bob"))
        );
    }

    #[test]
    fn first_candidate_in_list_wins() {
        let set = CandidateSet {
            members: vec![
                Candidate::new("mem-1", "Sam One"),
                Candidate::new("mem-2", "Sam Two"),
            ],
            ..CandidateSet::default()
        };
        assert_eq!(resolve("sam", &set).unwrap().id, "mem-1");
    }

    #[test]
    fn parse_message_materializes_references() {
        let parsed = parse_message(
            "@ana @bob please review #sprint before #demo, cc @ana and @zed",
            &candidates(),
        );
        assert_eq!(parsed.mentioned_members, vec!["mem-ana", "mem-bob"]);
        assert_eq!(parsed.linked_note.as_deref(), Some("not-plan"));
        assert_eq!(parsed.linked_event.as_deref(), Some("evt-demo"));
        assert_eq!(parsed.linked_todo, None);
        assert_eq!(parsed.references.len(), 4);
        assert_eq!(parsed.unresolved, vec!["@zed"]);
    }

    #[test]
    fn parse_message_keeps_first_of_each_document_kind() {
        let mut set = candidates();
        set.notes.push(Candidate::new("not-retro", "Retro"));
        let parsed = parse_message("#retro then #sprint", &set);
        assert_eq!(parsed.linked_note.as_deref(), Some("not-retro"));
        assert_eq!(parsed.references.len(), 2);
    }

    #[test]
    fn sigil_does_not_restrict_resolution() {
        let parsed = parse_message("#ana see @sprint", &candidates());
        assert_eq!(parsed.mentioned_members, vec!["mem-ana"]);
        assert_eq!(parsed.linked_note.as_deref(), Some("not-plan"));
        assert!(parsed.unresolved.is_empty());
    }

    #[test]
    fn empty_candidates_leave_everything_unresolved() {
        let parsed = parse_message("@ana #x", &CandidateSet::default());
        assert!(parsed.references.is_empty());
        assert_eq!(parsed.unresolved, vec!["@ana", "#x"]);
    }
}
