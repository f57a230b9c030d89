//! Todo extraction from note content.
//!
//! Recognized line shapes (leading whitespace ignored):
//!
//! ```text
//! @name: text
//! - @name: text          (also `*` bullets)
//! TODO: @name text       (case-insensitive, colon after the name optional)
//! ```
//!
//! The text may carry a priority (`[high]` or `!high`) and a due date
//! (`2026-03-01`, `[2026-03-01]`, `due 2026-03-01`, `due: 2026-03-01`).
//! Both are stripped from the title. Lines inside fenced code blocks are
//! skipped.

use std::collections::HashSet;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use huddle_core::enums::Priority;

use crate::error::ParseError;
use crate::mentions::normalize;

static ASSIGNED_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[-*]\s+)?@([\w.\-]+)\s*:\s*(.+)$").expect("valid regex")
});

static TODO_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:[-*]\s+)?todo\s*:\s*@([\w.\-]+)\s*:?\s+(.+)$").expect("valid regex")
});

static PRIORITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[\s*(low|medium|high|urgent)\s*\]|(?:^|\s)!(low|medium|high|urgent)\b")
        .expect("valid regex")
});

static DUE_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\[\s*(?:due:?\s*)?(\d{4}-\d{2}-\d{2})\s*\]|\bdue:?\s*(\d{4}-\d{2}-\d{2})\b|\b(\d{4}-\d{2}-\d{2})\b",
    )
    .expect("valid regex")
});

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// A todo line found in a note, before assignee resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoDraft {
    /// Assignee as written, without the `@`.
    pub assignee: String,
    pub title: String,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    /// 1-based line number in the note content.
    pub line: usize,
}

impl TodoDraft {
    /// Identity of a draft within one note: normalized assignee and
    /// lowercased title.
    #[must_use]
    pub fn dedup_key(&self) -> (String, String) {
        (normalize(&self.assignee), self.title.to_lowercase())
    }
}

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns `ParseError::InvalidDate` for anything that is not a calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|source| ParseError::InvalidDate {
        value: value.to_string(),
        source,
    })
}

/// Parse a priority keyword, case-insensitively.
///
/// # Errors
///
/// Returns `ParseError::UnknownPriority` if the word is not a priority.
pub fn parse_priority(value: &str) -> Result<Priority, ParseError> {
    value
        .to_lowercase()
        .parse()
        .map_err(|_| ParseError::UnknownPriority(value.to_string()))
}

/// Extract todo drafts from note content, de-duplicated within the note.
#[must_use]
pub fn extract_todos(content: &str) -> Vec<TodoDraft> {
    let mut drafts = Vec::new();
    let mut seen = HashSet::new();
    let mut in_code_block = false;

    for (idx, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.starts_with("```") {
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            continue;
        }

        let Some(caps) = TODO_LINE_RE
            .captures(line)
            .or_else(|| ASSIGNED_LINE_RE.captures(line))
        else {
            continue;
        };
        let assignee = caps[1].trim_end_matches(['.', '-']).to_string();
        if assignee.is_empty() {
            continue;
        }

        let Some(draft) = draft_from_text(assignee, &caps[2], idx + 1) else {
            continue;
        };
        if seen.insert(draft.dedup_key()) {
            drafts.push(draft);
        }
    }
    drafts
}

fn draft_from_text(assignee: String, text: &str, line: usize) -> Option<TodoDraft> {
    let mut priority = None;
    for caps in PRIORITY_RE.captures_iter(text) {
        let word = caps.get(1).or_else(|| caps.get(2))?;
        if priority.is_none() {
            priority = parse_priority(word.as_str()).ok();
        }
    }
    let without_priority = PRIORITY_RE.replace_all(text, " ");

    let mut due_date = None;
    let mut due_span = None;
    for caps in DUE_DATE_RE.captures_iter(&without_priority) {
        let Some(date) = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)) else {
            continue;
        };
        if let Ok(parsed) = parse_date(date.as_str()) {
            due_date = Some(parsed);
            due_span = caps.get(0).map(|m| m.range());
            break;
        }
    }
    let without_due = match due_span {
        Some(range) => {
            let mut s = without_priority.to_string();
            s.replace_range(range, " ");
            s
        }
        None => without_priority.into_owned(),
    };

    let title = WHITESPACE_RE
        .replace_all(&without_due, " ")
        .trim()
        .trim_end_matches([',', ';', '-'])
        .trim()
        .to_string();
    if title.is_empty() {
        return None;
    }

    Some(TodoDraft {
        assignee,
        title,
        priority,
        due_date,
        line,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[rstest]
    #[case("@ana: book the room", "ana", "book the room")]
    #[case("- @ana: book the room", "ana", "book the room")]
    #[case("* @ana.lima: book the room", "ana.lima", "book the room")]
    #[case("TODO: @bob send invites", "bob", "send invites")]
    #[case("todo: @bob: send invites", "bob", "send invites")]
    #[case("   Todo:@bob   send   invites  ", "bob", "send invites")]
    fn recognizes_line_shapes(#[case] line: &str, #[case] assignee: &str, #[case] title: &str) {
        let drafts = extract_todos(line);
        assert_eq!(drafts.len(), 1, "{line}");
        assert_eq!(drafts[0].assignee, assignee);
        assert_eq!(drafts[0].title, title);
    }

    #[rstest]
    #[case("just some prose")]
    #[case("email ana@example.com: not a todo")]
    #[case("@ana without a colon")]
    #[case("@ana:   ")]
    #[case("TODO: nobody assigned")]
    fn ignores_other_lines(#[case] line: &str) {
        assert!(extract_todos(line).is_empty(), "{line}");
    }

    #[rstest]
    #[case("@ana: ship it [high]", Some(Priority::High), None)]
    #[case("@ana: ship it !urgent", Some(Priority::Urgent), None)]
    #[case("@ana: ship it [LOW] 2026-03-01", Some(Priority::Low), date(2026, 3, 1))]
    #[case("@ana: ship it [2026-03-01]", None, date(2026, 3, 1))]
    #[case("@ana: ship it due 2026-03-01", None, date(2026, 3, 1))]
    #[case("@ana: ship it due: 2026-03-01 !medium", Some(Priority::Medium), date(2026, 3, 1))]
    #[case("@ana: ship it [due: 2026-03-01]", None, date(2026, 3, 1))]
    fn strips_attributes(
        #[case] line: &str,
        #[case] priority: Option<Priority>,
        #[case] due: Option<NaiveDate>,
    ) {
        let drafts = extract_todos(line);
        assert_eq!(drafts[0].title, "ship it", "{line}");
        assert_eq!(drafts[0].priority, priority);
        assert_eq!(drafts[0].due_date, due);
    }

    #[test]
    fn invalid_date_stays_in_title() {
        let drafts = extract_todos("@ana: archive 2026-13-40 exports");
        assert_eq!(drafts[0].title, "archive 2026-13-40 exports");
        assert_eq!(drafts[0].due_date, None);
    }

    #[test]
    fn bang_inside_word_is_not_priority() {
        let drafts = extract_todos("@ana: fix wow!high score");
        assert_eq!(drafts[0].priority, None);
    }

    #[test]
    fn reports_line_numbers_and_dedups() {
        let content = "# Standup\n\n@ana: Book room\n- @Ana: book ROOM [high]\nTODO: @bob write notes\n";
        let drafts = extract_todos(content);
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].line, 3);
        assert_eq!(drafts[1].assignee, "bob");
        assert_eq!(drafts[1].line, 5);
    }

    #[test]
    fn skips_fenced_code() {
        let content = "```\n@ana: not real\n```\n@bob: real one";
        let drafts = extract_todos(content);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].assignee, "bob");
    }

    #[test]
    fn parse_helpers_report_errors() {
        assert!(matches!(
            parse_date("2026-02-30"),
            Err(ParseError::InvalidDate { .. })
        ));
        assert!(matches!(
            parse_priority("critical"),
            Err(ParseError::UnknownPriority(_))
        ));
        assert_eq!(parse_priority("HIGH").unwrap(), Priority::High);
    }
}
