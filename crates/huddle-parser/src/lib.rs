//! # huddle-parser
//!
//! Text scanning for Huddle messages and notes:
//!
//! - [`mentions`]: `@mention` / `#hashtag` tokens and their resolution
//!   against candidate name lists
//! - [`todos`]: todo lines (`@name: do the thing [high] 2026-03-01`) in
//!   note content
//!
//! Everything here is pure: callers load candidates from the store and
//! persist the results.

pub mod error;
pub mod mentions;
pub mod todos;

pub use error::ParseError;
pub use mentions::{
    Candidate, CandidateSet, ParsedMessage, Sigil, Token, normalize, parse_message, resolve,
    scan_tokens,
};
pub use todos::{TodoDraft, extract_todos};
