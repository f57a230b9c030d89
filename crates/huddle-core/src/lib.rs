//! # huddle-core
//!
//! Core types, ID prefixes, and error types for Huddle.
//!
//! This crate provides the foundational types shared across all Huddle crates:
//! - Document structs for every entity (notes, todos, channels, members, etc.)
//! - Status, priority and role enums with `snake_case` serialization
//! - Entity references used by the bi-directional `linked_entities` arrays
//! - The static role/scope permission matrix
//! - ID prefix constants
//! - Cross-cutting error types
//! - Audit detail payloads and paginated response envelopes

pub mod audit_detail;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod permissions;
pub mod responses;
