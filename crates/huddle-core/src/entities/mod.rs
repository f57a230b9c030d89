//! Entity structs for all Huddle documents.
//!
//! Each entity maps to a table in the libSQL database. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` for JSON roundtrip and schema
//! validation.

mod audit;
mod channel;
mod decision;
mod event;
mod link;
mod location;
mod member;
mod message;
mod note;
mod notification;
mod team;
mod todo;

pub use audit::AuditEntry;
pub use channel::Channel;
pub use decision::Decision;
pub use event::Event;
pub use link::{ConnectedTo, Connection, EntityRef, LinkedEntity};
pub use location::Location;
pub use member::Member;
pub use message::Message;
pub use note::{Note, NoteMember};
pub use notification::Notification;
pub use team::Team;
pub use todo::Todo;
