//! Detail views that embed the documents a record points at.

use huddle_core::entities::{Member, Message, Note, Todo};
use huddle_core::enums::Role;
use huddle_db::error::DatabaseError;
use huddle_db::service::HuddleService;
use serde::Serialize;

use crate::handlers::optional;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MemberSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<Member> for MemberSummary {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            name: member.name,
            email: member.email,
            role: member.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NoteSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
}

async fn summary(svc: &HuddleService, id: &str) -> Result<Option<MemberSummary>, DatabaseError> {
    Ok(svc.find_member(id).await?.map(MemberSummary::from))
}

#[derive(Debug, Serialize)]
pub struct TodoDetail {
    #[serde(flatten)]
    pub todo: Todo,
    pub assignee: Option<MemberSummary>,
    pub creator: Option<MemberSummary>,
    pub note: Option<NoteSummary>,
}

impl TodoDetail {
    pub async fn load(svc: &HuddleService, todo: Todo) -> Result<Self, DatabaseError> {
        let assignee = match todo.assigned_to.as_deref() {
            Some(id) => summary(svc, id).await?,
            None => None,
        };
        let creator = summary(svc, &todo.created_by).await?;
        let note = match todo.linked_note.as_deref() {
            Some(id) => optional(svc.get_note(id).await)?.map(|note| NoteSummary {
                id: note.id,
                title: note.title,
                slug: note.slug,
            }),
            None => None,
        };
        Ok(Self {
            todo,
            assignee,
            creator,
            note,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct NoteDetail {
    #[serde(flatten)]
    pub note: Note,
    pub author: Option<MemberSummary>,
}

impl NoteDetail {
    pub async fn load(svc: &HuddleService, note: Note) -> Result<Self, DatabaseError> {
        let author = summary(svc, &note.author_id).await?;
        Ok(Self { note, author })
    }
}

#[derive(Debug, Serialize)]
pub struct MessageDetail {
    #[serde(flatten)]
    pub message: Message,
    pub author: Option<MemberSummary>,
    pub mentioned: Vec<MemberSummary>,
}

impl MessageDetail {
    pub async fn load(svc: &HuddleService, message: Message) -> Result<Self, DatabaseError> {
        let author = summary(svc, &message.member_id).await?;
        let mut mentioned = Vec::with_capacity(message.mentioned_members.len());
        for id in &message.mentioned_members {
            if let Some(member) = summary(svc, id).await? {
                mentioned.push(member);
            }
        }
        Ok(Self {
            message,
            author,
            mentioned,
        })
    }
}
