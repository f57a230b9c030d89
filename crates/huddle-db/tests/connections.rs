//! End-to-end flows through the public service API against an on-disk database.

use huddle_core::entities::{ConnectedTo, EntityRef};
use huddle_core::enums::{EntityType, Role};
use huddle_db::repos::channel::NewChannel;
use huddle_db::repos::decision::NewDecision;
use huddle_db::repos::event::NewEvent;
use huddle_db::repos::member::NewMember;
use huddle_db::repos::note::NewNote;
use huddle_db::repos::todo::NewTodo;
use huddle_db::service::HuddleService;
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::TempDir;

async fn open(dir: &TempDir) -> HuddleService {
    let path = dir.path().join("huddle.db");
    HuddleService::open_local(path.to_str().unwrap())
        .await
        .unwrap()
}

/// One document of each linkable type, created by `author`.
async fn seed_documents(svc: &HuddleService, author: &str) -> Vec<EntityRef> {
    let note = svc
        .create_note(
            author,
            NewNote {
                title: "Plan".into(),
                ..NewNote::default()
            },
        )
        .await
        .unwrap()
        .note;
    let todo = svc
        .create_todo(
            author,
            NewTodo {
                title: "Book room".into(),
                ..NewTodo::default()
            },
        )
        .await
        .unwrap();
    let decision = svc
        .create_decision(
            author,
            NewDecision {
                title: "Go".into(),
                description: None,
                connected_to: ConnectedTo::default(),
            },
        )
        .await
        .unwrap();
    let event = svc
        .create_event(
            author,
            NewEvent {
                title: "Demo".into(),
                description: None,
                starts_at: chrono::Utc::now(),
                ends_at: None,
                venue: None,
                connected_to: ConnectedTo::default(),
            },
        )
        .await
        .unwrap();
    let channel = svc
        .create_channel(
            author,
            NewChannel {
                name: "general".into(),
                description: None,
                channel_type: Default::default(),
                connected_to: ConnectedTo::default(),
                members: Vec::new(),
            },
        )
        .await
        .unwrap();
    vec![
        EntityRef::new(EntityType::Note, note.id),
        EntityRef::new(EntityType::Todo, todo.id),
        EntityRef::new(EntityType::Decision, decision.id),
        EntityRef::new(EntityType::Event, event.id),
        EntityRef::new(EntityType::Channel, channel.id),
    ]
}

async fn author(svc: &HuddleService) -> String {
    svc.create_member(
        None,
        NewMember {
            name: "Ana Lima".into(),
            email: "ana.lima@example.com".into(),
            role: Role::Manager,
            team_id: None,
            location_id: None,
        },
    )
    .await
    .unwrap()
    .id
}

#[rstest]
#[case(0, 1)]
#[case(1, 2)]
#[case(2, 3)]
#[case(3, 4)]
#[case(4, 0)]
#[case(0, 3)]
#[tokio::test]
async fn every_linkable_pair_mirrors(#[case] a: usize, #[case] b: usize) {
    let dir = TempDir::new().unwrap();
    let svc = open(&dir).await;
    let author = author(&svc).await;
    let docs = seed_documents(&svc, &author).await;
    let (source, target) = (&docs[a], &docs[b]);

    svc.create_connection(Some(&author), target, source)
        .await
        .unwrap();

    let from_source = svc.list_connections(source, 1, 20).await.unwrap();
    let from_target = svc.list_connections(target, 1, 20).await.unwrap();
    assert_eq!(from_source.items.len(), 1);
    assert_eq!(from_source.items[0].id, target.id);
    assert_eq!(from_target.items[0].id, source.id);
    assert!(svc.audit_link_symmetry().await.unwrap().is_empty());
}

#[tokio::test]
async fn links_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let (note, todo) = {
        let svc = open(&dir).await;
        let author = author(&svc).await;
        let docs = seed_documents(&svc, &author).await;
        svc.create_connection(Some(&author), &docs[0], &docs[1])
            .await
            .unwrap();
        (docs[0].clone(), docs[1].clone())
    };

    let svc = open(&dir).await;
    let page = svc.list_connections(&note, 1, 20).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, todo.id);
    assert_eq!(page.items[0].title.as_deref(), Some("Book room"));
}

#[tokio::test]
async fn deleting_any_document_leaves_no_dangling_links() {
    let dir = TempDir::new().unwrap();
    let svc = open(&dir).await;
    let author = author(&svc).await;
    let docs = seed_documents(&svc, &author).await;
    for other in &docs[1..] {
        svc.create_connection(Some(&author), &docs[0], other)
            .await
            .unwrap();
    }

    svc.delete_event(Some(&author), &docs[3].id).await.unwrap();
    svc.delete_channel(Some(&author), &docs[4].id).await.unwrap();

    assert!(svc.audit_link_symmetry().await.unwrap().is_empty());
    let remaining = svc.list_connections(&docs[0], 1, 20).await.unwrap();
    let ids: Vec<_> = remaining.items.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec![docs[1].id.as_str(), docs[2].id.as_str()]);
}

#[tokio::test]
async fn message_hashtag_resolves_to_linked_documents() {
    let dir = TempDir::new().unwrap();
    let svc = open(&dir).await;
    let author = author(&svc).await;
    let docs = seed_documents(&svc, &author).await;

    let written = svc
        .create_message(&author, &docs[4].id, "see #plan, #demo and #room")
        .await
        .unwrap();
    assert_eq!(written.message.linked_note.as_deref(), Some(docs[0].id.as_str()));
    assert_eq!(written.message.linked_event.as_deref(), Some(docs[3].id.as_str()));
    assert_eq!(written.message.linked_todo.as_deref(), Some(docs[1].id.as_str()));
    assert!(written.unresolved.is_empty());
}
