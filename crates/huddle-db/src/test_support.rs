//! Shared test utilities for huddle-db unit tests.

pub(crate) mod helpers {
    use huddle_core::entities::{ConnectedTo, Location, Member, Team};
    use huddle_core::enums::Role;

    use crate::HuddleDb;
    use crate::repos::member::NewMember;
    use crate::service::HuddleService;

    /// Create an in-memory `HuddleService`.
    pub async fn test_service() -> HuddleService {
        let db = HuddleDb::open_local(":memory:").await.unwrap();
        HuddleService::from_db(db)
    }

    /// A location with one team, for tests that need org placement.
    pub async fn seed_org(svc: &HuddleService) -> (Location, Team) {
        let location = svc
            .create_location(None, "Lisbon", Some("Rua Augusta 1"))
            .await
            .unwrap();
        let team = svc
            .create_team(None, "Platform", None, Some(&location.id))
            .await
            .unwrap();
        (location, team)
    }

    /// Create a member on the given team.
    pub async fn seed_member(svc: &HuddleService, name: &str, role: Role, team: &Team) -> Member {
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        svc.create_member(
            None,
            NewMember {
                name: name.to_string(),
                email,
                role,
                team_id: Some(team.id.clone()),
                location_id: team.location_id.clone(),
            },
        )
        .await
        .unwrap()
    }

    /// `connected_to` pointing at the given team and its location.
    pub fn team_scope(team: &Team) -> ConnectedTo {
        ConnectedTo {
            location_id: team.location_id.clone(),
            team_id: Some(team.id.clone()),
            member_id: None,
        }
    }
}
