use huddle_core::enums::Role;
use huddle_core::permissions::PermissionEntry;
use serde::Serialize;

use crate::auth::Caller;
use crate::response::{ApiResult, ok};

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> ApiResult<Health> {
    Ok(ok(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Serialize)]
pub struct Permissions {
    pub member_id: String,
    pub role: Role,
    pub sections: Vec<PermissionEntry>,
}

/// `GET /permissions`: the caller's effective matrix.
pub async fn permissions(caller: Caller) -> ApiResult<Permissions> {
    Ok(ok(Permissions {
        sections: caller.actor.matrix(),
        role: caller.actor.role,
        member_id: caller.member.id,
    }))
}
