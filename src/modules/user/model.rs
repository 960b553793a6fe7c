use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::user::schema::{UserEntity, UserRole};

/// Public profile fields exposed when resolving conversation/message parties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub avatar_url: Option<String>,
}

impl From<UserEntity> for PublicProfile {
    fn from(entity: UserEntity) -> Self {
        PublicProfile {
            id: entity.id,
            first_name: entity.first_name,
            last_name: entity.last_name,
            role: entity.role,
            avatar_url: entity.avatar_url,
        }
    }
}
