use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::model::AuthenticatedUser;

/// DTO for /api/auth/me response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponseDto {
    pub account_id: String,
    pub roles: Vec<String>,
    pub can_manage_zones: bool,
}

impl From<AuthenticatedUser> for MeResponseDto {
    fn from(user: AuthenticatedUser) -> Self {
        let can_manage_zones = user.can_manage_zones();
        Self {
            account_id: user.account_id,
            roles: user.roles,
            can_manage_zones,
        }
    }
}
