use chrono::{DateTime, Utc};
use colonia_core::MembershipRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Link between an account and a residence ("residencias_usuarios")
///
/// Memberships start unverified; an administrator confirms them later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResidenceMembership {
    pub id: Uuid,
    pub usuario_id: Uuid,
    pub residencia_id: Uuid,
    /// Role label; see [`ResidenceMembership::role`]
    pub rol: String,
    /// Whether this is the account's main residence
    pub es_principal: bool,
    pub verificado: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewMembership {
    pub usuario_id: Uuid,
    pub residencia_id: Uuid,
    #[serde(default)]
    pub rol: MembershipRole,
    #[serde(default)]
    pub es_principal: bool,
}

impl ResidenceMembership {
    pub fn create(request: NewMembership, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            usuario_id: request.usuario_id,
            residencia_id: request.residencia_id,
            rol: request.rol.as_str().to_string(),
            es_principal: request.es_principal,
            verificado: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn role(&self) -> colonia_core::Result<MembershipRole> {
        self.rol.parse()
    }
}
