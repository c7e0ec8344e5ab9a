use crate::{Result, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of visit a pass is issued for.
///
/// Stored and exchanged with its Spanish label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisitKind {
    /// One-off social visit
    #[serde(rename = "Visita")]
    Visit,
    /// Service provider (delivery, maintenance, ...)
    #[serde(rename = "Servicio")]
    Service,
    /// Recurring visitor
    #[serde(rename = "Recurrente")]
    Recurring,
}

impl VisitKind {
    /// Label used on the wire and in the `visitas.tipo` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitKind::Visit => "Visita",
            VisitKind::Service => "Servicio",
            VisitKind::Recurring => "Recurrente",
        }
    }
}

impl fmt::Display for VisitKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VisitKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Visita" => Ok(VisitKind::Visit),
            "Servicio" => Ok(VisitKind::Service),
            "Recurrente" => Ok(VisitKind::Recurring),
            other => Err(Error::InvalidVisitKind(other.to_string())),
        }
    }
}

/// Role an account holds in a residence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MembershipRole {
    #[serde(rename = "propietario")]
    Owner,
    #[default]
    #[serde(rename = "residente")]
    Resident,
    #[serde(rename = "inquilino")]
    Tenant,
}

impl MembershipRole {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::Owner => "propietario",
            MembershipRole::Resident => "residente",
            MembershipRole::Tenant => "inquilino",
        }
    }
}

impl fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MembershipRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "propietario" => Ok(MembershipRole::Owner),
            "residente" => Ok(MembershipRole::Resident),
            "inquilino" => Ok(MembershipRole::Tenant),
            _ => Err(Error::InvalidRole(s.to_string())),
        }
    }
}
