//! Query filters over visitor passes and announcements
//!
//! [`VisitFilter`] is applied server-side as a parameterized `WHERE`
//! clause; [`VisitFilter::matches`] expresses the same predicate in memory.
//! [`current_announcements`] is a pure filter+sort over already fetched rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::models::{Announcement, TemporalValidity, VisitorPass};

/// Optional criteria for listing visitor passes, combined with AND
///
/// The scheduled-date range is inclusive on both ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitFilter {
    pub residencia_id: Option<Uuid>,
    pub usuario_id: Option<Uuid>,
    /// Restrict to passes whose `activa` flag equals this value
    pub activas: Option<bool>,
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub fecha_fin: Option<DateTime<Utc>>,
}

impl VisitFilter {
    pub fn by_residence(residencia_id: Uuid) -> Self {
        Self {
            residencia_id: Some(residencia_id),
            ..Default::default()
        }
    }

    pub fn by_requester(usuario_id: Uuid) -> Self {
        Self {
            usuario_id: Some(usuario_id),
            ..Default::default()
        }
    }

    pub fn active_only() -> Self {
        Self {
            activas: Some(true),
            ..Default::default()
        }
    }

    pub fn scheduled_between(inicio: DateTime<Utc>, fin: DateTime<Utc>) -> Self {
        Self {
            fecha_inicio: Some(inicio),
            fecha_fin: Some(fin),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Append the `WHERE` clause for this filter, binding every value
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        let mut separator = " WHERE ";

        if let Some(id) = self.residencia_id {
            builder.push(separator).push("residencia_id = ").push_bind(id);
            separator = " AND ";
        }
        if let Some(id) = self.usuario_id {
            builder.push(separator).push("usuario_id = ").push_bind(id);
            separator = " AND ";
        }
        if let Some(activa) = self.activas {
            builder.push(separator).push("activa = ").push_bind(activa);
            separator = " AND ";
        }
        if let Some(inicio) = self.fecha_inicio {
            builder
                .push(separator)
                .push("fecha_programada >= ")
                .push_bind(inicio);
            separator = " AND ";
        }
        if let Some(fin) = self.fecha_fin {
            builder.push(separator).push("fecha_programada <= ").push_bind(fin);
        }
    }

    /// In-memory equivalent of [`VisitFilter::push_where`]
    pub fn matches(&self, pass: &VisitorPass) -> bool {
        self.residencia_id.is_none_or(|id| pass.residencia_id == id)
            && self.usuario_id.is_none_or(|id| pass.usuario_id == id)
            && self.activas.is_none_or(|activa| pass.activa == activa)
            && self
                .fecha_inicio
                .is_none_or(|inicio| pass.fecha_programada >= inicio)
            && self.fecha_fin.is_none_or(|fin| pass.fecha_programada <= fin)
    }
}

/// Announcements still current at `now`, most relevant first
///
/// Keeps rows whose expiration is absent or strictly after `now`, then
/// orders important ones first and newer publications before older ones.
/// The sort is stable, so ties keep their fetch order.
pub fn current_announcements(items: Vec<Announcement>, now: DateTime<Utc>) -> Vec<Announcement> {
    let mut current: Vec<Announcement> = items
        .into_iter()
        .filter(|anuncio| anuncio.is_valid_at(now))
        .collect();

    current.sort_by(|a, b| {
        b.importante
            .cmp(&a.importante)
            .then_with(|| b.fecha_publicacion.cmp(&a.fecha_publicacion))
    });

    current
}
