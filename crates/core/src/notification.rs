//! Notification records, delivered both by `GET /api/notificaciones`
//! and by the `/ws/notifications` push channel.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// A notification addressed to a recipient.
///
/// The push channel and the list endpoint do not agree on which fields
/// are present, so everything except the message text is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NotificationData {
    #[serde(default)]
    pub id_notificacion: Option<DbId>,
    #[serde(default)]
    pub id_evento: Option<DbId>,
    #[serde(default)]
    pub destinatario: Option<String>,
    #[serde(default)]
    pub mensaje: String,
    #[serde(default)]
    pub canal: Option<String>,
    #[serde(default)]
    pub estado: Option<String>,
    #[serde(default)]
    pub fecha_envio: Option<String>,
}
