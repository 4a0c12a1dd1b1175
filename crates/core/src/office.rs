use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// A branch office that owns one or more camera connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficeData {
    pub id_oficina: DbId,
    pub nombre_oficina: String,
    pub direccion: String,
    pub ciudad: String,
    pub responsable: String,
    pub telefono_contacto: String,
    pub fecha_registro: String,
}
