use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Legal entity running one or more events.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organisation {
    pub id: Uuid,
    pub name: String,
    pub head_office: Option<String>,
    pub siret: Option<String>,
    pub iban: Option<String>,
    pub bic: Option<String>,
    pub representative_name: Option<String>,
    pub representative_role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
