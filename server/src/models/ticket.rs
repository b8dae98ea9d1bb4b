use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An entitlement issued against a partnership's validated pack.
///
/// `id` is the identifier assigned by the external ticketing integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub partnership_id: Uuid,
    pub order_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketHolder {
    pub ticket_id: String,
    pub first_name: String,
    pub last_name: String,
}
