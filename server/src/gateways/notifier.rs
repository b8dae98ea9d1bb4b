use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::models::Event;
use crate::utils::error::AppResult;

/// A partnership resolved into the addresses a message should reach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub partnership_id: Uuid,
    pub company_name: String,
    pub language: String,
    pub emails: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

/// Delivery transport. Retries are the transport's business.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn deliver(
        &self,
        event: &Event,
        destinations: &[Destination],
        notification: &Notification,
    ) -> AppResult<()>;
}

/// Logs every delivery instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct LogNotificationGateway;

#[async_trait]
impl NotificationGateway for LogNotificationGateway {
    async fn deliver(
        &self,
        event: &Event,
        destinations: &[Destination],
        notification: &Notification,
    ) -> AppResult<()> {
        for destination in destinations {
            info!(
                event_id = %event.id,
                partnership_id = %destination.partnership_id,
                company = %destination.company_name,
                recipients = %destination.emails.join(","),
                subject = %notification.subject,
                "Notification delivered"
            );
        }
        Ok(())
    }
}
