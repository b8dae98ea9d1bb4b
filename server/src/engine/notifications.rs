use tracing::info;
use uuid::Uuid;

use super::listing::PartnershipFilter;
use super::PartnershipEngine;
use crate::gateways::{Destination, Notification};
use crate::utils::error::{AppError, AppResult};

impl PartnershipEngine {
    /// Partnerships matching `filter` that have at least one contact email.
    pub async fn resolve_destinations(
        &self,
        event_id: Uuid,
        filter: &PartnershipFilter,
    ) -> AppResult<Vec<Destination>> {
        self.load_event(event_id).await?;
        let partnerships = self.store().partnerships(event_id).await?;

        let mut destinations = Vec::new();
        for partnership in partnerships
            .into_iter()
            .filter(|p| !p.emails.is_empty() && filter.matches(p))
        {
            let company = self.load_company(partnership.company_id).await?;
            destinations.push(Destination {
                partnership_id: partnership.id,
                company_name: company.name,
                language: partnership.language,
                emails: partnership.emails,
            });
        }
        Ok(destinations)
    }

    /// Sends `notification` to every resolved destination. Returns how many
    /// partnerships were reached.
    pub async fn notify(
        &self,
        event_id: Uuid,
        filter: &PartnershipFilter,
        notification: Notification,
    ) -> AppResult<usize> {
        if notification.subject.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Notification subject must not be empty".to_string(),
            ));
        }

        let event = self.load_event(event_id).await?;
        let destinations = self.resolve_destinations(event_id, filter).await?;
        if destinations.is_empty() {
            return Ok(0);
        }

        self.notifier
            .deliver(&event, &destinations, &notification)
            .await?;
        info!(%event_id, destinations = destinations.len(), "Notification sent");
        Ok(destinations.len())
    }
}
