use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::PartnershipEngine;
use crate::models::Partnership;
use crate::utils::error::{AppError, AppResult};

impl PartnershipEngine {
    /// Assigns a booth location, or clears it when `location` is empty.
    /// A location belongs to at most one partnership per event.
    pub async fn assign_booth(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
        location: Option<String>,
    ) -> AppResult<Partnership> {
        let mut partnership = self.load_partnership(event_id, partnership_id).await?;
        let location = location
            .map(|location| location.trim().to_string())
            .filter(|location| !location.is_empty());

        if let Some(location) = location.as_deref() {
            if let Some(holder) = self.store().booth_holder(event_id, location).await? {
                if holder.id != partnership_id {
                    let company = self.load_company(holder.company_id).await?;
                    warn!(%event_id, %partnership_id, location, holder = %holder.id, "Booth already taken");
                    return Err(AppError::Forbidden(format!(
                        "Location {} is already assigned to {}",
                        location, company.name
                    )));
                }
            }
        }

        if partnership.booth_location != location {
            partnership.booth_location = location;
            partnership.touch(Utc::now());
            self.store().save_partnership(&partnership).await?;
            info!(
                %event_id,
                %partnership_id,
                location = ?partnership.booth_location,
                "Booth location updated"
            );
        }
        Ok(partnership)
    }
}
