//! Organiser decision on a partnership.
//!
//! ```text
//! pending ──validate──▶ validated
//!    │
//!    └────decline────▶ declined
//! ```
//!
//! Both outcomes are terminal. Repeating the outcome already recorded is a
//! no-op; asking for the other one is a conflict.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::PartnershipEngine;
use crate::models::{DecisionStatus, Partnership};
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Validate,
    Decline,
}

impl Decision {
    fn outcome(self) -> DecisionStatus {
        match self {
            Decision::Validate => DecisionStatus::Validated,
            Decision::Decline => DecisionStatus::Declined,
        }
    }
}

/// Applies `decision` at `now`. Returns whether the partnership changed.
pub fn apply_decision(
    partnership: &mut Partnership,
    decision: Decision,
    now: DateTime<Utc>,
) -> AppResult<bool> {
    match (partnership.decision_status(), decision) {
        (DecisionStatus::Pending, Decision::Validate) => {
            partnership.validated_at = Some(now);
        }
        (DecisionStatus::Pending, Decision::Decline) => {
            partnership.declined_at = Some(now);
        }
        (current, decision) if current == decision.outcome() => return Ok(false),
        (current, _) => {
            return Err(AppError::Conflict(format!(
                "Partnership {} is already {}",
                partnership.id,
                current.label()
            )))
        }
    }
    partnership.touch(now);
    Ok(true)
}

impl PartnershipEngine {
    pub async fn decide(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
        decision: Decision,
    ) -> AppResult<Partnership> {
        let mut partnership = self.load_partnership(event_id, partnership_id).await?;

        if apply_decision(&mut partnership, decision, Utc::now())? {
            self.store().save_partnership(&partnership).await?;
            info!(
                %event_id,
                %partnership_id,
                status = ?partnership.decision_status(),
                "Partnership decision recorded"
            );
        }
        Ok(partnership)
    }

    pub async fn validate(&self, event_id: Uuid, partnership_id: Uuid) -> AppResult<Partnership> {
        self.decide(event_id, partnership_id, Decision::Validate)
            .await
    }

    pub async fn decline(&self, event_id: Uuid, partnership_id: Uuid) -> AppResult<Partnership> {
        self.decide(event_id, partnership_id, Decision::Decline)
            .await
    }
}
