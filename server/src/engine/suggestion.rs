use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::catalog::validate_selections;
use super::PartnershipEngine;
use crate::models::{OptionSelection, Partnership, PartnershipOption, Suggestion};
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestPack {
    pub pack_id: Uuid,
    pub language: String,
    #[serde(default)]
    pub option_selections: Vec<OptionSelection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionAnswer {
    Approve,
    Decline,
}

/// Replaces any previous suggestion with a fresh, unanswered one.
pub fn record_suggestion(
    partnership: &mut Partnership,
    pack_id: Uuid,
    options: Vec<PartnershipOption>,
    now: DateTime<Utc>,
) {
    partnership.suggestion = Suggestion {
        pack_id: Some(pack_id),
        sent_at: Some(now),
        approved_at: None,
        declined_at: None,
    };
    partnership.suggested_options = options;
    partnership.touch(now);
}

/// The latest answer wins; approving clears a previous decline and
/// declining clears a previous approval.
pub fn apply_answer(
    partnership: &mut Partnership,
    answer: SuggestionAnswer,
    now: DateTime<Utc>,
) -> AppResult<()> {
    if partnership.suggestion.pack_id.is_none() {
        return Err(AppError::NotFound(format!(
            "No suggestion found for partnership {}",
            partnership.id
        )));
    }

    match answer {
        SuggestionAnswer::Approve => {
            partnership.suggestion.approved_at = Some(now);
            partnership.suggestion.declined_at = None;
        }
        SuggestionAnswer::Decline => {
            partnership.suggestion.declined_at = Some(now);
            partnership.suggestion.approved_at = None;
        }
    }
    partnership.touch(now);
    Ok(())
}

impl PartnershipEngine {
    pub async fn suggest(
        &self,
        event_id: Uuid,
        company_id: Uuid,
        partnership_id: Uuid,
        request: SuggestPack,
    ) -> AppResult<Partnership> {
        let mut partnership = self
            .load_company_partnership(event_id, company_id, partnership_id)
            .await?;
        let catalog = self.load_catalog(event_id, request.pack_id).await?;
        let options =
            validate_selections(&catalog, &request.option_selections, request.language.trim())?;

        record_suggestion(&mut partnership, catalog.pack.id, options, Utc::now());
        self.store().save_partnership(&partnership).await?;

        info!(
            %event_id,
            %partnership_id,
            pack_id = %catalog.pack.id,
            options = partnership.suggested_options.len(),
            "Pack suggestion sent"
        );
        Ok(partnership)
    }

    pub async fn answer_suggestion(
        &self,
        event_id: Uuid,
        company_id: Uuid,
        partnership_id: Uuid,
        answer: SuggestionAnswer,
    ) -> AppResult<Partnership> {
        let mut partnership = self
            .load_company_partnership(event_id, company_id, partnership_id)
            .await?;

        apply_answer(&mut partnership, answer, Utc::now())?;
        self.store().save_partnership(&partnership).await?;

        info!(%event_id, %partnership_id, ?answer, "Pack suggestion answered");
        Ok(partnership)
    }

    pub async fn approve_suggestion(
        &self,
        event_id: Uuid,
        company_id: Uuid,
        partnership_id: Uuid,
    ) -> AppResult<Partnership> {
        self.answer_suggestion(event_id, company_id, partnership_id, SuggestionAnswer::Approve)
            .await
    }

    pub async fn decline_suggestion(
        &self,
        event_id: Uuid,
        company_id: Uuid,
        partnership_id: Uuid,
    ) -> AppResult<Partnership> {
        self.answer_suggestion(event_id, company_id, partnership_id, SuggestionAnswer::Decline)
            .await
    }
}
