use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::catalog::validate_selections;
use super::PartnershipEngine;
use crate::models::{
    Communication, Contact, DecisionStatus, OptionSelection, Partnership, PartnershipDocuments,
    Suggestion,
};
use crate::store::duplicate_registration;
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPartnership {
    pub company_id: Uuid,
    pub pack_id: Uuid,
    pub contact_name: String,
    pub contact_role: String,
    pub language: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub option_selections: Vec<OptionSelection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactUpdate {
    pub contact_name: String,
    pub contact_role: String,
    pub language: String,
    pub phone: Option<String>,
    pub emails: Vec<String>,
}

fn check_contact(name: &str, language: &str, emails: &[String]) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Contact name must not be empty".to_string(),
        ));
    }
    if language.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Language must not be empty".to_string(),
        ));
    }
    if let Some(email) = emails
        .iter()
        .map(|email| email.trim())
        .find(|email| !email.is_empty() && !email.contains('@'))
    {
        return Err(AppError::ValidationError(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    Ok(())
}

impl PartnershipEngine {
    /// Creates the partnership of a company for an event.
    pub async fn register(
        &self,
        event_id: Uuid,
        request: RegisterPartnership,
    ) -> AppResult<Partnership> {
        check_contact(&request.contact_name, &request.language, &request.emails)?;

        self.load_event(event_id).await?;
        self.load_company(request.company_id).await?;
        let catalog = self.load_catalog(event_id, request.pack_id).await?;

        if self
            .store()
            .partnership_for_company(event_id, request.company_id)
            .await?
            .is_some()
        {
            return Err(duplicate_registration(event_id, request.company_id));
        }

        let language = request.language.trim().to_string();
        let selected_options =
            validate_selections(&catalog, &request.option_selections, &language)?;

        let now = Utc::now();
        let mut partnership = Partnership {
            id: Uuid::new_v4(),
            event_id,
            company_id: request.company_id,
            selected_pack_id: Some(catalog.pack.id),
            contact: Contact {
                name: request.contact_name.trim().to_string(),
                role: request.contact_role.trim().to_string(),
            },
            language,
            phone: request.phone,
            emails: Vec::new(),
            validated_at: None,
            declined_at: None,
            suggestion: Suggestion::default(),
            organiser_id: None,
            pack_price_override: None,
            booth_location: None,
            documents: PartnershipDocuments::default(),
            communication: Communication::default(),
            selected_options,
            suggested_options: Vec::new(),
            billing: None,
            tickets: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        };
        partnership.replace_emails(&request.emails);

        self.store().insert_partnership(&partnership).await?;

        info!(
            event_id = %event_id,
            company_id = %partnership.company_id,
            partnership_id = %partnership.id,
            pack_id = %catalog.pack.id,
            options = partnership.selected_options.len(),
            "Partnership registered"
        );
        Ok(partnership)
    }

    pub async fn update_contact(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
        update: ContactUpdate,
    ) -> AppResult<Partnership> {
        check_contact(&update.contact_name, &update.language, &update.emails)?;

        let mut partnership = self.load_partnership(event_id, partnership_id).await?;
        partnership.contact = Contact {
            name: update.contact_name.trim().to_string(),
            role: update.contact_role.trim().to_string(),
        };
        partnership.language = update.language.trim().to_string();
        partnership.phone = update.phone;
        partnership.replace_emails(&update.emails);
        partnership.touch(Utc::now());

        self.store().save_partnership(&partnership).await?;
        info!(%event_id, %partnership_id, "Partnership contact updated");
        Ok(partnership)
    }

    /// Only pending partnerships may be removed.
    pub async fn delete_partnership(&self, event_id: Uuid, partnership_id: Uuid) -> AppResult<()> {
        let partnership = self.load_partnership(event_id, partnership_id).await?;
        if partnership.decision_status() != DecisionStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Partnership {} cannot be deleted once validated or declined",
                partnership_id
            )));
        }

        self.store()
            .delete_partnership(event_id, partnership_id, partnership.version)
            .await?;
        info!(%event_id, %partnership_id, "Partnership deleted");
        Ok(())
    }
}
