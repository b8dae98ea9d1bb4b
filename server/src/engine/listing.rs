use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::pricing::compute_amount;
use super::PartnershipEngine;
use crate::models::{DecisionStatus, PackSource, Partnership};
use crate::utils::error::{AppError, AppResult};

/// Every set field must match. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartnershipFilter {
    pub validated: Option<bool>,
    pub declined: Option<bool>,
    pub paid: Option<bool>,
    pub suggestion_pending: Option<bool>,
    pub agreement_generated: Option<bool>,
    pub agreement_signed: Option<bool>,
    pub pack_id: Option<Uuid>,
    pub organiser_id: Option<Uuid>,
}

fn flag(expected: Option<bool>, actual: bool) -> bool {
    expected.map_or(true, |expected| expected == actual)
}

impl PartnershipFilter {
    pub fn matches(&self, partnership: &Partnership) -> bool {
        let status = partnership.decision_status();
        let paid = partnership
            .billing
            .as_ref()
            .is_some_and(|billing| billing.status.is_paid());
        let pack_matches = self.pack_id.map_or(true, |pack_id| {
            partnership
                .validated_pack()
                .map(|validated| validated.pack_id)
                .or(partnership.selected_pack_id)
                == Some(pack_id)
        });

        flag(self.validated, status == DecisionStatus::Validated)
            && flag(self.declined, status == DecisionStatus::Declined)
            && flag(self.paid, paid)
            && flag(self.suggestion_pending, partnership.suggestion.is_pending())
            && flag(
                self.agreement_generated,
                partnership.documents.agreement_url.is_some(),
            )
            && flag(
                self.agreement_signed,
                partnership.documents.agreement_signed_url.is_some(),
            )
            && pack_matches
            && self
                .organiser_id
                .map_or(true, |organiser| partnership.organiser_id == Some(organiser))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedPackSummary {
    pub pack_id: Uuid,
    pub name: String,
    pub source: PackSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnershipView {
    pub company_name: String,
    pub status: DecisionStatus,
    pub validated_pack: Option<ValidatedPackSummary>,
    pub amount: Option<Decimal>,
    pub partnership: Partnership,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganiserAssignment {
    /// `None` unassigns.
    pub organiser_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommunicationUpdate {
    pub publication_date: Option<DateTime<Utc>>,
    pub support_url: Option<String>,
}

impl PartnershipEngine {
    pub async fn list_partnerships(
        &self,
        event_id: Uuid,
        filter: &PartnershipFilter,
    ) -> AppResult<Vec<PartnershipView>> {
        self.load_event(event_id).await?;
        let partnerships = self.store().partnerships(event_id).await?;

        let mut views = Vec::new();
        for partnership in partnerships.into_iter().filter(|p| filter.matches(p)) {
            views.push(self.view(partnership).await?);
        }
        Ok(views)
    }

    pub async fn partnership_detail(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
    ) -> AppResult<PartnershipView> {
        let partnership = self.load_partnership(event_id, partnership_id).await?;
        self.view(partnership).await
    }

    async fn view(&self, partnership: Partnership) -> AppResult<PartnershipView> {
        let company = self.load_company(partnership.company_id).await?;
        let (validated_pack, amount) = match self.resolve_validated_pack(&partnership).await {
            Ok(resolved) => (
                Some(ValidatedPackSummary {
                    pack_id: resolved.catalog.pack.id,
                    name: resolved.catalog.pack.name.clone(),
                    source: resolved.source,
                }),
                Some(compute_amount(
                    &resolved.catalog,
                    partnership.pack_price_override,
                    &resolved.options,
                )),
            ),
            Err(AppError::NotFound(_)) => (None, None),
            Err(e) => return Err(e),
        };

        Ok(PartnershipView {
            company_name: company.name,
            status: partnership.decision_status(),
            validated_pack,
            amount,
            partnership,
        })
    }

    pub async fn assign_organiser(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
        organiser_id: Option<Uuid>,
    ) -> AppResult<Partnership> {
        let mut partnership = self.load_partnership(event_id, partnership_id).await?;
        if partnership.organiser_id != organiser_id {
            partnership.organiser_id = organiser_id;
            partnership.touch(Utc::now());
            self.store().save_partnership(&partnership).await?;
            info!(%event_id, %partnership_id, organiser_id = ?organiser_id, "Organiser assigned");
        }
        Ok(partnership)
    }

    pub async fn update_communication(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
        update: CommunicationUpdate,
    ) -> AppResult<Partnership> {
        let support_url = update
            .support_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        if let Some(url) = support_url.as_deref() {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AppError::ValidationError(format!(
                    "Support URL '{}' must be an http(s) URL",
                    url
                )));
            }
        }

        let mut partnership = self.load_partnership(event_id, partnership_id).await?;
        partnership.communication.publication_date = update.publication_date;
        partnership.communication.support_url = support_url;
        partnership.touch(Utc::now());
        self.store().save_partnership(&partnership).await?;

        info!(%event_id, %partnership_id, "Communication plan updated");
        Ok(partnership)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BillingContact, BillingRecord, Communication, Contact, InvoiceStatus,
        PartnershipDocuments, Suggestion,
    };

    fn partnership() -> Partnership {
        let now = Utc::now();
        Partnership {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            selected_pack_id: Some(Uuid::new_v4()),
            contact: Contact {
                name: "Ada".into(),
                role: "CTO".into(),
            },
            language: "en".into(),
            phone: None,
            emails: vec![],
            validated_at: None,
            declined_at: None,
            suggestion: Suggestion::default(),
            organiser_id: None,
            pack_price_override: None,
            booth_location: None,
            documents: PartnershipDocuments::default(),
            communication: Communication::default(),
            selected_options: vec![],
            suggested_options: vec![],
            billing: None,
            tickets: vec![],
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(PartnershipFilter::default().matches(&partnership()));
    }

    #[test]
    fn test_status_and_payment_filters() {
        let mut p = partnership();
        let validated = PartnershipFilter {
            validated: Some(true),
            ..Default::default()
        };
        let paid = PartnershipFilter {
            paid: Some(true),
            ..Default::default()
        };
        assert!(!validated.matches(&p));
        assert!(!paid.matches(&p));

        p.validated_at = Some(Utc::now());
        p.billing = Some(BillingRecord {
            id: Uuid::new_v4(),
            event_id: p.event_id,
            partnership_id: p.id,
            name: "Acme".into(),
            contact: BillingContact {
                first_name: "A".into(),
                last_name: "B".into(),
                email: "a@b.c".into(),
            },
            po: None,
            status: InvoiceStatus::Paid,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        assert!(validated.matches(&p));
        assert!(paid.matches(&p));
    }

    #[test]
    fn test_pack_filter_follows_approved_suggestion() {
        let mut p = partnership();
        let suggested = Uuid::new_v4();
        let selected = p.selected_pack_id;
        p.suggestion = Suggestion {
            pack_id: Some(suggested),
            sent_at: Some(Utc::now()),
            approved_at: None,
            declined_at: None,
        };
        let pending = PartnershipFilter {
            suggestion_pending: Some(true),
            ..Default::default()
        };
        assert!(pending.matches(&p));
        assert!(PartnershipFilter {
            pack_id: selected,
            ..Default::default()
        }
        .matches(&p));

        p.suggestion.approved_at = Some(Utc::now());
        assert!(!pending.matches(&p));
        assert!(PartnershipFilter {
            pack_id: Some(suggested),
            ..Default::default()
        }
        .matches(&p));
    }
}
