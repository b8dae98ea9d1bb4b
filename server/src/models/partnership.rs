use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::billing::BillingRecord;
use super::selection::PartnershipOption;
use super::ticket::Ticket;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub role: String,
}

/// Organiser-proposed alternate pack, negotiated apart from the decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub pack_id: Option<Uuid>,
    pub sent_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub declined_at: Option<DateTime<Utc>>,
}

impl Suggestion {
    pub fn approved_pack(&self) -> Option<Uuid> {
        self.approved_at.and(self.pack_id)
    }

    /// Sent and not yet answered.
    pub fn is_pending(&self) -> bool {
        self.pack_id.is_some() && self.approved_at.is_none() && self.declined_at.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartnershipDocuments {
    pub agreement_url: Option<String>,
    pub agreement_signed_url: Option<String>,
    pub assignment_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Communication {
    pub publication_date: Option<DateTime<Utc>>,
    pub support_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Pending,
    Validated,
    Declined,
}

impl DecisionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DecisionStatus::Pending => "pending",
            DecisionStatus::Validated => "validated",
            DecisionStatus::Declined => "declined",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackSource {
    Selection,
    Suggestion,
}

/// Pack authoritative for pricing, documents and tickets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedPackRef<'a> {
    pub pack_id: Uuid,
    pub source: PackSource,
    pub options: &'a [PartnershipOption],
}

/// One company's sponsorship of one event. Root of every sub-record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partnership {
    pub id: Uuid,
    pub event_id: Uuid,
    pub company_id: Uuid,
    pub selected_pack_id: Option<Uuid>,
    pub contact: Contact,
    pub language: String,
    pub phone: Option<String>,
    pub emails: Vec<String>,
    pub validated_at: Option<DateTime<Utc>>,
    pub declined_at: Option<DateTime<Utc>>,
    pub suggestion: Suggestion,
    pub organiser_id: Option<Uuid>,
    pub pack_price_override: Option<Decimal>,
    pub booth_location: Option<String>,
    pub documents: PartnershipDocuments,
    pub communication: Communication,
    pub selected_options: Vec<PartnershipOption>,
    pub suggested_options: Vec<PartnershipOption>,
    pub billing: Option<BillingRecord>,
    pub tickets: Vec<Ticket>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped by `touch`; a save is only accepted on top of `version - 1`.
    pub version: i64,
}

impl Partnership {
    pub fn decision_status(&self) -> DecisionStatus {
        match (self.validated_at, self.declined_at) {
            (Some(_), _) => DecisionStatus::Validated,
            (None, Some(_)) => DecisionStatus::Declined,
            (None, None) => DecisionStatus::Pending,
        }
    }

    /// An approved suggestion wins over the selection; the selection only
    /// counts once the partnership is validated.
    pub fn validated_pack(&self) -> Option<ValidatedPackRef<'_>> {
        if let Some(pack_id) = self.suggestion.approved_pack() {
            return Some(ValidatedPackRef {
                pack_id,
                source: PackSource::Suggestion,
                options: &self.suggested_options,
            });
        }

        match (self.decision_status(), self.selected_pack_id) {
            (DecisionStatus::Validated, Some(pack_id)) => Some(ValidatedPackRef {
                pack_id,
                source: PackSource::Selection,
                options: &self.selected_options,
            }),
            _ => None,
        }
    }

    pub fn validated_options_mut(&mut self) -> Option<&mut Vec<PartnershipOption>> {
        let source = self.validated_pack()?.source;
        match source {
            PackSource::Suggestion => Some(&mut self.suggested_options),
            PackSource::Selection => Some(&mut self.selected_options),
        }
    }

    /// Replaces the contact emails, trimming blanks and duplicates.
    pub fn replace_emails<I, S>(&mut self, emails: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for email in emails {
            let email = email.as_ref().trim().to_lowercase();
            if !email.is_empty() && !normalized.contains(&email) {
                normalized.push(email);
            }
        }
        self.emails = normalized;
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.version += 1;
    }
}
