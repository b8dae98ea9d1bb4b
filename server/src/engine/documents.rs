use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::pricing::compute_amount;
use super::{PartnershipEngine, ResolvedPack};
use crate::models::{Company, Event, Organisation, Partnership};
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Agreement,
    Assignment,
}

impl DocumentKind {
    pub fn slug(&self) -> &'static str {
        match self {
            DocumentKind::Agreement => "agreement",
            DocumentKind::Assignment => "assignment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganisationFacts {
    pub name: String,
    pub head_office: Option<String>,
    pub siret: Option<String>,
    pub iban: Option<String>,
    pub bic: Option<String>,
    pub representative_name: String,
    pub representative_role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventFacts {
    pub name: String,
    pub contact_email: Option<String>,
    pub payment_deadline: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyFacts {
    pub name: String,
    pub siret: Option<String>,
    pub head_office: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnershipFacts {
    pub amount: Decimal,
    pub pack_name: String,
    pub options: Vec<String>,
    pub with_booth: bool,
    pub contact_name: String,
    pub contact_role: String,
}

/// Everything a renderer needs, frozen at generation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSnapshot {
    pub kind: DocumentKind,
    pub language: String,
    pub organisation: OrganisationFacts,
    pub event: EventFacts,
    pub company: CompanyFacts,
    pub partnership: PartnershipFacts,
}

pub fn build_snapshot(
    kind: DocumentKind,
    organisation: &Organisation,
    event: &Event,
    company: &Company,
    partnership: &Partnership,
    resolved: &ResolvedPack,
) -> AppResult<DocumentSnapshot> {
    let representative_name = organisation
        .representative_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Organisation {} has no legal representative",
                organisation.id
            ))
        })?;

    let catalog = &resolved.catalog;
    let language = partnership.language.as_str();
    let bundled = catalog.required_options().map(|option| option.id);
    let chosen = resolved.options.iter().map(|selection| selection.option_id);
    let options = bundled
        .chain(chosen)
        .map(|option_id| {
            catalog
                .option(option_id)
                .and_then(|option| option.translation(language))
                .map(|translation| translation.name.clone())
                .ok_or_else(|| {
                    AppError::Forbidden(format!(
                        "Option {} has no translation for language {}",
                        option_id, language
                    ))
                })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(DocumentSnapshot {
        kind,
        language: language.to_string(),
        organisation: OrganisationFacts {
            name: organisation.name.clone(),
            head_office: organisation.head_office.clone(),
            siret: organisation.siret.clone(),
            iban: organisation.iban.clone(),
            bic: organisation.bic.clone(),
            representative_name: representative_name.to_string(),
            representative_role: organisation.representative_role.clone(),
        },
        event: EventFacts {
            name: event.name.clone(),
            contact_email: event.contact_email.clone(),
            payment_deadline: event.payment_deadline(),
            end_date: event.agreement_end_date(),
        },
        company: CompanyFacts {
            name: company.name.clone(),
            siret: company.siret.clone(),
            head_office: company.head_office.clone(),
        },
        partnership: PartnershipFacts {
            amount: compute_amount(catalog, partnership.pack_price_override, &resolved.options),
            pack_name: catalog.pack.name.clone(),
            options,
            with_booth: catalog.pack.with_booth,
            contact_name: partnership.contact.name.clone(),
            contact_role: partnership.contact.role.clone(),
        },
    })
}

fn object_name(partnership: &Partnership, file: &str) -> String {
    format!(
        "events/{}/partnerships/{}/{}",
        partnership.event_id, partnership.id, file
    )
}

impl PartnershipEngine {
    pub async fn document_snapshot(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
        kind: DocumentKind,
    ) -> AppResult<DocumentSnapshot> {
        let partnership = self.load_partnership(event_id, partnership_id).await?;
        self.snapshot_for(&partnership, kind).await
    }

    async fn snapshot_for(
        &self,
        partnership: &Partnership,
        kind: DocumentKind,
    ) -> AppResult<DocumentSnapshot> {
        let resolved = self.resolve_validated_pack(partnership).await?;
        let event = self.load_event(partnership.event_id).await?;
        let organisation = self
            .store()
            .organisation(event.organisation_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Organisation {} not found",
                    event.organisation_id
                ))
            })?;
        let company = self.load_company(partnership.company_id).await?;

        build_snapshot(kind, &organisation, &event, &company, partnership, &resolved)
    }

    /// Renders the document, uploads it, then records its URL.
    pub async fn generate_document(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
        kind: DocumentKind,
    ) -> AppResult<String> {
        let mut partnership = self.load_partnership(event_id, partnership_id).await?;
        let snapshot = self.snapshot_for(&partnership, kind).await?;

        let rendered = self.renderer.render(&snapshot).await?;
        let name = object_name(
            &partnership,
            &format!("{}.{}", kind.slug(), rendered.extension),
        );
        let url = self
            .objects
            .upload(&name, rendered.content, &rendered.mime_type)
            .await?;

        match kind {
            DocumentKind::Agreement => partnership.documents.agreement_url = Some(url.clone()),
            DocumentKind::Assignment => partnership.documents.assignment_url = Some(url.clone()),
        }
        partnership.touch(Utc::now());
        self.store().save_partnership(&partnership).await?;

        info!(%event_id, %partnership_id, kind = kind.slug(), %url, "Document generated");
        Ok(url)
    }

    pub async fn generate_agreement(&self, event_id: Uuid, partnership_id: Uuid) -> AppResult<String> {
        self.generate_document(event_id, partnership_id, DocumentKind::Agreement)
            .await
    }

    pub async fn generate_assignment(&self, event_id: Uuid, partnership_id: Uuid) -> AppResult<String> {
        self.generate_document(event_id, partnership_id, DocumentKind::Assignment)
            .await
    }

    /// Stores the countersigned agreement returned by the company.
    pub async fn upload_signed_agreement(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
        content: Vec<u8>,
        mime_type: &str,
    ) -> AppResult<String> {
        if content.is_empty() {
            return Err(AppError::ValidationError(
                "Signed agreement must not be empty".to_string(),
            ));
        }

        let mut partnership = self.load_partnership(event_id, partnership_id).await?;
        if partnership.documents.agreement_url.is_none() {
            return Err(AppError::Conflict(format!(
                "No agreement has been generated for partnership {}",
                partnership_id
            )));
        }

        let extension = match mime_type {
            "application/pdf" => "pdf",
            "image/png" => "png",
            "image/jpeg" => "jpg",
            _ => "bin",
        };
        let name = object_name(&partnership, &format!("agreement-signed.{}", extension));
        let url = self.objects.upload(&name, content, mime_type).await?;

        partnership.documents.agreement_signed_url = Some(url.clone());
        partnership.touch(Utc::now());
        self.store().save_partnership(&partnership).await?;

        info!(%event_id, %partnership_id, %url, "Signed agreement stored");
        Ok(url)
    }
}
