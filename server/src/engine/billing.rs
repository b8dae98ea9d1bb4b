use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::PartnershipEngine;
use crate::models::{
    BillingContact, BillingRecord, InvoiceStatus, Partnership, Ticket, TicketHolder,
};
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize)]
pub struct BillingInput {
    pub name: Option<String>,
    pub contact: BillingContact,
    pub po: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueTickets {
    pub order_id: String,
    pub holders: Vec<TicketHolder>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketUpdate {
    pub first_name: String,
    pub last_name: String,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Creates the billing record or updates it in place. The status of an
/// existing record is left alone.
pub fn apply_billing(
    partnership: &mut Partnership,
    company_name: &str,
    input: BillingInput,
    now: DateTime<Utc>,
) -> AppResult<()> {
    if !input.contact.email.contains('@') {
        return Err(AppError::ValidationError(format!(
            "'{}' is not a valid billing email address",
            input.contact.email
        )));
    }

    let name = non_empty(input.name.as_deref()).unwrap_or_else(|| company_name.to_string());
    let po = non_empty(input.po.as_deref());

    match partnership.billing.as_mut() {
        Some(billing) => {
            billing.name = name;
            billing.contact = input.contact;
            if po.is_some() {
                billing.po = po;
            }
            billing.updated_at = now;
        }
        None => {
            partnership.billing = Some(BillingRecord {
                id: Uuid::new_v4(),
                event_id: partnership.event_id,
                partnership_id: partnership.id,
                name,
                contact: input.contact,
                po,
                status: InvoiceStatus::Pending,
                created_at: now,
                updated_at: now,
            });
        }
    }
    partnership.touch(now);
    Ok(())
}

/// Checks the ticket quota and the invoice status, in that order.
pub fn check_entitlement(
    partnership: &Partnership,
    capacity: usize,
    requested: usize,
) -> AppResult<()> {
    let available = capacity.saturating_sub(partnership.tickets.len());
    if requested > available {
        return Err(AppError::Forbidden(format!(
            "Not enough tickets in the validated pack: {} available, {} requested",
            available, requested
        )));
    }

    let billing = partnership.billing.as_ref().ok_or_else(|| {
        AppError::NotFound(format!(
            "No billing found for partnership {}",
            partnership.id
        ))
    })?;
    if !billing.status.is_paid() {
        return Err(AppError::Forbidden(format!(
            "Invoice status {} is not PAID",
            billing.status
        )));
    }
    Ok(())
}

fn check_holders(partnership: &Partnership, holders: &[TicketHolder]) -> AppResult<()> {
    if holders.is_empty() {
        return Err(AppError::ValidationError(
            "At least one ticket holder is required".to_string(),
        ));
    }
    for (index, holder) in holders.iter().enumerate() {
        if holder.ticket_id.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Ticket id must not be empty".to_string(),
            ));
        }
        let repeated = holders[..index]
            .iter()
            .any(|other| other.ticket_id == holder.ticket_id);
        let issued = partnership
            .tickets
            .iter()
            .any(|ticket| ticket.id == holder.ticket_id);
        if repeated || issued {
            return Err(AppError::Conflict(format!(
                "Ticket {} already exists",
                holder.ticket_id
            )));
        }
    }
    Ok(())
}

impl PartnershipEngine {
    pub async fn upsert_billing(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
        input: BillingInput,
    ) -> AppResult<BillingRecord> {
        let mut partnership = self.load_partnership(event_id, partnership_id).await?;
        let company = self.load_company(partnership.company_id).await?;

        apply_billing(&mut partnership, &company.name, input, Utc::now())?;
        self.store().save_partnership(&partnership).await?;

        info!(%event_id, %partnership_id, "Billing saved");
        partnership.billing.ok_or_else(|| {
            AppError::InternalServerError("Billing missing after upsert".to_string())
        })
    }

    pub async fn billing(&self, event_id: Uuid, partnership_id: Uuid) -> AppResult<BillingRecord> {
        let partnership = self.load_partnership(event_id, partnership_id).await?;
        partnership.billing.ok_or_else(|| {
            AppError::NotFound(format!("No billing found for partnership {}", partnership_id))
        })
    }

    /// Overwrites the invoice status reported by the invoicing workflow.
    pub async fn update_billing_status(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
        status: InvoiceStatus,
    ) -> AppResult<BillingRecord> {
        let mut partnership = self.load_partnership(event_id, partnership_id).await?;
        let now = Utc::now();
        let billing = partnership.billing.as_mut().ok_or_else(|| {
            AppError::NotFound(format!("No billing found for partnership {}", partnership_id))
        })?;
        billing.status = status;
        billing.updated_at = now;
        let billing = billing.clone();

        partnership.touch(now);
        self.store().save_partnership(&partnership).await?;

        info!(%event_id, %partnership_id, status = %status, "Invoice status updated");
        Ok(billing)
    }

    /// Issues one ticket per holder against the validated pack.
    pub async fn issue_tickets(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
        request: IssueTickets,
    ) -> AppResult<Vec<Ticket>> {
        let mut partnership = self.load_partnership(event_id, partnership_id).await?;
        let resolved = self.resolve_validated_pack(&partnership).await?;

        check_holders(&partnership, &request.holders)?;
        if let Err(e) = check_entitlement(
            &partnership,
            resolved.catalog.pack.ticket_capacity(),
            request.holders.len(),
        ) {
            warn!(%event_id, %partnership_id, error = %e, "Ticket issuance refused");
            return Err(e);
        }

        let email = partnership
            .billing
            .as_ref()
            .map(|billing| billing.contact.email.clone())
            .unwrap_or_default();
        let now = Utc::now();
        let issued: Vec<Ticket> = request
            .holders
            .into_iter()
            .map(|holder| Ticket {
                id: holder.ticket_id,
                partnership_id,
                order_id: request.order_id.clone(),
                first_name: holder.first_name,
                last_name: holder.last_name,
                email: email.clone(),
                created_at: now,
                updated_at: now,
            })
            .collect();

        partnership.tickets.extend(issued.iter().cloned());
        partnership.touch(now);
        self.store().save_partnership(&partnership).await?;

        info!(
            %event_id,
            %partnership_id,
            issued = issued.len(),
            total = partnership.tickets.len(),
            "Tickets issued"
        );
        Ok(issued)
    }

    /// Corrects the holder names of an issued ticket. Repeating the same
    /// correction is harmless; unknown ticket ids are NotFound.
    pub async fn update_ticket(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
        ticket_id: &str,
        update: TicketUpdate,
    ) -> AppResult<Ticket> {
        let mut partnership = self.load_partnership(event_id, partnership_id).await?;
        let now = Utc::now();

        let ticket = partnership
            .tickets
            .iter_mut()
            .find(|ticket| ticket.id == ticket_id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Ticket {} not found for partnership {}",
                    ticket_id, partnership_id
                ))
            })?;
        ticket.first_name = update.first_name;
        ticket.last_name = update.last_name;
        ticket.updated_at = now;
        let ticket = ticket.clone();

        partnership.touch(now);
        self.store().save_partnership(&partnership).await?;
        info!(%event_id, %partnership_id, ticket_id, "Ticket updated");
        Ok(ticket)
    }

    pub async fn list_tickets(&self, event_id: Uuid, partnership_id: Uuid) -> AppResult<Vec<Ticket>> {
        let partnership = self.load_partnership(event_id, partnership_id).await?;
        Ok(partnership.tickets)
    }
}
