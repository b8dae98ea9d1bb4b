//! PostgreSQL store. Saves lock the partnership row and check its version
//! before replacing the aggregate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use sqlx::{FromRow, Postgres, Transaction};
use uuid::Uuid;

use super::{booth_taken, duplicate_registration, stale_write, PartnershipStore};
use crate::models::{
    BillingContact, BillingRecord, Communication, Company, Contact, Event, InvoiceStatus,
    OptionKind, OptionTranslation, Organisation, PackCatalog, PackOption, Partnership,
    PartnershipDocuments, PartnershipOption, SelectableValue, SponsoringOption, SponsoringPack,
    Suggestion, Ticket,
};
use crate::utils::error::{AppError, AppResult};

const PARTNERSHIP_COLUMNS: &str = "id, event_id, company_id, selected_pack_id, contact_name, \
    contact_role, language, phone, validated_at, declined_at, suggestion_pack_id, \
    suggestion_sent_at, suggestion_approved_at, suggestion_declined_at, organiser_id, \
    pack_price_override, booth_location, agreement_url, agreement_signed_url, assignment_url, \
    publication_date, support_url, created_at, updated_at, version";

#[derive(FromRow)]
struct PartnershipRow {
    id: Uuid,
    event_id: Uuid,
    company_id: Uuid,
    selected_pack_id: Option<Uuid>,
    contact_name: String,
    contact_role: String,
    language: String,
    phone: Option<String>,
    validated_at: Option<DateTime<Utc>>,
    declined_at: Option<DateTime<Utc>>,
    suggestion_pack_id: Option<Uuid>,
    suggestion_sent_at: Option<DateTime<Utc>>,
    suggestion_approved_at: Option<DateTime<Utc>>,
    suggestion_declined_at: Option<DateTime<Utc>>,
    organiser_id: Option<Uuid>,
    pack_price_override: Option<Decimal>,
    booth_location: Option<String>,
    agreement_url: Option<String>,
    agreement_signed_url: Option<String>,
    assignment_url: Option<String>,
    publication_date: Option<DateTime<Utc>>,
    support_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i64,
}

#[derive(FromRow)]
struct SelectionRow {
    pack_id: Uuid,
    option_id: Uuid,
    suggestion: bool,
    quantity: Option<i32>,
    selected_value_id: Option<Uuid>,
    price_override: Option<Decimal>,
}

#[derive(FromRow)]
struct BillingRow {
    id: Uuid,
    event_id: Uuid,
    partnership_id: Uuid,
    name: String,
    contact_first_name: String,
    contact_last_name: String,
    contact_email: String,
    po: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct TicketRow {
    id: String,
    partnership_id: Uuid,
    order_id: String,
    first_name: String,
    last_name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct PackOptionRow {
    id: Uuid,
    event_id: Uuid,
    price: Option<Decimal>,
    kind: String,
    fixed_quantity: Option<i32>,
    required: bool,
}

#[derive(FromRow)]
struct TranslationRow {
    option_id: Uuid,
    language: String,
    name: String,
    description: Option<String>,
}

#[derive(FromRow)]
struct SelectableRow {
    id: Uuid,
    option_id: Uuid,
    value: String,
}

#[derive(Clone)]
pub struct PgPartnershipStore {
    pool: PgPool,
}

impl PgPartnershipStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::InternalServerError(format!("Migration failed: {}", e)))
    }

    async fn hydrate(&self, row: PartnershipRow) -> AppResult<Partnership> {
        let emails: Vec<String> = sqlx::query_scalar(
            "SELECT email FROM partnership_emails WHERE partnership_id = $1 ORDER BY email",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        let selections: Vec<SelectionRow> = sqlx::query_as(
            "SELECT pack_id, option_id, suggestion, quantity, selected_value_id, price_override \
             FROM partnership_options WHERE partnership_id = $1 ORDER BY option_id",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        let billing: Option<BillingRow> = sqlx::query_as(
            "SELECT id, event_id, partnership_id, name, contact_first_name, contact_last_name, \
             contact_email, po, status, created_at, updated_at \
             FROM billings WHERE partnership_id = $1",
        )
        .bind(row.id)
        .fetch_optional(&self.pool)
        .await?;

        let tickets: Vec<TicketRow> = sqlx::query_as(
            "SELECT id, partnership_id, order_id, first_name, last_name, email, created_at, \
             updated_at FROM tickets WHERE partnership_id = $1 ORDER BY created_at, id",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        let (suggested, selected): (Vec<SelectionRow>, Vec<SelectionRow>) =
            selections.into_iter().partition(|s| s.suggestion);

        Ok(Partnership {
            id: row.id,
            event_id: row.event_id,
            company_id: row.company_id,
            selected_pack_id: row.selected_pack_id,
            contact: Contact {
                name: row.contact_name,
                role: row.contact_role,
            },
            language: row.language,
            phone: row.phone,
            emails,
            validated_at: row.validated_at,
            declined_at: row.declined_at,
            suggestion: Suggestion {
                pack_id: row.suggestion_pack_id,
                sent_at: row.suggestion_sent_at,
                approved_at: row.suggestion_approved_at,
                declined_at: row.suggestion_declined_at,
            },
            organiser_id: row.organiser_id,
            pack_price_override: row.pack_price_override,
            booth_location: row.booth_location,
            documents: PartnershipDocuments {
                agreement_url: row.agreement_url,
                agreement_signed_url: row.agreement_signed_url,
                assignment_url: row.assignment_url,
            },
            communication: Communication {
                publication_date: row.publication_date,
                support_url: row.support_url,
            },
            selected_options: selected.into_iter().map(selection_from_row).collect(),
            suggested_options: suggested.into_iter().map(selection_from_row).collect(),
            billing: billing.map(billing_from_row).transpose()?,
            tickets: tickets.into_iter().map(ticket_from_row).collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            version: row.version,
        })
    }

    async fn hydrate_optional(&self, row: Option<PartnershipRow>) -> AppResult<Option<Partnership>> {
        match row {
            Some(row) => self.hydrate(row).await.map(Some),
            None => Ok(None),
        }
    }
}

fn selection_from_row(row: SelectionRow) -> PartnershipOption {
    PartnershipOption {
        pack_id: row.pack_id,
        option_id: row.option_id,
        quantity: row.quantity,
        selected_value_id: row.selected_value_id,
        price_override: row.price_override,
    }
}

fn billing_from_row(row: BillingRow) -> AppResult<BillingRecord> {
    let status = row
        .status
        .parse::<InvoiceStatus>()
        .map_err(AppError::InternalServerError)?;
    Ok(BillingRecord {
        id: row.id,
        event_id: row.event_id,
        partnership_id: row.partnership_id,
        name: row.name,
        contact: BillingContact {
            first_name: row.contact_first_name,
            last_name: row.contact_last_name,
            email: row.contact_email,
        },
        po: row.po,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn ticket_from_row(row: TicketRow) -> Ticket {
    Ticket {
        id: row.id,
        partnership_id: row.partnership_id,
        order_id: row.order_id,
        first_name: row.first_name,
        last_name: row.last_name,
        email: row.email,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn option_kind(
    option_id: Uuid,
    kind: &str,
    fixed_quantity: Option<i32>,
    values: Vec<SelectableValue>,
) -> AppResult<OptionKind> {
    match kind {
        "text" => Ok(OptionKind::Text),
        "typed_quantitative" => Ok(OptionKind::TypedQuantitative),
        "typed_number" => Ok(OptionKind::TypedNumber {
            fixed_quantity: fixed_quantity.unwrap_or(1),
        }),
        "typed_selectable" => Ok(OptionKind::TypedSelectable { values }),
        other => Err(AppError::InternalServerError(format!(
            "Option {} has unknown kind '{}'",
            option_id, other
        ))),
    }
}

/// Maps schema uniqueness violations onto the engine's own errors.
fn map_write_error(err: sqlx::Error, partnership: &Partnership) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some("partnerships_event_company_key") => {
                    return duplicate_registration(partnership.event_id, partnership.company_id)
                }
                Some("partnerships_event_booth_key") => {
                    return booth_taken(partnership.booth_location.as_deref().unwrap_or_default())
                }
                _ => {}
            }
        }
    }
    AppError::DatabaseError(err)
}

async fn write_children(
    tx: &mut Transaction<'_, Postgres>,
    partnership: &Partnership,
) -> AppResult<()> {
    sqlx::query("DELETE FROM partnership_emails WHERE partnership_id = $1")
        .bind(partnership.id)
        .execute(&mut **tx)
        .await?;
    for email in &partnership.emails {
        sqlx::query("INSERT INTO partnership_emails (partnership_id, email) VALUES ($1, $2)")
            .bind(partnership.id)
            .bind(email)
            .execute(&mut **tx)
            .await?;
    }

    sqlx::query("DELETE FROM partnership_options WHERE partnership_id = $1")
        .bind(partnership.id)
        .execute(&mut **tx)
        .await?;
    let selected = partnership.selected_options.iter().map(|o| (false, o));
    let suggested = partnership.suggested_options.iter().map(|o| (true, o));
    for (suggestion, option) in selected.chain(suggested) {
        sqlx::query(
            "INSERT INTO partnership_options \
             (partnership_id, pack_id, option_id, suggestion, quantity, selected_value_id, price_override) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(partnership.id)
        .bind(option.pack_id)
        .bind(option.option_id)
        .bind(suggestion)
        .bind(option.quantity)
        .bind(option.selected_value_id)
        .bind(option.price_override)
        .execute(&mut **tx)
        .await?;
    }

    match &partnership.billing {
        Some(billing) => {
            sqlx::query(
                "INSERT INTO billings (id, event_id, partnership_id, name, contact_first_name, \
                 contact_last_name, contact_email, po, status, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
                 ON CONFLICT (partnership_id) DO UPDATE SET name = EXCLUDED.name, \
                 contact_first_name = EXCLUDED.contact_first_name, \
                 contact_last_name = EXCLUDED.contact_last_name, \
                 contact_email = EXCLUDED.contact_email, po = EXCLUDED.po, \
                 status = EXCLUDED.status, updated_at = EXCLUDED.updated_at",
            )
            .bind(billing.id)
            .bind(billing.event_id)
            .bind(billing.partnership_id)
            .bind(&billing.name)
            .bind(&billing.contact.first_name)
            .bind(&billing.contact.last_name)
            .bind(&billing.contact.email)
            .bind(&billing.po)
            .bind(billing.status.as_str())
            .bind(billing.created_at)
            .bind(billing.updated_at)
            .execute(&mut **tx)
            .await?;
        }
        None => {
            sqlx::query("DELETE FROM billings WHERE partnership_id = $1")
                .bind(partnership.id)
                .execute(&mut **tx)
                .await?;
        }
    }

    sqlx::query("DELETE FROM tickets WHERE partnership_id = $1")
        .bind(partnership.id)
        .execute(&mut **tx)
        .await?;
    for ticket in &partnership.tickets {
        sqlx::query(
            "INSERT INTO tickets (id, partnership_id, order_id, first_name, last_name, email, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&ticket.id)
        .bind(ticket.partnership_id)
        .bind(&ticket.order_id)
        .bind(&ticket.first_name)
        .bind(&ticket.last_name)
        .bind(&ticket.email)
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

#[async_trait]
impl PartnershipStore for PgPartnershipStore {
    async fn event(&self, event_id: Uuid) -> AppResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT id, organisation_id, name, contact_email, start_time, end_time, created_at, \
             updated_at FROM events WHERE id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    async fn organisation(&self, organisation_id: Uuid) -> AppResult<Option<Organisation>> {
        let organisation = sqlx::query_as::<_, Organisation>(
            "SELECT id, name, head_office, siret, iban, bic, representative_name, \
             representative_role, created_at, updated_at FROM organisations WHERE id = $1",
        )
        .bind(organisation_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(organisation)
    }

    async fn company(&self, company_id: Uuid) -> AppResult<Option<Company>> {
        let company = sqlx::query_as::<_, Company>(
            "SELECT id, name, siret, head_office, site_url, created_at, updated_at \
             FROM companies WHERE id = $1",
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(company)
    }

    async fn pack_catalog(&self, event_id: Uuid, pack_id: Uuid) -> AppResult<Option<PackCatalog>> {
        let Some(pack) = sqlx::query_as::<_, SponsoringPack>(
            "SELECT id, event_id, name, base_price, max_quantity, with_booth \
             FROM sponsoring_packs WHERE id = $1 AND event_id = $2",
        )
        .bind(pack_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let rows: Vec<PackOptionRow> = sqlx::query_as(
            "SELECT o.id, o.event_id, o.price, o.kind, o.fixed_quantity, po.required \
             FROM pack_options po JOIN sponsoring_options o ON o.id = po.option_id \
             WHERE po.pack_id = $1 ORDER BY o.id",
        )
        .bind(pack_id)
        .fetch_all(&self.pool)
        .await?;

        let option_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let translations: Vec<TranslationRow> = sqlx::query_as(
            "SELECT option_id, language, name, description FROM option_translations \
             WHERE option_id = ANY($1) ORDER BY language",
        )
        .bind(&option_ids)
        .fetch_all(&self.pool)
        .await?;
        let selectable: Vec<SelectableRow> = sqlx::query_as(
            "SELECT id, option_id, value FROM option_selectable_values \
             WHERE option_id = ANY($1) ORDER BY value",
        )
        .bind(&option_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut options = Vec::with_capacity(rows.len());
        for row in rows {
            let values = selectable
                .iter()
                .filter(|v| v.option_id == row.id)
                .map(|v| SelectableValue {
                    id: v.id,
                    value: v.value.clone(),
                })
                .collect();
            let translations = translations
                .iter()
                .filter(|t| t.option_id == row.id)
                .map(|t| OptionTranslation {
                    language: t.language.clone(),
                    name: t.name.clone(),
                    description: t.description.clone(),
                })
                .collect();
            options.push(PackOption {
                option: SponsoringOption {
                    id: row.id,
                    event_id: row.event_id,
                    price: row.price,
                    kind: option_kind(row.id, &row.kind, row.fixed_quantity, values)?,
                    translations,
                },
                required: row.required,
            });
        }

        Ok(Some(PackCatalog { pack, options }))
    }

    async fn partnership(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
    ) -> AppResult<Option<Partnership>> {
        let row: Option<PartnershipRow> = sqlx::query_as(&format!(
            "SELECT {} FROM partnerships WHERE id = $1 AND event_id = $2",
            PARTNERSHIP_COLUMNS
        ))
        .bind(partnership_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;
        self.hydrate_optional(row).await
    }

    async fn partnership_for_company(
        &self,
        event_id: Uuid,
        company_id: Uuid,
    ) -> AppResult<Option<Partnership>> {
        let row: Option<PartnershipRow> = sqlx::query_as(&format!(
            "SELECT {} FROM partnerships WHERE event_id = $1 AND company_id = $2",
            PARTNERSHIP_COLUMNS
        ))
        .bind(event_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;
        self.hydrate_optional(row).await
    }

    async fn partnerships(&self, event_id: Uuid) -> AppResult<Vec<Partnership>> {
        let rows: Vec<PartnershipRow> = sqlx::query_as(&format!(
            "SELECT {} FROM partnerships WHERE event_id = $1 ORDER BY created_at",
            PARTNERSHIP_COLUMNS
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        let mut partnerships = Vec::with_capacity(rows.len());
        for row in rows {
            partnerships.push(self.hydrate(row).await?);
        }
        Ok(partnerships)
    }

    async fn booth_holder(
        &self,
        event_id: Uuid,
        location: &str,
    ) -> AppResult<Option<Partnership>> {
        let row: Option<PartnershipRow> = sqlx::query_as(&format!(
            "SELECT {} FROM partnerships WHERE event_id = $1 AND booth_location = $2",
            PARTNERSHIP_COLUMNS
        ))
        .bind(event_id)
        .bind(location)
        .fetch_optional(&self.pool)
        .await?;
        self.hydrate_optional(row).await
    }

    async fn insert_partnership(&self, partnership: &Partnership) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO partnerships (id, event_id, company_id, selected_pack_id, contact_name, \
             contact_role, language, phone, created_at, updated_at, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(partnership.id)
        .bind(partnership.event_id)
        .bind(partnership.company_id)
        .bind(partnership.selected_pack_id)
        .bind(&partnership.contact.name)
        .bind(&partnership.contact.role)
        .bind(&partnership.language)
        .bind(&partnership.phone)
        .bind(partnership.created_at)
        .bind(partnership.updated_at)
        .bind(partnership.version)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, partnership))?;

        write_children(&mut tx, partnership).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn save_partnership(&self, partnership: &Partnership) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let stored: Option<i64> =
            sqlx::query_scalar("SELECT version FROM partnerships WHERE id = $1 FOR UPDATE")
                .bind(partnership.id)
                .fetch_optional(&mut *tx)
                .await?;
        match stored {
            None => {
                return Err(AppError::NotFound(format!(
                    "Partnership {} not found",
                    partnership.id
                )))
            }
            Some(version) if version + 1 != partnership.version => {
                return Err(stale_write(partnership.id))
            }
            Some(_) => {}
        }

        sqlx::query(
            "UPDATE partnerships SET selected_pack_id = $2, contact_name = $3, contact_role = $4, \
             language = $5, phone = $6, validated_at = $7, declined_at = $8, \
             suggestion_pack_id = $9, suggestion_sent_at = $10, suggestion_approved_at = $11, \
             suggestion_declined_at = $12, organiser_id = $13, pack_price_override = $14, \
             booth_location = $15, agreement_url = $16, agreement_signed_url = $17, \
             assignment_url = $18, publication_date = $19, support_url = $20, updated_at = $21, \
             version = $22 WHERE id = $1",
        )
        .bind(partnership.id)
        .bind(partnership.selected_pack_id)
        .bind(&partnership.contact.name)
        .bind(&partnership.contact.role)
        .bind(&partnership.language)
        .bind(&partnership.phone)
        .bind(partnership.validated_at)
        .bind(partnership.declined_at)
        .bind(partnership.suggestion.pack_id)
        .bind(partnership.suggestion.sent_at)
        .bind(partnership.suggestion.approved_at)
        .bind(partnership.suggestion.declined_at)
        .bind(partnership.organiser_id)
        .bind(partnership.pack_price_override)
        .bind(&partnership.booth_location)
        .bind(&partnership.documents.agreement_url)
        .bind(&partnership.documents.agreement_signed_url)
        .bind(&partnership.documents.assignment_url)
        .bind(partnership.communication.publication_date)
        .bind(&partnership.communication.support_url)
        .bind(partnership.updated_at)
        .bind(partnership.version)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, partnership))?;

        write_children(&mut tx, partnership).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_partnership(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
        version: i64,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let stored: Option<i64> = sqlx::query_scalar(
            "SELECT version FROM partnerships WHERE id = $1 AND event_id = $2 FOR UPDATE",
        )
        .bind(partnership_id)
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?;
        match stored {
            None => {
                return Err(AppError::NotFound(format!(
                    "Partnership {} not found",
                    partnership_id
                )))
            }
            Some(stored) if stored != version => return Err(stale_write(partnership_id)),
            Some(_) => {}
        }

        sqlx::query("DELETE FROM partnerships WHERE id = $1")
            .bind(partnership_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
