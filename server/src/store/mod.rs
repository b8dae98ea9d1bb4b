pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Company, Event, Organisation, PackCatalog, Partnership};
use crate::utils::error::{AppError, AppResult};

pub use memory::InMemoryStore;
pub use postgres::PgPartnershipStore;

#[async_trait]
pub trait PartnershipStore: Send + Sync {
    async fn event(&self, event_id: Uuid) -> AppResult<Option<Event>>;

    async fn organisation(&self, organisation_id: Uuid) -> AppResult<Option<Organisation>>;

    async fn company(&self, company_id: Uuid) -> AppResult<Option<Company>>;

    /// Pack scoped to its event, with every associated option.
    async fn pack_catalog(&self, event_id: Uuid, pack_id: Uuid) -> AppResult<Option<PackCatalog>>;

    async fn partnership(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
    ) -> AppResult<Option<Partnership>>;

    async fn partnership_for_company(
        &self,
        event_id: Uuid,
        company_id: Uuid,
    ) -> AppResult<Option<Partnership>>;

    async fn partnerships(&self, event_id: Uuid) -> AppResult<Vec<Partnership>>;

    /// Partnership of the event currently holding `location`, if any.
    async fn booth_holder(&self, event_id: Uuid, location: &str)
        -> AppResult<Option<Partnership>>;

    /// Fails with `Conflict` if the company already has a partnership.
    async fn insert_partnership(&self, partnership: &Partnership) -> AppResult<()>;

    /// Replaces the stored aggregate, sub-records included, in one atomic
    /// write. Fails with `Conflict` unless the stored version is
    /// `partnership.version - 1`.
    async fn save_partnership(&self, partnership: &Partnership) -> AppResult<()>;

    /// Fails with `Conflict` if the stored version moved past `version`.
    async fn delete_partnership(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
        version: i64,
    ) -> AppResult<()>;
}

pub(crate) fn duplicate_registration(event_id: Uuid, company_id: Uuid) -> AppError {
    AppError::Conflict(format!(
        "Company {} already has a partnership for event {}",
        company_id, event_id
    ))
}

pub(crate) fn stale_write(partnership_id: Uuid) -> AppError {
    AppError::Conflict(format!(
        "Partnership {} was modified by another request, retry",
        partnership_id
    ))
}

pub(crate) fn booth_taken(location: &str) -> AppError {
    AppError::Forbidden(format!(
        "Location {} is already assigned to another partnership",
        location
    ))
}
