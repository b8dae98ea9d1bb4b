pub mod billing;
pub mod booth;
pub mod catalog;
pub mod decision;
pub mod documents;
pub mod listing;
pub mod notifications;
pub mod pricing;
pub mod registration;
pub mod suggestion;

use std::sync::Arc;

use uuid::Uuid;

use crate::gateways::{DocumentRenderer, NotificationGateway, ObjectStore};
use crate::models::{Company, Event, PackCatalog, PackSource, Partnership, PartnershipOption};
use crate::store::PartnershipStore;
use crate::utils::error::{AppError, AppResult};

/// The pack a partnership is entitled to, with the selections made for it.
#[derive(Debug, Clone)]
pub struct ResolvedPack {
    pub source: PackSource,
    pub catalog: PackCatalog,
    pub options: Vec<PartnershipOption>,
}

#[derive(Clone)]
pub struct PartnershipEngine {
    store: Arc<dyn PartnershipStore>,
    renderer: Arc<dyn DocumentRenderer>,
    objects: Arc<dyn ObjectStore>,
    notifier: Arc<dyn NotificationGateway>,
}

impl PartnershipEngine {
    pub fn new(
        store: Arc<dyn PartnershipStore>,
        renderer: Arc<dyn DocumentRenderer>,
        objects: Arc<dyn ObjectStore>,
        notifier: Arc<dyn NotificationGateway>,
    ) -> Self {
        Self {
            store,
            renderer,
            objects,
            notifier,
        }
    }

    pub fn store(&self) -> &dyn PartnershipStore {
        self.store.as_ref()
    }

    pub(crate) async fn load_event(&self, event_id: Uuid) -> AppResult<Event> {
        self.store
            .event(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))
    }

    pub(crate) async fn load_company(&self, company_id: Uuid) -> AppResult<Company> {
        self.store
            .company(company_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Company {} not found", company_id)))
    }

    pub(crate) async fn load_catalog(&self, event_id: Uuid, pack_id: Uuid) -> AppResult<PackCatalog> {
        self.store
            .pack_catalog(event_id, pack_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Pack {} not found for event {}", pack_id, event_id))
            })
    }

    pub(crate) async fn load_partnership(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
    ) -> AppResult<Partnership> {
        self.store
            .partnership(event_id, partnership_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Partnership {} not found for event {}",
                    partnership_id, event_id
                ))
            })
    }

    /// Partnership looked up within an (event, company) scope.
    pub(crate) async fn load_company_partnership(
        &self,
        event_id: Uuid,
        company_id: Uuid,
        partnership_id: Uuid,
    ) -> AppResult<Partnership> {
        let partnership = self.load_partnership(event_id, partnership_id).await?;
        if partnership.company_id != company_id {
            return Err(AppError::NotFound(format!(
                "Partnership {} not found for company {}",
                partnership_id, company_id
            )));
        }
        Ok(partnership)
    }

    /// Single resolution point for the validated pack. Pricing, ticketing
    /// and documents all go through here.
    pub async fn resolve_validated_pack(&self, partnership: &Partnership) -> AppResult<ResolvedPack> {
        let target = partnership.validated_pack().ok_or_else(|| {
            AppError::NotFound(format!(
                "No validated pack found for partnership {}",
                partnership.id
            ))
        })?;

        let catalog = self.load_catalog(partnership.event_id, target.pack_id).await?;
        Ok(ResolvedPack {
            source: target.source,
            catalog,
            options: target.options.to_vec(),
        })
    }
}
