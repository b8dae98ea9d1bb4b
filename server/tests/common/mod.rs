//! Shared fixtures for the scenario tests: one organisation, one event,
//! two companies and a small pack catalog, all held in memory.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use tempfile::TempDir;
use uuid::Uuid;

use partners_server::engine::registration::RegisterPartnership;
use partners_server::engine::PartnershipEngine;
use partners_server::gateways::{
    Destination, JsonSnapshotRenderer, LocalObjectStore, Notification, NotificationGateway,
    ObjectStore,
};
use partners_server::models::{
    Company, Event, OptionKind, OptionSelection, OptionTranslation, Organisation, PackCatalog,
    Partnership, SponsoringOption, SponsoringPack,
};
use partners_server::store::{InMemoryStore, PartnershipStore};
use partners_server::utils::error::{AppError, AppResult};

pub struct Fixture {
    pub engine: PartnershipEngine,
    pub store: InMemoryStore,
    pub notifier: Arc<RecordingNotifier>,
    pub storage: TempDir,
    pub organisation_id: Uuid,
    pub event_id: Uuid,
    pub acme: Uuid,
    pub globex: Uuid,
    /// 100000, two tickets.
    pub silver: Uuid,
    /// 200000, five tickets, booth.
    pub gold: Uuid,
    /// Bundled with every pack, not priced.
    pub logo: Uuid,
    /// Optional, priced 5000, translated in fr and en.
    pub stand: Uuid,
    /// Optional quantitative goodies, priced 100, fr only.
    pub goodies: Uuid,
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(Vec<Destination>, Notification)>>,
}

#[async_trait]
impl NotificationGateway for RecordingNotifier {
    async fn deliver(
        &self,
        _event: &Event,
        destinations: &[Destination],
        notification: &Notification,
    ) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((destinations.to_vec(), notification.clone()));
        Ok(())
    }
}

/// Delegates to the in-memory store, yielding to the scheduler around every
/// call so concurrent requests interleave between their reads and writes.
pub struct YieldingStore(pub InMemoryStore);

#[async_trait]
impl PartnershipStore for YieldingStore {
    async fn event(&self, event_id: Uuid) -> AppResult<Option<Event>> {
        tokio::task::yield_now().await;
        self.0.event(event_id).await
    }

    async fn organisation(&self, organisation_id: Uuid) -> AppResult<Option<Organisation>> {
        tokio::task::yield_now().await;
        self.0.organisation(organisation_id).await
    }

    async fn company(&self, company_id: Uuid) -> AppResult<Option<Company>> {
        tokio::task::yield_now().await;
        self.0.company(company_id).await
    }

    async fn pack_catalog(&self, event_id: Uuid, pack_id: Uuid) -> AppResult<Option<PackCatalog>> {
        tokio::task::yield_now().await;
        self.0.pack_catalog(event_id, pack_id).await
    }

    async fn partnership(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
    ) -> AppResult<Option<Partnership>> {
        let found = self.0.partnership(event_id, partnership_id).await;
        tokio::task::yield_now().await;
        found
    }

    async fn partnership_for_company(
        &self,
        event_id: Uuid,
        company_id: Uuid,
    ) -> AppResult<Option<Partnership>> {
        let found = self.0.partnership_for_company(event_id, company_id).await;
        tokio::task::yield_now().await;
        found
    }

    async fn partnerships(&self, event_id: Uuid) -> AppResult<Vec<Partnership>> {
        let found = self.0.partnerships(event_id).await;
        tokio::task::yield_now().await;
        found
    }

    async fn booth_holder(
        &self,
        event_id: Uuid,
        location: &str,
    ) -> AppResult<Option<Partnership>> {
        let found = self.0.booth_holder(event_id, location).await;
        tokio::task::yield_now().await;
        found
    }

    async fn insert_partnership(&self, partnership: &Partnership) -> AppResult<()> {
        tokio::task::yield_now().await;
        self.0.insert_partnership(partnership).await
    }

    async fn save_partnership(&self, partnership: &Partnership) -> AppResult<()> {
        tokio::task::yield_now().await;
        self.0.save_partnership(partnership).await
    }

    async fn delete_partnership(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
        version: i64,
    ) -> AppResult<()> {
        tokio::task::yield_now().await;
        self.0.delete_partnership(event_id, partnership_id, version).await
    }
}

/// Object store whose uploads always fail.
pub struct UnreachableObjectStore;

#[async_trait]
impl ObjectStore for UnreachableObjectStore {
    async fn upload(&self, name: &str, _content: Vec<u8>, _mime_type: &str) -> AppResult<String> {
        Err(AppError::ExternalServiceError(format!(
            "upload of {} timed out",
            name
        )))
    }
}

fn translation(language: &str, name: &str) -> OptionTranslation {
    OptionTranslation {
        language: language.to_string(),
        name: name.to_string(),
        description: None,
    }
}

impl Fixture {
    pub fn new() -> Self {
        let storage = tempfile::tempdir().unwrap();
        let objects = Arc::new(LocalObjectStore::new(
            storage.path(),
            "https://files.example.com",
        ));
        Self::with_objects(storage, objects)
    }

    pub fn with_unreachable_storage() -> Self {
        let storage = tempfile::tempdir().unwrap();
        Self::with_objects(storage, Arc::new(UnreachableObjectStore))
    }

    fn with_objects(storage: TempDir, objects: Arc<dyn ObjectStore>) -> Self {
        let store = InMemoryStore::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 10, 31, 18, 0, 0).unwrap();

        let organisation_id = Uuid::new_v4();
        store
            .add_organisation(Organisation {
                id: organisation_id,
                name: "GDG Lille".into(),
                head_office: Some("1 rue de Lille".into()),
                siret: Some("12345678900012".into()),
                iban: Some("FR7630001007941234567890185".into()),
                bic: Some("BDFEFRPP".into()),
                representative_name: Some("Jane Doe".into()),
                representative_role: Some("President".into()),
                created_at: now,
                updated_at: now,
            })
            .unwrap();

        let event_id = Uuid::new_v4();
        store
            .add_event(Event {
                id: event_id,
                organisation_id,
                name: "DevFest Lille".into(),
                contact_email: Some("partners@devfest.example".into()),
                start_time: end - Duration::days(1),
                end_time: end,
                created_at: now,
                updated_at: now,
            })
            .unwrap();

        let company = |name: &str| {
            let id = Uuid::new_v4();
            store
                .add_company(Company {
                    id,
                    name: name.into(),
                    siret: None,
                    head_office: None,
                    site_url: None,
                    created_at: now,
                    updated_at: now,
                })
                .unwrap();
            id
        };
        let acme = company("Acme");
        let globex = company("Globex");

        let pack = |name: &str, base: i64, max: i32, with_booth: bool| {
            let id = Uuid::new_v4();
            store
                .add_pack(SponsoringPack {
                    id,
                    event_id,
                    name: name.into(),
                    base_price: Decimal::new(base, 0),
                    max_quantity: Some(max),
                    with_booth,
                })
                .unwrap();
            id
        };
        let silver = pack("Silver", 100000, 2, false);
        let gold = pack("Gold", 200000, 5, true);

        let option = |price: Option<i64>, kind: OptionKind, translations: Vec<OptionTranslation>| {
            let id = Uuid::new_v4();
            store
                .add_option(SponsoringOption {
                    id,
                    event_id,
                    price: price.map(|p| Decimal::new(p, 0)),
                    kind,
                    translations,
                })
                .unwrap();
            id
        };
        let logo = option(
            None,
            OptionKind::Text,
            vec![translation("fr", "Logo"), translation("en", "Logo")],
        );
        let stand = option(
            Some(5000),
            OptionKind::Text,
            vec![translation("fr", "Stand"), translation("en", "Booth")],
        );
        let goodies = option(
            Some(100),
            OptionKind::TypedQuantitative,
            vec![translation("fr", "Goodies")],
        );

        for pack in [silver, gold] {
            store.attach_option(pack, logo, true).unwrap();
            store.attach_option(pack, stand, false).unwrap();
        }
        store.attach_option(silver, goodies, false).unwrap();

        let engine = PartnershipEngine::new(
            Arc::new(store.clone()),
            Arc::new(JsonSnapshotRenderer),
            objects,
            notifier.clone(),
        );

        Self {
            engine,
            store,
            notifier,
            storage,
            organisation_id,
            event_id,
            acme,
            globex,
            silver,
            gold,
            logo,
            stand,
            goodies,
        }
    }

    pub fn registration(
        &self,
        company_id: Uuid,
        pack_id: Uuid,
        option_selections: Vec<OptionSelection>,
    ) -> RegisterPartnership {
        RegisterPartnership {
            company_id,
            pack_id,
            contact_name: "Ada Lovelace".into(),
            contact_role: "CTO".into(),
            language: "fr".into(),
            phone: None,
            emails: vec!["ada@acme.example".into()],
            option_selections,
        }
    }

    pub async fn register(
        &self,
        company_id: Uuid,
        pack_id: Uuid,
        option_selections: Vec<OptionSelection>,
    ) -> AppResult<Partnership> {
        self.engine
            .register(
                self.event_id,
                self.registration(company_id, pack_id, option_selections),
            )
            .await
    }

    /// Engine over the same data whose store calls interleave under
    /// `tokio::join!`.
    pub fn interleaving_engine(&self) -> PartnershipEngine {
        PartnershipEngine::new(
            Arc::new(YieldingStore(self.store.clone())),
            Arc::new(JsonSnapshotRenderer),
            Arc::new(UnreachableObjectStore),
            self.notifier.clone(),
        )
    }

    pub async fn partnerships(&self) -> Vec<Partnership> {
        self.store.partnerships(self.event_id).await.unwrap()
    }

    /// Registered with the stand option and validated.
    pub async fn validated(&self, company_id: Uuid, pack_id: Uuid) -> Partnership {
        let partnership = self
            .register(
                company_id,
                pack_id,
                vec![OptionSelection::Text {
                    option_id: self.stand,
                }],
            )
            .await
            .unwrap();
        self.engine
            .validate(self.event_id, partnership.id)
            .await
            .unwrap()
    }
}
