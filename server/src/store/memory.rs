use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::{booth_taken, duplicate_registration, stale_write, PartnershipStore};
use crate::models::{
    Company, Event, Organisation, PackCatalog, PackOption, Partnership, SponsoringOption,
    SponsoringPack,
};
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Default)]
struct State {
    organisations: HashMap<Uuid, Organisation>,
    events: HashMap<Uuid, Event>,
    companies: HashMap<Uuid, Company>,
    packs: HashMap<Uuid, SponsoringPack>,
    options: HashMap<Uuid, SponsoringOption>,
    /// (pack, option, required)
    pack_options: Vec<(Uuid, Uuid, bool)>,
    partnerships: HashMap<Uuid, Partnership>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> AppResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| AppError::InternalServerError("in-memory store lock poisoned".into()))
    }

    pub fn add_organisation(&self, organisation: Organisation) -> AppResult<()> {
        self.state()?
            .organisations
            .insert(organisation.id, organisation);
        Ok(())
    }

    pub fn add_event(&self, event: Event) -> AppResult<()> {
        self.state()?.events.insert(event.id, event);
        Ok(())
    }

    pub fn add_company(&self, company: Company) -> AppResult<()> {
        self.state()?.companies.insert(company.id, company);
        Ok(())
    }

    pub fn add_pack(&self, pack: SponsoringPack) -> AppResult<()> {
        self.state()?.packs.insert(pack.id, pack);
        Ok(())
    }

    pub fn add_option(&self, option: SponsoringOption) -> AppResult<()> {
        self.state()?.options.insert(option.id, option);
        Ok(())
    }

    pub fn attach_option(&self, pack_id: Uuid, option_id: Uuid, required: bool) -> AppResult<()> {
        let mut state = self.state()?;
        state
            .pack_options
            .retain(|(pack, option, _)| !(*pack == pack_id && *option == option_id));
        state.pack_options.push((pack_id, option_id, required));
        Ok(())
    }
}

#[async_trait]
impl PartnershipStore for InMemoryStore {
    async fn event(&self, event_id: Uuid) -> AppResult<Option<Event>> {
        Ok(self.state()?.events.get(&event_id).cloned())
    }

    async fn organisation(&self, organisation_id: Uuid) -> AppResult<Option<Organisation>> {
        Ok(self.state()?.organisations.get(&organisation_id).cloned())
    }

    async fn company(&self, company_id: Uuid) -> AppResult<Option<Company>> {
        Ok(self.state()?.companies.get(&company_id).cloned())
    }

    async fn pack_catalog(&self, event_id: Uuid, pack_id: Uuid) -> AppResult<Option<PackCatalog>> {
        let state = self.state()?;
        let Some(pack) = state.packs.get(&pack_id).filter(|p| p.event_id == event_id) else {
            return Ok(None);
        };

        let options = state
            .pack_options
            .iter()
            .filter(|(pack, _, _)| *pack == pack_id)
            .filter_map(|(_, option_id, required)| {
                state.options.get(option_id).map(|option| PackOption {
                    option: option.clone(),
                    required: *required,
                })
            })
            .collect();

        Ok(Some(PackCatalog {
            pack: pack.clone(),
            options,
        }))
    }

    async fn partnership(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
    ) -> AppResult<Option<Partnership>> {
        Ok(self
            .state()?
            .partnerships
            .get(&partnership_id)
            .filter(|p| p.event_id == event_id)
            .cloned())
    }

    async fn partnership_for_company(
        &self,
        event_id: Uuid,
        company_id: Uuid,
    ) -> AppResult<Option<Partnership>> {
        Ok(self
            .state()?
            .partnerships
            .values()
            .find(|p| p.event_id == event_id && p.company_id == company_id)
            .cloned())
    }

    async fn partnerships(&self, event_id: Uuid) -> AppResult<Vec<Partnership>> {
        let mut partnerships: Vec<Partnership> = self
            .state()?
            .partnerships
            .values()
            .filter(|p| p.event_id == event_id)
            .cloned()
            .collect();
        partnerships.sort_by_key(|p| p.created_at);
        Ok(partnerships)
    }

    async fn booth_holder(
        &self,
        event_id: Uuid,
        location: &str,
    ) -> AppResult<Option<Partnership>> {
        Ok(self
            .state()?
            .partnerships
            .values()
            .find(|p| p.event_id == event_id && p.booth_location.as_deref() == Some(location))
            .cloned())
    }

    async fn insert_partnership(&self, partnership: &Partnership) -> AppResult<()> {
        let mut state = self.state()?;
        let duplicate = state.partnerships.values().any(|p| {
            p.event_id == partnership.event_id && p.company_id == partnership.company_id
        });
        if duplicate {
            return Err(duplicate_registration(
                partnership.event_id,
                partnership.company_id,
            ));
        }
        state
            .partnerships
            .insert(partnership.id, partnership.clone());
        Ok(())
    }

    async fn save_partnership(&self, partnership: &Partnership) -> AppResult<()> {
        let mut state = self.state()?;
        let Some(stored) = state.partnerships.get(&partnership.id) else {
            return Err(AppError::NotFound(format!(
                "Partnership {} not found",
                partnership.id
            )));
        };
        if stored.version + 1 != partnership.version {
            return Err(stale_write(partnership.id));
        }
        if let Some(location) = partnership.booth_location.as_deref() {
            let taken = state.partnerships.values().any(|p| {
                p.id != partnership.id
                    && p.event_id == partnership.event_id
                    && p.booth_location.as_deref() == Some(location)
            });
            if taken {
                return Err(booth_taken(location));
            }
        }
        state
            .partnerships
            .insert(partnership.id, partnership.clone());
        Ok(())
    }

    async fn delete_partnership(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
        version: i64,
    ) -> AppResult<()> {
        let mut state = self.state()?;
        match state.partnerships.get(&partnership_id) {
            Some(p) if p.event_id == event_id && p.version != version => {
                Err(stale_write(partnership_id))
            }
            Some(p) if p.event_id == event_id => {
                state.partnerships.remove(&partnership_id);
                Ok(())
            }
            _ => Err(AppError::NotFound(format!(
                "Partnership {} not found",
                partnership_id
            ))),
        }
    }
}
