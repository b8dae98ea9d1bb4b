use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SponsoringPack {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub base_price: Decimal,
    /// Ticket entitlement ceiling. `None` grants no tickets.
    pub max_quantity: Option<i32>,
    pub with_booth: bool,
}

impl SponsoringPack {
    pub fn ticket_capacity(&self) -> usize {
        self.max_quantity
            .and_then(|quantity| usize::try_from(quantity).ok())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct OptionTranslation {
    pub language: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SelectableValue {
    pub id: Uuid,
    pub value: String,
}

/// How a registrant expresses interest in an option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptionKind {
    Text,
    TypedQuantitative,
    TypedNumber { fixed_quantity: i32 },
    TypedSelectable { values: Vec<SelectableValue> },
}

impl OptionKind {
    pub fn label(&self) -> &'static str {
        match self {
            OptionKind::Text => "text",
            OptionKind::TypedQuantitative => "typed_quantitative",
            OptionKind::TypedNumber { .. } => "typed_number",
            OptionKind::TypedSelectable { .. } => "typed_selectable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SponsoringOption {
    pub id: Uuid,
    pub event_id: Uuid,
    pub price: Option<Decimal>,
    pub kind: OptionKind,
    pub translations: Vec<OptionTranslation>,
}

impl SponsoringOption {
    pub fn translation(&self, language: &str) -> Option<&OptionTranslation> {
        self.translations
            .iter()
            .find(|translation| translation.language == language)
    }
}

/// An option attached to a pack, either bundled (`required`) or offered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackOption {
    pub option: SponsoringOption,
    pub required: bool,
}

/// A pack together with every option associated with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackCatalog {
    pub pack: SponsoringPack,
    pub options: Vec<PackOption>,
}

impl PackCatalog {
    pub fn association(&self, option_id: Uuid) -> Option<&PackOption> {
        self.options.iter().find(|entry| entry.option.id == option_id)
    }

    pub fn option(&self, option_id: Uuid) -> Option<&SponsoringOption> {
        self.association(option_id).map(|entry| &entry.option)
    }

    /// Options a registrant may pick for this pack.
    pub fn selectable_options(&self) -> impl Iterator<Item = &SponsoringOption> {
        self.options
            .iter()
            .filter(|entry| !entry.required)
            .map(|entry| &entry.option)
    }

    pub fn required_options(&self) -> impl Iterator<Item = &SponsoringOption> {
        self.options
            .iter()
            .filter(|entry| entry.required)
            .map(|entry| &entry.option)
    }
}
