use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An option proposed by a registrant or an organiser's suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptionSelection {
    Text { option_id: Uuid },
    TypedQuantitative { option_id: Uuid, selected_quantity: i32 },
    TypedNumber { option_id: Uuid },
    TypedSelectable { option_id: Uuid, selected_value_id: Uuid },
}

impl OptionSelection {
    pub fn option_id(&self) -> Uuid {
        match self {
            OptionSelection::Text { option_id }
            | OptionSelection::TypedQuantitative { option_id, .. }
            | OptionSelection::TypedNumber { option_id }
            | OptionSelection::TypedSelectable { option_id, .. } => *option_id,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OptionSelection::Text { .. } => "text",
            OptionSelection::TypedQuantitative { .. } => "typed_quantitative",
            OptionSelection::TypedNumber { .. } => "typed_number",
            OptionSelection::TypedSelectable { .. } => "typed_selectable",
        }
    }
}

/// A concrete (partnership, pack, option) selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnershipOption {
    pub pack_id: Uuid,
    pub option_id: Uuid,
    pub quantity: Option<i32>,
    pub selected_value_id: Option<Uuid>,
    pub price_override: Option<Decimal>,
}
