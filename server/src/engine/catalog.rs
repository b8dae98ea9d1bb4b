use uuid::Uuid;

use crate::models::{OptionKind, OptionSelection, PackCatalog, PartnershipOption, SponsoringOption};
use crate::utils::error::{AppError, AppResult};

fn join_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A quantitative selection of zero means "not selected".
fn is_selected(selection: &OptionSelection) -> bool {
    !matches!(
        selection,
        OptionSelection::TypedQuantitative {
            selected_quantity: 0,
            ..
        }
    )
}

/// Validates `selections` against the pack's optional options and the
/// partnership language, returning the rows to persist.
pub fn validate_selections(
    catalog: &PackCatalog,
    selections: &[OptionSelection],
    language: &str,
) -> AppResult<Vec<PartnershipOption>> {
    let selected: Vec<&OptionSelection> = selections.iter().filter(|s| is_selected(s)).collect();

    let mut seen = Vec::with_capacity(selected.len());
    let mut duplicates = Vec::new();
    for selection in &selected {
        let id = selection.option_id();
        if seen.contains(&id) {
            if !duplicates.contains(&id) {
                duplicates.push(id);
            }
        } else {
            seen.push(id);
        }
    }
    if !duplicates.is_empty() {
        return Err(AppError::ValidationError(format!(
            "Options selected more than once: {}",
            join_ids(&duplicates)
        )));
    }

    let unknown: Vec<Uuid> = seen
        .iter()
        .copied()
        .filter(|id| catalog.association(*id).is_none())
        .collect();
    if !unknown.is_empty() {
        return Err(AppError::ValidationError(format!(
            "Options {} are not associated with pack {}",
            join_ids(&unknown),
            catalog.pack.id
        )));
    }

    let required: Vec<Uuid> = seen
        .iter()
        .copied()
        .filter(|id| catalog.association(*id).is_some_and(|entry| entry.required))
        .collect();
    if !required.is_empty() {
        return Err(AppError::Forbidden(format!(
            "Options {} are not optional for pack {}",
            join_ids(&required),
            catalog.pack.id
        )));
    }

    let mut rows = Vec::with_capacity(selected.len());
    for selection in selected {
        let Some(option) = catalog.option(selection.option_id()) else {
            continue;
        };
        if option.translation(language).is_none() {
            return Err(AppError::Forbidden(format!(
                "Option {} has no translation for language {}",
                option.id, language
            )));
        }
        rows.push(selection_row(catalog.pack.id, option, selection)?);
    }
    Ok(rows)
}

fn selection_row(
    pack_id: Uuid,
    option: &SponsoringOption,
    selection: &OptionSelection,
) -> AppResult<PartnershipOption> {
    let (quantity, selected_value_id) = match (selection, &option.kind) {
        (OptionSelection::Text { .. }, OptionKind::Text) => (None, None),
        (
            OptionSelection::TypedQuantitative {
                selected_quantity, ..
            },
            OptionKind::TypedQuantitative,
        ) => {
            if *selected_quantity < 0 {
                return Err(AppError::ValidationError(format!(
                    "Option {} cannot have a negative quantity",
                    option.id
                )));
            }
            (Some(*selected_quantity), None)
        }
        (OptionSelection::TypedNumber { .. }, OptionKind::TypedNumber { fixed_quantity }) => {
            (Some(*fixed_quantity), None)
        }
        (
            OptionSelection::TypedSelectable {
                selected_value_id, ..
            },
            OptionKind::TypedSelectable { values },
        ) => {
            if !values.iter().any(|value| value.id == *selected_value_id) {
                return Err(AppError::ValidationError(format!(
                    "Value {} is not offered by option {}",
                    selected_value_id, option.id
                )));
            }
            (None, Some(*selected_value_id))
        }
        (selection, kind) => {
            return Err(AppError::ValidationError(format!(
                "Option {} expects a {} selection, got {}",
                option.id,
                kind.label(),
                selection.label()
            )))
        }
    };

    Ok(PartnershipOption {
        pack_id,
        option_id: option.id,
        quantity,
        selected_value_id,
        price_override: None,
    })
}
