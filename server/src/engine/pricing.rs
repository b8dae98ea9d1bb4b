//! Amount computation and price overrides.
//!
//! `amount = effective pack price + Σ effective option price`, where the
//! partnership's overrides take precedence over catalog prices and options
//! without any price contribute nothing.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{PartnershipEngine, ResolvedPack};
use crate::models::{PackCatalog, PackSource, PartnershipOption};
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize)]
pub struct PriceOverride {
    /// `None` clears the override.
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedOption {
    pub option_id: Uuid,
    pub catalog_price: Option<Decimal>,
    pub price_override: Option<Decimal>,
    pub effective_price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnershipPricing {
    pub partnership_id: Uuid,
    pub pack_id: Uuid,
    pub pack_name: String,
    pub source: PackSource,
    pub base_price: Decimal,
    pub pack_price_override: Option<Decimal>,
    pub options: Vec<PricedOption>,
    pub amount: Decimal,
}

fn effective_option_price(catalog: &PackCatalog, selection: &PartnershipOption) -> Option<Decimal> {
    selection
        .price_override
        .or_else(|| catalog.option(selection.option_id).and_then(|o| o.price))
}

pub fn compute_amount(
    catalog: &PackCatalog,
    pack_price_override: Option<Decimal>,
    options: &[PartnershipOption],
) -> Decimal {
    let pack_price = pack_price_override.unwrap_or(catalog.pack.base_price);
    options
        .iter()
        .filter_map(|selection| effective_option_price(catalog, selection))
        .fold(pack_price, |total, price| total + price)
}

pub fn price_breakdown(
    partnership_id: Uuid,
    resolved: &ResolvedPack,
    pack_price_override: Option<Decimal>,
) -> PartnershipPricing {
    let catalog = &resolved.catalog;
    PartnershipPricing {
        partnership_id,
        pack_id: catalog.pack.id,
        pack_name: catalog.pack.name.clone(),
        source: resolved.source,
        base_price: catalog.pack.base_price,
        pack_price_override,
        options: resolved
            .options
            .iter()
            .map(|selection| PricedOption {
                option_id: selection.option_id,
                catalog_price: catalog.option(selection.option_id).and_then(|o| o.price),
                price_override: selection.price_override,
                effective_price: effective_option_price(catalog, selection),
            })
            .collect(),
        amount: compute_amount(catalog, pack_price_override, &resolved.options),
    }
}

fn check_not_negative(price: Option<Decimal>) -> AppResult<()> {
    match price {
        Some(price) if price.is_sign_negative() && !price.is_zero() => Err(
            AppError::ValidationError(format!("Price override {} must not be negative", price)),
        ),
        _ => Ok(()),
    }
}

impl PartnershipEngine {
    pub async fn pricing(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
    ) -> AppResult<PartnershipPricing> {
        let partnership = self.load_partnership(event_id, partnership_id).await?;
        let resolved = self.resolve_validated_pack(&partnership).await?;
        Ok(price_breakdown(
            partnership.id,
            &resolved,
            partnership.pack_price_override,
        ))
    }

    /// Sets or clears the pack price override.
    pub async fn set_pack_price(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
        price: Option<Decimal>,
    ) -> AppResult<Option<PartnershipPricing>> {
        check_not_negative(price)?;
        let mut partnership = self.load_partnership(event_id, partnership_id).await?;

        let resolved = match self.resolve_validated_pack(&partnership).await {
            Ok(resolved) => Some(resolved),
            Err(AppError::NotFound(_)) if price.is_none() => None,
            Err(AppError::NotFound(reason)) => {
                return Err(AppError::Conflict(format!(
                    "Cannot override the price of partnership {}: {}",
                    partnership_id, reason
                )))
            }
            Err(e) => return Err(e),
        };

        if partnership.pack_price_override != price {
            partnership.pack_price_override = price;
            partnership.touch(Utc::now());
            self.store().save_partnership(&partnership).await?;
            info!(%event_id, %partnership_id, price = ?price, "Pack price override updated");
        }

        Ok(resolved.map(|resolved| {
            price_breakdown(partnership.id, &resolved, partnership.pack_price_override)
        }))
    }

    /// Sets or clears the price override of one option of the validated pack.
    pub async fn set_option_price(
        &self,
        event_id: Uuid,
        partnership_id: Uuid,
        option_id: Uuid,
        price: Option<Decimal>,
    ) -> AppResult<Option<PartnershipPricing>> {
        check_not_negative(price)?;
        let mut partnership = self.load_partnership(event_id, partnership_id).await?;

        let Some(options) = partnership.validated_options_mut() else {
            if price.is_none() {
                return Ok(None);
            }
            return Err(AppError::Conflict(format!(
                "Cannot override option prices of partnership {}: no validated pack",
                partnership_id
            )));
        };
        let selection = options
            .iter_mut()
            .find(|selection| selection.option_id == option_id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Option {} is not part of the validated pack of partnership {}",
                    option_id, partnership_id
                ))
            })?;

        if selection.price_override != price {
            selection.price_override = price;
            partnership.touch(Utc::now());
            self.store().save_partnership(&partnership).await?;
            info!(%event_id, %partnership_id, %option_id, price = ?price, "Option price override updated");
        }

        let resolved = self.resolve_validated_pack(&partnership).await?;
        Ok(Some(price_breakdown(
            partnership.id,
            &resolved,
            partnership.pack_price_override,
        )))
    }
}
