//! # Flat Field Maps
//!
//! Untyped call shape for boundary code: a flat map of named numbers in,
//! `{ amount, percent }` out.
//!
//! ## Field Names
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cm0   shipping_revenue, net_retail, wholesale_price                    │
//! │  cm1   return_rate, return_shipping, return_fulfillment,               │
//! │        cancellation_rate, depreciation                                 │
//! │  cm2   outbound_shipping, inbound_shipping, packaging, fulfillment,    │
//! │        payment_cost, refunds, retail_price                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! A tier needs its own fields plus every lower tier's fields. Unknown keys
//! are ignored, so a map can carry extra product data.
//!
//! ## Usage
//! ```rust
//! use std::collections::HashMap;
//! use margin_core::flat::calculate;
//! use margin_core::margin::round_to_cents;
//!
//! let map: HashMap<String, f64> = [
//!     ("shipping_revenue", 6.77),
//!     ("net_retail", 14.29),
//!     ("wholesale_price", 8.00),
//! ]
//! .into_iter()
//! .map(|(k, v)| (k.to_string(), v))
//! .collect();
//!
//! let cm0 = calculate(&map, "cm0").unwrap();
//! assert_eq!(round_to_cents(cm0.amount), 13.06);
//! assert!(calculate(&map, "cm1").is_err()); // return fields missing
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::error::CoreResult;
use crate::margin::{cm0, cm1, cm2};
use crate::pricing::lowest_possible_price;
use crate::types::{Cm0Values, Cm1Values, Cm2Values, MarginAmounts, Tier};
use crate::validation::{validate_finite, ValidationResult};
use crate::ValidationError;

/// Flat map of named inputs.
pub type FieldMap = HashMap<String, f64>;

/// Fields owned by the CM0 layer.
pub const CM0_FIELDS: [&str; 3] = ["shipping_revenue", "net_retail", "wholesale_price"];

/// Fields owned by the CM1 layer.
pub const CM1_FIELDS: [&str; 5] = [
    "return_rate",
    "return_shipping",
    "return_fulfillment",
    "cancellation_rate",
    "depreciation",
];

/// Fields owned by the CM2 layer.
pub const CM2_FIELDS: [&str; 7] = [
    "outbound_shipping",
    "inbound_shipping",
    "packaging",
    "fulfillment",
    "payment_cost",
    "refunds",
    "retail_price",
];

fn field(map: &FieldMap, name: &str) -> ValidationResult<f64> {
    let value = map.get(name).copied().ok_or_else(|| ValidationError::Required {
        field: name.to_string(),
    })?;
    validate_finite(name, value)
}

fn has_any(map: &FieldMap, names: &[&str]) -> bool {
    names.iter().any(|name| map.contains_key(*name))
}

// =============================================================================
// Value Builders
// =============================================================================

/// Builds CM0 values from a field map.
pub fn cm0_values_from_map(map: &FieldMap) -> ValidationResult<Cm0Values> {
    Ok(Cm0Values::new(
        field(map, "shipping_revenue")?,
        field(map, "net_retail")?,
        field(map, "wholesale_price")?,
    ))
}

/// Builds CM1 values (and the CM0 layer inside) from a field map.
pub fn cm1_values_from_map(map: &FieldMap) -> ValidationResult<Cm1Values> {
    Ok(Cm1Values::new(
        cm0_values_from_map(map)?,
        field(map, "return_rate")?,
        field(map, "return_shipping")?,
        field(map, "return_fulfillment")?,
        field(map, "cancellation_rate")?,
        field(map, "depreciation")?,
    ))
}

/// Builds the full CM2 value chain from a field map.
pub fn cm2_values_from_map(map: &FieldMap) -> ValidationResult<Cm2Values> {
    Ok(Cm2Values::new(
        cm1_values_from_map(map)?,
        field(map, "outbound_shipping")?,
        field(map, "inbound_shipping")?,
        field(map, "packaging")?,
        field(map, "fulfillment")?,
        field(map, "payment_cost")?,
        field(map, "refunds")?,
        field(map, "retail_price")?,
    ))
}

// =============================================================================
// Calculations
// =============================================================================

/// Margin at the tier named by `tier` (`"cm0"`, `"cm1"` or `"cm2"`).
///
/// The tag is parsed before any field is read.
pub fn calculate(map: &FieldMap, tier: &str) -> CoreResult<MarginAmounts> {
    let result = match tier.parse::<Tier>()? {
        Tier::Cm0 => cm0(&cm0_values_from_map(map)?),
        Tier::Cm1 => cm1(&cm1_values_from_map(map)?),
        Tier::Cm2 => cm2(&cm2_values_from_map(map)?),
    };
    Ok(result.into())
}

/// Lowest possible price from a field map. Needs every CM2 field.
pub fn lowest_possible_price_from_map(
    map: &FieldMap,
    target_margin: f64,
    tier: &str,
) -> CoreResult<f64> {
    let tier: Tier = tier.parse()?;
    let values = cm2_values_from_map(map)?;
    lowest_possible_price(&values, target_margin, tier)
}

/// Margins for every tier a map describes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TierMargins {
    pub cm0: MarginAmounts,
    pub cm1: Option<MarginAmounts>,
    pub cm2: Option<MarginAmounts>,
}

/// Computes CM0 and every higher tier whose fields appear in the map.
///
/// A tier counts as present once any of its own fields is there; from then
/// on all of its fields are required.
pub fn margins_from_map(map: &FieldMap) -> ValidationResult<TierMargins> {
    let mut margins = TierMargins {
        cm0: cm0(&cm0_values_from_map(map)?).into(),
        cm1: None,
        cm2: None,
    };

    if has_any(map, &CM1_FIELDS) || has_any(map, &CM2_FIELDS) {
        margins.cm1 = Some(cm1(&cm1_values_from_map(map)?).into());
    }
    if has_any(map, &CM2_FIELDS) {
        margins.cm2 = Some(cm2(&cm2_values_from_map(map)?).into());
    }

    Ok(margins)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::margin::round_to_cents;

    /// Sample product, including keys the engine does not use.
    fn sample_map() -> FieldMap {
        [
            ("free_shipping_threshold", 150.0),
            ("shipping_revenue", 6.77),
            ("net_retail", 14.29),
            ("wholesale_price", 8.00),
            ("net_recommended_retail_price", 19.00),
            ("return_rate", 0.094),
            ("return_shipping", 5.05),
            ("return_fulfillment", 1.16),
            ("cancellation_rate", 0.0242),
            ("depreciation", 0.1),
            ("inbound_shipping", 0.36),
            ("packaging", 0.68),
            ("fulfillment", 3.82),
            ("outbound_shipping", 5.05),
            ("payment_cost", 0.0195),
            ("refunds", 0.0133),
            ("retail_price", 17.00),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
    }

    fn cm0_only_map() -> FieldMap {
        sample_map()
            .into_iter()
            .filter(|(key, _)| CM0_FIELDS.contains(&key.as_str()))
            .collect()
    }

    #[test]
    fn test_calculate_each_tier() {
        let map = sample_map();

        let cm0 = calculate(&map, "cm0").unwrap();
        assert_eq!(round_to_cents(cm0.amount), 13.06);
        assert_eq!(round_to_cents(cm0.percent), 91.39);

        let cm1 = calculate(&map, "cm1").unwrap();
        assert_eq!(round_to_cents(cm1.amount), 12.44);
        assert_eq!(round_to_cents(cm1.percent), 87.07);

        let cm2 = calculate(&map, "cm2").unwrap();
        assert_eq!(round_to_cents(cm2.amount), 1.84);
        assert_eq!(round_to_cents(cm2.percent), 12.89);
    }

    #[test]
    fn test_matches_typed_call_shape() {
        let map = sample_map();
        let typed = cm2(&cm2_values_from_map(&map).unwrap());
        let flat = calculate(&map, "cm2").unwrap();
        assert_eq!(flat, MarginAmounts::from(typed));
    }

    #[test]
    fn test_lowest_possible_price_from_map() {
        let price = lowest_possible_price_from_map(&sample_map(), 12.00, "cm2").unwrap();
        assert_eq!(round_to_cents(price), 16.82);

        let mut map = sample_map();
        map.insert("wholesale_price".to_string(), 1.0);
        let price = lowest_possible_price_from_map(&map, 45.00, "cm0").unwrap();
        assert_eq!(round_to_cents(price), -12.48);
    }

    #[test]
    fn test_unknown_tier_rejected_before_fields() {
        // Empty map: a Required error here would mean fields were read first.
        let err = calculate(&FieldMap::new(), "cm9").unwrap_err();
        assert!(matches!(err, CoreError::UnknownTier(_)));

        let err = lowest_possible_price_from_map(&FieldMap::new(), 12.0, "gross").unwrap_err();
        assert!(matches!(err, CoreError::UnknownTier(_)));
    }

    #[test]
    fn test_missing_field() {
        let err = calculate(&cm0_only_map(), "cm1").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Required { field }) if field == "return_rate"
        ));
    }

    #[test]
    fn test_non_finite_field() {
        let mut map = sample_map();
        map.insert("packaging".to_string(), f64::NAN);
        let err = cm2_values_from_map(&map).unwrap_err();
        assert!(matches!(err, ValidationError::NotFinite { field, .. } if field == "packaging"));
    }

    #[test]
    fn test_margins_from_map() {
        let full = margins_from_map(&sample_map()).unwrap();
        assert!(full.cm1.is_some());
        assert_eq!(round_to_cents(full.cm2.unwrap().percent), 12.89);

        let partial = margins_from_map(&cm0_only_map()).unwrap();
        assert_eq!(round_to_cents(partial.cm0.amount), 13.06);
        assert!(partial.cm1.is_none());
        assert!(partial.cm2.is_none());
    }

    #[test]
    fn test_margins_from_map_requires_complete_tiers() {
        let mut map = cm0_only_map();
        map.insert("retail_price".to_string(), 17.0);
        assert!(matches!(
            margins_from_map(&map),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_field_map_from_json() {
        let map: FieldMap = serde_json::from_str(
            r#"{ "shipping_revenue": 6.77, "net_retail": 14.29, "wholesale_price": 8.0 }"#,
        )
        .unwrap();
        let amounts = calculate(&map, "cm0").unwrap();
        assert_eq!(round_to_cents(amounts.percent), 91.39);
    }
}
