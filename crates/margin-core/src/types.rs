//! # Domain Types
//!
//! Layered value objects and margin results.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Layer Value Objects                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │ Cm2Values                                                       │   │
//! │  │  outbound_shipping, inbound_shipping, packaging, fulfillment    │   │
//! │  │  payment_cost (rate), refunds (rate), retail_price              │   │
//! │  │                                                                 │   │
//! │  │  ┌───────────────────────────────────────────────────────────┐  │   │
//! │  │  │ Cm1Values                                                 │  │   │
//! │  │  │  return_rate, return_shipping, return_fulfillment         │  │   │
//! │  │  │  cancellation_rate, depreciation                          │  │   │
//! │  │  │                                                           │  │   │
//! │  │  │  ┌─────────────────────────────────────────────────────┐  │  │   │
//! │  │  │  │ Cm0Values                                           │  │  │   │
//! │  │  │  │  shipping_revenue, net_retail, wholesale_price      │  │  │   │
//! │  │  │  └─────────────────────────────────────────────────────┘  │  │   │
//! │  │  └───────────────────────────────────────────────────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  MarginResult { absolute, relative }   MarginAmounts { amount, percent }│
//! │  Tier: Cm0 | Cm1 | Cm2                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! Each tier owns its lower tier by value. All value objects are `Copy`, so
//! the solver can take a stack copy per trial price without allocating.
//!
//! ## No Range Checks
//! Rates outside 0..1 and negative prices are accepted as-is. Negative
//! margins are expected results, not errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;

// =============================================================================
// CM0 Values
// =============================================================================

/// Base product economics: revenue against unit cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cm0Values {
    /// Shipping charged to the customer.
    pub shipping_revenue: f64,

    /// Retail price net of tax and fees. Revenue base for relative margins.
    pub net_retail: f64,

    /// Unit cost.
    pub wholesale_price: f64,
}

impl Cm0Values {
    /// Creates CM0 values.
    pub const fn new(shipping_revenue: f64, net_retail: f64, wholesale_price: f64) -> Self {
        Self {
            shipping_revenue,
            net_retail,
            wholesale_price,
        }
    }
}

// =============================================================================
// CM1 Values
// =============================================================================

/// CM0 economics adjusted for expected returns and cancellations.
///
/// Rates are probabilities applied linearly (expected cost, not compounded).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cm1Values {
    /// The wrapped CM0 layer.
    pub cm0: Cm0Values,

    /// Share of units that come back.
    pub return_rate: f64,

    /// Shipping cost of a return.
    pub return_shipping: f64,

    /// Handling cost of a return.
    pub return_fulfillment: f64,

    /// Share of orders cancelled.
    pub cancellation_rate: f64,

    /// Value loss rate applied to cancelled goods.
    pub depreciation: f64,
}

impl Cm1Values {
    /// Wraps CM0 values with return and cancellation inputs.
    pub const fn new(
        cm0: Cm0Values,
        return_rate: f64,
        return_shipping: f64,
        return_fulfillment: f64,
        cancellation_rate: f64,
        depreciation: f64,
    ) -> Self {
        Self {
            cm0,
            return_rate,
            return_shipping,
            return_fulfillment,
            cancellation_rate,
            depreciation,
        }
    }
}

// =============================================================================
// CM2 Values
// =============================================================================

/// CM1 economics plus logistics and price-proportional costs.
///
/// `retail_price` is the quantity the price solver varies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cm2Values {
    /// The wrapped CM1 layer.
    pub cm1: Cm1Values,

    /// Per-unit outbound shipping cost.
    pub outbound_shipping: f64,

    /// Per-unit inbound shipping cost.
    pub inbound_shipping: f64,

    /// Per-unit packaging cost.
    pub packaging: f64,

    /// Per-unit fulfillment cost.
    pub fulfillment: f64,

    /// Payment fee rate, applied to shipping revenue plus retail price.
    pub payment_cost: f64,

    /// Refund rate, applied to retail price.
    pub refunds: f64,

    /// Gross price the unit sells at.
    pub retail_price: f64,
}

impl Cm2Values {
    /// Wraps CM1 values with logistics and payment inputs.
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        cm1: Cm1Values,
        outbound_shipping: f64,
        inbound_shipping: f64,
        packaging: f64,
        fulfillment: f64,
        payment_cost: f64,
        refunds: f64,
        retail_price: f64,
    ) -> Self {
        Self {
            cm1,
            outbound_shipping,
            inbound_shipping,
            packaging,
            fulfillment,
            payment_cost,
            refunds,
            retail_price,
        }
    }

    /// Innermost CM0 layer.
    #[inline]
    pub const fn cm0(&self) -> &Cm0Values {
        &self.cm1.cm0
    }

    /// Copy with a new retail price and net retail. Every other field is
    /// unchanged.
    #[inline]
    pub(crate) fn repriced(&self, retail_price: f64, net_retail: f64) -> Self {
        let mut values = *self;
        values.retail_price = retail_price;
        values.cm1.cm0.net_retail = net_retail;
        values
    }
}

// =============================================================================
// Margin Result
// =============================================================================

/// Margin at one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MarginResult {
    /// Currency margin per unit.
    pub absolute: f64,

    /// Margin as a percentage of the revenue base (net retail).
    pub relative: f64,
}

impl MarginResult {
    #[inline]
    pub const fn new(absolute: f64, relative: f64) -> Self {
        Self { absolute, relative }
    }
}

/// Flat result shape: `{ "amount": .., "percent": .. }`.
///
/// Same numbers as [`MarginResult`], named for boundary code that works with
/// untyped field maps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MarginAmounts {
    pub amount: f64,
    pub percent: f64,
}

impl From<MarginResult> for MarginAmounts {
    fn from(result: MarginResult) -> Self {
        Self {
            amount: result.absolute,
            percent: result.relative,
        }
    }
}

// =============================================================================
// Tier
// =============================================================================

/// Contribution margin tier.
///
/// ```text
/// Cm0 ── product margin
/// Cm1 ── + returns, cancellations
/// Cm2 ── + logistics, payment fees, refunds
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Cm0,
    Cm1,
    #[default]
    Cm2,
}

impl Tier {
    /// All tiers, lowest first.
    pub const ALL: [Tier; 3] = [Tier::Cm0, Tier::Cm1, Tier::Cm2];

    /// Lowercase tag used on the wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Tier::Cm0 => "cm0",
            Tier::Cm1 => "cm1",
            Tier::Cm2 => "cm2",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cm0" => Ok(Tier::Cm0),
            "cm1" => Ok(Tier::Cm1),
            "cm2" => Ok(Tier::Cm2),
            other => Err(CoreError::UnknownTier(other.to_string())),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
