//! # Margin Module
//!
//! The contribution margin formulas.
//!
//! ## Tier Formulas
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CM0  shipping_revenue + net_retail - wholesale_price                   │
//! │                                                                         │
//! │  CM1  CM0                                                               │
//! │       - return_rate × (return_shipping + return_fulfillment)           │
//! │       - cancellation_rate × depreciation × net_retail                  │
//! │                                                                         │
//! │  CM2  CM1                                                               │
//! │       - (inbound_shipping + packaging + fulfillment + outbound_shipping)│
//! │       - payment_cost × (shipping_revenue + retail_price)               │
//! │       - refunds × retail_price                                         │
//! │                                                                         │
//! │  relative = absolute / net_retail × 100   (every tier)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use margin_core::margin::{cm0, round_to_cents};
//! use margin_core::Cm0Values;
//!
//! let result = cm0(&Cm0Values::new(6.77, 14.29, 8.00));
//! assert_eq!(round_to_cents(result.absolute), 13.06);
//! assert_eq!(round_to_cents(result.relative), 91.39);
//! ```

use crate::types::{Cm0Values, Cm1Values, Cm2Values, MarginResult, Tier};

// =============================================================================
// Relative Margin
// =============================================================================

/// Expresses `absolute` as a percentage of `revenue_base`.
///
/// ## Zero Revenue Base
/// ```text
/// absolute > 0  →  +inf
/// absolute < 0  →  -inf
/// absolute = 0  →  0.0
/// ```
/// The price solver relies on the signed infinity at price zero to pick the
/// search direction.
#[inline]
pub fn relative_margin(absolute: f64, revenue_base: f64) -> f64 {
    if revenue_base == 0.0 {
        if absolute > 0.0 {
            f64::INFINITY
        } else if absolute < 0.0 {
            f64::NEG_INFINITY
        } else {
            0.0
        }
    } else {
        (absolute / revenue_base) * 100.0
    }
}

/// Rounds to two decimal places, half away from zero.
///
/// Infinities pass through unchanged.
#[inline]
pub fn round_to_cents(value: f64) -> f64 {
    round_to(value, 2)
}

/// Rounds to `places` decimal places, half away from zero.
#[inline]
pub fn round_to(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(places as i32);
    (value * scale).round() / scale
}

// =============================================================================
// Tier Calculations
// =============================================================================

/// CM0: product margin before returns and fulfillment.
#[inline]
pub fn cm0(values: &Cm0Values) -> MarginResult {
    let absolute = values.shipping_revenue + values.net_retail - values.wholesale_price;
    MarginResult::new(absolute, relative_margin(absolute, values.net_retail))
}

/// CM1: CM0 minus the expected cost of returns and cancellations.
///
/// ## Example
/// ```rust
/// use margin_core::margin::{cm1, round_to_cents};
/// use margin_core::{Cm0Values, Cm1Values};
///
/// let cm0 = Cm0Values::new(6.77, 14.29, 8.00);
/// let result = cm1(&Cm1Values::new(cm0, 0.094, 5.05, 1.16, 0.0242, 0.1));
/// assert_eq!(round_to_cents(result.absolute), 12.44);
/// assert_eq!(round_to_cents(result.relative), 87.07);
/// ```
#[inline]
pub fn cm1(values: &Cm1Values) -> MarginResult {
    let base = &values.cm0;
    let returns = values.return_rate * (values.return_shipping + values.return_fulfillment);
    let cancellations = values.cancellation_rate * values.depreciation * base.net_retail;

    let absolute = cm0(base).absolute - returns - cancellations;
    MarginResult::new(absolute, relative_margin(absolute, base.net_retail))
}

/// CM2: CM1 minus logistics, payment fees and refunds.
///
/// The only tier whose absolute margin depends on `retail_price`.
#[inline]
pub fn cm2(values: &Cm2Values) -> MarginResult {
    let base = values.cm0();
    let logistics =
        values.inbound_shipping + values.packaging + values.fulfillment + values.outbound_shipping;
    let payment = values.payment_cost * (base.shipping_revenue + values.retail_price);
    let reclamation = values.refunds * values.retail_price;

    let absolute = cm1(&values.cm1).absolute - (logistics + payment + reclamation);
    MarginResult::new(absolute, relative_margin(absolute, base.net_retail))
}

impl Tier {
    /// Margin of `values` at this tier. Lower tiers ignore the outer layers.
    #[inline]
    pub fn margin(&self, values: &Cm2Values) -> MarginResult {
        match self {
            Tier::Cm0 => cm0(values.cm0()),
            Tier::Cm1 => cm1(&values.cm1),
            Tier::Cm2 => cm2(values),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
