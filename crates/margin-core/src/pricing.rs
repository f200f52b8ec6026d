//! # Pricing Module
//!
//! Inverts the margin formulas: finds the lowest price that still meets a
//! target relative margin at a chosen tier.
//!
//! ## Price Indirection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Supplied values:  retail_price = 17.00, net_retail = 14.29            │
//! │                    price_ratio  = 17.00 / 14.29  (held fixed)           │
//! │                                                                         │
//! │  Trial price p:    retail_price = p                                    │
//! │                    net_retail   = p / price_ratio                      │
//! │                    everything else unchanged                           │
//! │                                                                         │
//! │  CM0 and CM1 never read retail_price, so they see the trial price      │
//! │  through net_retail. CM2 sees it through both.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Search
//! ```text
//! margin(0) > target? → negative side first, else positive side first
//!      │
//!      ▼
//! bracket one side: walk outward from 0
//!   positive: 2 × |retail_price|, doubling    negative: -1, doubling
//!   stop at the first step where the margin crosses the target
//!   (≤ max_bracket_expansions doublings)
//!      │
//!      ├── no crossing → bracket the other side the same way
//!      │                 └── no crossing there either → Unbracketed
//!      ▼
//! bisect: margin(mid) rounded to `precision` places
//!      ├── > target → above = mid
//!      ├── < target → below = mid
//!      └── = target → converged, return mid
//!      │
//!      └── interval collapsed / max_iterations → NotConverged
//! ```
//!
//! Relative margin has a pole at price 0: the margin runs to ±∞ on one side
//! and ∓∞ on the other. A target out of reach on one side can still be
//! reachable on the other, so bracketing never crosses 0 and never trusts
//! the value at 0 itself. The zero endpoint takes the margin just off zero
//! on the side being searched.
//!
//! Negative prices are valid results: a cost structure can make the target
//! reachable only below zero.
//!
//! ## Usage
//! ```rust
//! use margin_core::pricing::lowest_possible_price;
//! use margin_core::margin::round_to_cents;
//! use margin_core::{Cm0Values, Cm1Values, Cm2Values, Tier};
//!
//! let cm0 = Cm0Values::new(6.77, 14.29, 8.00);
//! let cm1 = Cm1Values::new(cm0, 0.094, 5.05, 1.16, 0.0242, 0.1);
//! let cm2 = Cm2Values::new(cm1, 5.05, 0.36, 0.68, 3.82, 0.0195, 0.0133, 17.00);
//!
//! let price = lowest_possible_price(&cm2, 12.00, Tier::Cm2).unwrap();
//! assert_eq!(round_to_cents(price), 16.82);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{CoreError, CoreResult};
use crate::margin::round_to;
use crate::types::{Cm2Values, Tier};
use crate::validation::validate_target_margin;

// =============================================================================
// Configuration
// =============================================================================

/// Solver limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Maximum bisection steps.
    /// Default: 200
    pub max_iterations: u32,

    /// Maximum doublings of the outer bound while bracketing the target,
    /// per side of zero. Default: 64
    pub max_bracket_expansions: u32,

    /// Decimal places the trial margin and the target are rounded to before
    /// comparing. Default: 2
    pub precision: u32,
}

impl SolverConfig {
    pub const DEFAULT: SolverConfig = SolverConfig {
        max_iterations: 200,
        max_bracket_expansions: 64,
        precision: 2,
    };

    /// Sets the maximum bisection steps.
    pub fn max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Sets the maximum bracket expansions per side.
    pub fn max_bracket_expansions(mut self, max: u32) -> Self {
        self.max_bracket_expansions = max;
        self
    }

    /// Sets the decimal places margins are compared at.
    pub fn precision(mut self, places: u32) -> Self {
        self.precision = places;
        self
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// =============================================================================
// Price Curve
// =============================================================================

/// Rounded relative margin of one set of values as a function of price.
#[derive(Debug, Clone, Copy)]
struct PriceCurve {
    values: Cm2Values,
    tier: Tier,
    price_ratio: f64,
    precision: u32,
}

impl PriceCurve {
    fn new(values: &Cm2Values, tier: Tier, precision: u32) -> CoreResult<Self> {
        let net_retail = values.cm0().net_retail;
        let price_ratio = values.retail_price / net_retail;

        if !price_ratio.is_finite() || price_ratio == 0.0 {
            return Err(CoreError::DegenerateRevenueBase {
                retail_price: values.retail_price,
                net_retail,
            });
        }

        Ok(Self {
            values: *values,
            tier,
            price_ratio,
            precision,
        })
    }

    #[inline]
    fn margin_at(&self, price: f64) -> f64 {
        let trial = self.values.repriced(price, price / self.price_ratio);
        round_to(self.tier.margin(&trial).relative, self.precision)
    }
}

#[inline]
fn midpoint(upper: f64, lower: f64) -> f64 {
    // Halve first so opposite-signed bounds near f64::MAX cannot overflow.
    (upper / 2.0) + (lower / 2.0)
}

/// Side of zero a bracket is searched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Positive,
    Negative,
}

impl Side {
    #[inline]
    fn sign(self) -> f64 {
        match self {
            Side::Positive => 1.0,
            Side::Negative => -1.0,
        }
    }

    fn opposite(self) -> Self {
        match self {
            Side::Positive => Side::Negative,
            Side::Negative => Side::Positive,
        }
    }
}

/// Two prices on the same side of zero whose margins straddle the target.
#[derive(Debug, Clone, Copy)]
struct Bracket {
    /// Margin below the target.
    below: f64,
    /// Margin at or above the target.
    above: f64,
}

// =============================================================================
// Solver
// =============================================================================

/// Bisection price solver.
///
/// Stateless apart from its limits; one instance can serve any number of
/// threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceSolver {
    config: SolverConfig,
}

impl PriceSolver {
    pub const fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Rounded relative margin at `tier` when `values` are repriced to `price`.
    ///
    /// This is the curve the solver searches.
    pub fn margin_at(&self, values: &Cm2Values, tier: Tier, price: f64) -> CoreResult<f64> {
        Ok(PriceCurve::new(values, tier, self.config.precision)?.margin_at(price))
    }

    /// Lowest price at which the margin at `tier` equals `target_margin`
    /// percent (after rounding to the configured precision).
    ///
    /// ## Errors
    /// - [`crate::ValidationError::NotFinite`] for a NaN or infinite target
    /// - [`CoreError::DegenerateRevenueBase`] when the price ratio is unusable
    /// - [`CoreError::Unbracketed`] when no trial price on either side of zero
    ///   reaches the target
    /// - [`CoreError::NotConverged`] when bisection runs out of steps
    pub fn lowest_possible_price(
        &self,
        values: &Cm2Values,
        target_margin: f64,
        tier: Tier,
    ) -> CoreResult<f64> {
        validate_target_margin(target_margin)?;

        let curve = PriceCurve::new(values, tier, self.config.precision)?;
        let target = round_to(target_margin, self.config.precision);

        let first = if curve.margin_at(0.0) > target {
            Side::Negative
        } else {
            Side::Positive
        };

        for side in [first, first.opposite()] {
            match self.bracket(&curve, target, side, values.retail_price) {
                Some(bracket) => return self.bisect(&curve, target, bracket),
                None => debug!(%tier, target_margin = target, ?side, "Target margin not bracketed"),
            }
        }

        Err(CoreError::Unbracketed {
            target,
            expansions: self.config.max_bracket_expansions,
        })
    }

    /// Walks outward from zero on one side, doubling the outer bound, until
    /// two consecutive steps put the margin on opposite sides of `target`.
    fn bracket(&self, curve: &PriceCurve, target: f64, side: Side, retail_price: f64) -> Option<Bracket> {
        let start = match side {
            Side::Positive => (retail_price * 2.0).abs(),
            Side::Negative => 1.0,
        };

        let mut inner = 0.0;
        let mut inner_margin = curve.margin_at(side.sign() * start * f64::EPSILON);
        let mut outer = side.sign() * start;

        for _ in 0..=self.config.max_bracket_expansions {
            let outer_margin = curve.margin_at(outer);

            if inner_margin < target && outer_margin >= target {
                return Some(Bracket { below: inner, above: outer });
            }
            if inner_margin >= target && outer_margin < target {
                return Some(Bracket { below: outer, above: inner });
            }

            inner = outer;
            inner_margin = outer_margin;
            outer *= 2.0;
        }

        None
    }

    fn bisect(&self, curve: &PriceCurve, target: f64, bracket: Bracket) -> CoreResult<f64> {
        let Bracket { mut below, mut above } = bracket;
        let tier = curve.tier;

        let mut mid = midpoint(above, below);
        for iteration in 1..=self.config.max_iterations {
            let margin = curve.margin_at(mid);

            if margin.is_nan() {
                break;
            } else if margin > target {
                above = mid;
            } else if margin < target {
                below = mid;
            } else {
                trace!(%tier, target_margin = target, price = mid, iteration, "Price search converged");
                return Ok(mid);
            }

            let next = midpoint(above, below);
            if next == below || next == above {
                break;
            }
            mid = next;
        }

        debug!(%tier, target_margin = target, below, above, "Price search did not converge");
        Err(CoreError::NotConverged {
            target,
            iterations: self.config.max_iterations,
            last_price: mid,
        })
    }
}

/// Lowest possible price with the default solver limits.
///
/// See [`PriceSolver::lowest_possible_price`].
pub fn lowest_possible_price(values: &Cm2Values, target_margin: f64, tier: Tier) -> CoreResult<f64> {
    PriceSolver::new(SolverConfig::DEFAULT).lowest_possible_price(values, target_margin, tier)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::margin::{cm2, round_to_cents};
    use crate::types::{Cm0Values, Cm1Values};
    use std::time::{Duration, Instant};

    fn values_with_wholesale(wholesale_price: f64) -> Cm2Values {
        let cm0 = Cm0Values::new(6.77, 14.29, wholesale_price);
        let cm1 = Cm1Values::new(cm0, 0.094, 5.05, 1.16, 0.0242, 0.1);
        Cm2Values::new(cm1, 5.05, 0.36, 0.68, 3.82, 0.0195, 0.0133, 17.00)
    }

    fn sample() -> Cm2Values {
        values_with_wholesale(8.00)
    }

    #[test]
    fn test_lowest_possible_price_cm2() {
        let price = lowest_possible_price(&sample(), 12.00, Tier::Cm2).unwrap();
        assert_eq!(round_to_cents(price), 16.82);
    }

    #[test]
    fn test_solved_price_reproduces_target_margin() {
        let values = sample();
        let price = lowest_possible_price(&values, 12.00, Tier::Cm2).unwrap();

        let ratio = values.retail_price / values.cm0().net_retail;
        let repriced = values.repriced(price, price / ratio);
        assert!((cm2(&repriced).relative - 12.00).abs() < 0.005);
    }

    #[test]
    fn test_lowest_possible_price_lower_tiers() {
        let values = sample();
        let cm1_price = lowest_possible_price(&values, 12.00, Tier::Cm1).unwrap();
        let cm0_price = lowest_possible_price(&values, 12.00, Tier::Cm0).unwrap();

        assert_eq!(round_to_cents(cm1_price), 2.46);
        assert_eq!(round_to_cents(cm0_price), 1.66);
    }

    #[test]
    fn test_returns_negative_prices() {
        let values = values_with_wholesale(1.0);
        let price = lowest_possible_price(&values, 45.00, Tier::Cm0).unwrap();
        assert_eq!(round_to_cents(price), -12.48);
    }

    #[test]
    fn test_target_is_rounded_like_the_margin() {
        let values = sample();
        let exact = lowest_possible_price(&values, 12.00, Tier::Cm2).unwrap();
        let noisy = lowest_possible_price(&values, 12.001, Tier::Cm2).unwrap();
        assert_eq!(exact, noisy);
    }

    #[test]
    fn test_higher_target_needs_higher_price() {
        let values = sample();
        let prices: Vec<f64> = [-20.0, 0.0, 12.0, 30.0]
            .iter()
            .map(|&target| lowest_possible_price(&values, target, Tier::Cm2).unwrap())
            .collect();
        assert!(prices.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_price_curve_is_monotonic() {
        let solver = PriceSolver::default();
        let values = sample();
        let margins: Vec<f64> = [5.0, 10.0, 15.0, 17.0, 20.0, 30.0, 40.0]
            .iter()
            .map(|&price| solver.margin_at(&values, Tier::Cm2, price).unwrap())
            .collect();
        assert!(margins.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_targets_reachable_only_on_the_far_side_of_zero() {
        let solver = PriceSolver::default();

        // Wholesale above shipping revenue: CM0 stays under 100% for every
        // positive price and runs above it for negative ones.
        let values = sample();
        let price = solver.lowest_possible_price(&values, 150.0, Tier::Cm0).unwrap();
        assert_eq!(round_to_cents(price), -2.93);
        assert_eq!(solver.margin_at(&values, Tier::Cm0, price).unwrap(), 150.0);

        // Wholesale below shipping revenue: the mirror image. Margin at 0 is
        // +inf, so the negative side is searched first and comes up empty.
        let values = values_with_wholesale(1.0);
        let price = solver.lowest_possible_price(&values, 150.0, Tier::Cm0).unwrap();
        assert_eq!(round_to_cents(price), 13.73);
        assert_eq!(solver.margin_at(&values, Tier::Cm0, price).unwrap(), 150.0);
    }

    #[test]
    fn test_unreachable_target_is_unbracketed() {
        // Shipping revenue equal to wholesale pins CM0 at 100% on both sides.
        let values = values_with_wholesale(6.77);
        let err = lowest_possible_price(&values, 150.0, Tier::Cm0).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Unbracketed { target, expansions: 64 } if target == 150.0
        ));
    }

    #[test]
    fn test_bracket_expansion_limit() {
        // -1 and -2 both sit above 150%; the crossing needs a step to -4.
        let solver = PriceSolver::new(SolverConfig::default().max_bracket_expansions(1));
        let err = solver
            .lowest_possible_price(&sample(), 150.0, Tier::Cm0)
            .unwrap_err();
        assert!(matches!(err, CoreError::Unbracketed { expansions: 1, .. }));

        let solver = PriceSolver::new(SolverConfig::default().max_bracket_expansions(2));
        let price = solver.lowest_possible_price(&sample(), 150.0, Tier::Cm0).unwrap();
        assert_eq!(round_to_cents(price), -2.93);
    }

    #[test]
    fn test_precision_setting() {
        let coarse = PriceSolver::new(SolverConfig::default().precision(0));
        let margin = coarse.margin_at(&sample(), Tier::Cm2, 17.0).unwrap();
        assert_eq!(margin, 13.0);
    }

    #[test]
    fn test_iteration_limit_is_fatal() {
        let solver = PriceSolver::new(SolverConfig::default().max_iterations(3));
        let err = solver
            .lowest_possible_price(&sample(), 12.00, Tier::Cm2)
            .unwrap_err();
        assert!(matches!(err, CoreError::NotConverged { iterations: 3, .. }));
    }

    #[test]
    fn test_degenerate_revenue_base() {
        let mut values = sample();
        values.cm1.cm0.net_retail = 0.0;
        assert!(matches!(
            lowest_possible_price(&values, 12.0, Tier::Cm2),
            Err(CoreError::DegenerateRevenueBase { .. })
        ));

        let mut values = sample();
        values.retail_price = 0.0;
        assert!(matches!(
            lowest_possible_price(&values, 12.0, Tier::Cm0),
            Err(CoreError::DegenerateRevenueBase { .. })
        ));
    }

    #[test]
    fn test_non_finite_target_rejected() {
        let err = lowest_possible_price(&sample(), f64::NAN, Tier::Cm2).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_input_values_unchanged() {
        let values = sample();
        let before = values;
        lowest_possible_price(&values, 12.00, Tier::Cm2).unwrap();
        assert_eq!(values, before);
    }

    #[test]
    fn test_two_thousand_solves_under_a_second() {
        let start = Instant::now();
        for _ in 0..2000 {
            let price = lowest_possible_price(&sample(), 12.00, Tier::Cm2).unwrap();
            assert_eq!(round_to_cents(price), 16.82);
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_solves_agree() {
        let expected = lowest_possible_price(&sample(), 12.00, Tier::Cm2).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                tokio::task::spawn_blocking(|| {
                    (0..250)
                        .map(|_| lowest_possible_price(&sample(), 12.00, Tier::Cm2).unwrap())
                        .collect::<Vec<f64>>()
                })
            })
            .collect();

        for handle in handles {
            let prices = handle.await.unwrap();
            assert!(prices.iter().all(|price| price.to_bits() == expected.to_bits()));
        }
    }
}
