//! # Error Types
//!
//! Domain-specific error types for margin-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  margin-core errors (this file)                                        │
//! │  ├── CoreError        - Solver and tier selection failures             │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  margin-cli errors (separate crate)                                    │
//! │  └── CliError         - File, JSON and config failures                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CliError → exit status            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! A zero revenue base does not fail a margin calculation. The relative
//! margin becomes a signed infinity (or `0.0` for a zero absolute margin),
//! see [`crate::margin::relative_margin`]. Negative prices and negative
//! margins are regular results too.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core calculation errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The tier tag is not one of `cm0`, `cm1`, `cm2`.
    ///
    /// Raised at the boundary, before any numeric work starts.
    #[error("Unknown margin tier '{0}'. Valid options: cm0, cm1, cm2")]
    UnknownTier(String),

    /// The price-to-net-retail ratio used by the solver is zero or not finite.
    ///
    /// ## When This Occurs
    /// - `net_retail` is zero (ratio is infinite)
    /// - `retail_price` is zero (ratio is zero, every trial price maps to
    ///   an infinite net retail)
    #[error("Degenerate revenue base: retail_price {retail_price}, net_retail {net_retail}")]
    DegenerateRevenueBase { retail_price: f64, net_retail: f64 },

    /// The target margin could not be enclosed between two trial prices on
    /// either side of zero.
    ///
    /// ## Solver Workflow
    /// ```text
    /// first side (by margin at 0)
    ///      │
    ///      ▼
    /// double the outer bound until the margin crosses the target
    ///      │
    ///      ├── crossed within max expansions → bisect
    ///      │
    ///      └── limit hit → same walk on the other side
    ///                 ├── crossed → bisect
    ///                 └── limit hit → Unbracketed
    /// ```
    ///
    /// `expansions` is the per-side limit that was exhausted.
    #[error("Target margin {target}% cannot be bracketed after {expansions} expansions")]
    Unbracketed { target: f64, expansions: u32 },

    /// Bisection stopped without hitting the target margin.
    #[error("Price search for {target}% did not converge after {iterations} iterations (last price {last_price})")]
    NotConverged {
        target: f64,
        iterations: u32,
        last_price: f64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Only raised at untyped boundaries (flat field maps, batch files). Typed
/// value objects accept any `f64`.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field is NaN or infinite.
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: String, value: f64 },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
