//! # margin-core: Contribution Margin Engine
//!
//! Layered contribution margins (CM0, CM1, CM2) for a retail product, and a
//! solver for the lowest retail price that still meets a target margin.
//! Pure functions, zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Margin Engine Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Callers (margin-cli, pricing jobs, boundary code)      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Cm2Values / flat field maps           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ margin-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  margin   │  │  pricing  │  │   flat    │  │   │
//! │  │   │ CmNValues │  │ cm0 cm1   │  │  solver   │  │ field map │  │   │
//! │  │   │   Tier    │  │ cm2       │  │ bisection │  │  shape    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Layer value objects, results, tiers
//! - [`margin`] - CM0/CM1/CM2 formulas
//! - [`pricing`] - Lowest possible price solver
//! - [`flat`] - Flat field map call shape
//! - [`error`] - Domain error types
//! - [`validation`] - Boundary input checks
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, bit-identical output
//! 2. **No I/O**: files, network and logging setup live in the callers
//! 3. **No NaN**: a zero revenue base gives a signed infinity
//! 4. **Explicit Errors**: solver failures are typed, never a best guess
//!
//! ## Example Usage
//!
//! ```rust
//! use margin_core::{cm2, lowest_possible_price, Cm0Values, Cm1Values, Cm2Values, Tier};
//! use margin_core::margin::round_to_cents;
//!
//! let cm0 = Cm0Values::new(6.77, 14.29, 8.00);
//! let cm1 = Cm1Values::new(cm0, 0.094, 5.05, 1.16, 0.0242, 0.1);
//! let values = Cm2Values::new(cm1, 5.05, 0.36, 0.68, 3.82, 0.0195, 0.0133, 17.00);
//!
//! let margin = cm2(&values);
//! assert_eq!(round_to_cents(margin.absolute), 1.84);
//! assert_eq!(round_to_cents(margin.relative), 12.89);
//!
//! let price = lowest_possible_price(&values, 12.00, Tier::Cm2).unwrap();
//! assert_eq!(round_to_cents(price), 16.82);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod flat;
pub mod margin;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use margin::{cm0, cm1, cm2};
pub use pricing::{lowest_possible_price, PriceSolver, SolverConfig};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum SKU length accepted at batch boundaries.
pub const MAX_SKU_LENGTH: usize = 50;
