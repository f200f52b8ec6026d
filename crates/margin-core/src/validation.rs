//! # Validation Module
//!
//! Input checks for untyped boundaries.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Batch file / field map (untyped)                             │
//! │  ├── SKU format                                                        │
//! │  ├── Required fields present                                           │
//! │  └── THIS MODULE: every number finite                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Value objects (typed)                                        │
//! │  └── No checks: negative prices and odd rates are legal inputs         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Margin engine / solver                                       │
//! │  └── Zero revenue base → signed infinity, never NaN                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use margin_core::validation::{validate_finite, validate_sku};
//!
//! assert!(validate_sku("COKE-330").is_ok());
//! assert!(validate_finite("net_retail", 14.29).is_ok());
//! assert!(validate_finite("net_retail", f64::NAN).is_err());
//! ```

use crate::error::ValidationError;
use crate::MAX_SKU_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates that a named input is a finite number.
///
/// Sign is not checked. Negative values are legal everywhere.
pub fn validate_finite(field: &str, value: f64) -> ValidationResult<f64> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
            value,
        });
    }

    Ok(value)
}

/// Validates a target margin percentage for the price solver.
///
/// Any finite percentage is accepted, including negative targets and targets
/// above 100. Whether a price exists for it is the solver's call.
pub fn validate_target_margin(target: f64) -> ValidationResult<f64> {
    validate_finite("target_margin", target)
}

// =============================================================================
// String Validators
// =============================================================================

/// Checks a batch item's SKU and returns it trimmed.
///
/// ## Rules
/// - Not blank after trimming
/// - At most [`MAX_SKU_LENGTH`] characters (not bytes)
/// - Letters and digits in any script, `-` and `_`
///
/// ## Example
/// ```rust
/// use margin_core::validation::validate_sku;
///
/// assert_eq!(validate_sku(" COKE-330 ").unwrap(), "COKE-330");
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<&str> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.chars().count() > MAX_SKU_LENGTH {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LENGTH,
        });
    }

    if let Some(c) = sku
        .chars()
        .find(|&c| !(c.is_alphanumeric() || c == '-' || c == '_'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: format!("'{c}' is not a letter, digit, hyphen or underscore"),
        });
    }

    Ok(sku)
}

// =============================================================================
// Unit Tests
// =============================================================================
