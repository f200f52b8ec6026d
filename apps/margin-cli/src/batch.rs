//! # Batch Evaluation
//!
//! Per-SKU margin and price evaluation for bulk pricing runs.
//!
//! ## Item Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BatchItem { sku, values, target_margin?, tier? }                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_sku ──► margins_from_map (CM0 + every tier present)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  target? (item, else MARGIN_DEFAULT_TARGET)                            │
//! │       ├── none → report margins only                                   │
//! │       └── some → lowest possible price at tier (item, else default)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ItemReport (error recorded, batch continues)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Input Format
//! ```json
//! {
//!   "items": [
//!     {
//!       "sku": "COKE-330",
//!       "values": { "shipping_revenue": 6.77, "net_retail": 14.29, "wholesale_price": 8.0 },
//!       "target_margin": 45.0,
//!       "tier": "cm0"
//!     }
//!   ]
//! }
//! ```

use chrono::{DateTime, Utc};
use margin_core::flat::{cm2_values_from_map, margins_from_map, FieldMap, TierMargins};
use margin_core::margin::round_to_cents;
use margin_core::validation::validate_sku;
use margin_core::{CoreResult, PriceSolver, Tier};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::CliConfig;

// =============================================================================
// Input
// =============================================================================

/// A batch of products to evaluate.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchInput {
    pub items: Vec<BatchItem>,
}

/// One product: its SKU, flat cost inputs and optional price search.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchItem {
    pub sku: String,

    pub values: FieldMap,

    #[serde(default)]
    pub target_margin: Option<f64>,

    /// Raw tier tag, parsed per item so one bad tag fails only its item.
    #[serde(default)]
    pub tier: Option<String>,
}

// =============================================================================
// Output
// =============================================================================

/// Result for one SKU.
#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
    pub sku: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub margins: Option<TierMargins>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_margin: Option<f64>,

    /// Rounded to cents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_possible_price: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemReport {
    fn failed(sku: &str, error: String) -> Self {
        Self {
            sku: sku.to_string(),
            margins: None,
            tier: None,
            target_margin: None,
            lowest_possible_price: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Result for a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub succeeded: usize,
    pub failed: usize,
    pub items: Vec<ItemReport>,
}

// =============================================================================
// Evaluation
// =============================================================================

/// Evaluates every item. Item failures are recorded, never propagated.
pub fn run_batch(input: &BatchInput, config: &CliConfig) -> BatchReport {
    let run_id = Uuid::new_v4();
    let solver = PriceSolver::new(config.solver);

    info!(%run_id, items = input.items.len(), "Starting batch");

    let items: Vec<ItemReport> = input
        .items
        .iter()
        .map(|item| match evaluate(item, &solver, config) {
            Ok(report) => report,
            Err(e) => {
                warn!(%run_id, sku = %item.sku, error = %e, "Item failed");
                ItemReport::failed(&item.sku, e.to_string())
            }
        })
        .collect();

    let succeeded = items.iter().filter(|item| item.is_ok()).count();
    let failed = items.len() - succeeded;

    info!(%run_id, succeeded, failed, "Batch complete");

    BatchReport {
        run_id,
        generated_at: Utc::now(),
        succeeded,
        failed,
        items,
    }
}

fn evaluate(item: &BatchItem, solver: &PriceSolver, config: &CliConfig) -> CoreResult<ItemReport> {
    let sku = validate_sku(&item.sku)?;

    let tier = match &item.tier {
        Some(tag) => tag.parse::<Tier>()?,
        None => config.default_tier,
    };

    let margins = margins_from_map(&item.values)?;

    let target_margin = item.target_margin.or(config.default_target);
    let lowest_possible_price = match target_margin {
        Some(target) => {
            let values = cm2_values_from_map(&item.values)?;
            let price = solver.lowest_possible_price(&values, target, tier)?;
            debug!(%sku, %tier, target_margin = target, price, "Price solved");
            Some(round_to_cents(price))
        }
        None => None,
    };

    Ok(ItemReport {
        sku: sku.to_string(),
        margins: Some(margins),
        tier: target_margin.map(|_| tier),
        target_margin,
        lowest_possible_price,
        error: None,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
