//! Prometheus metrics for the listing ledger.
//!
//! All metrics follow the naming convention: `fx_<component>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // LISTING REGISTRY
    // =========================================================================

    /// Listings created
    pub static ref LISTINGS_CREATED: Counter = Counter::new(
        "fx_registry_listings_created_total",
        "Total number of listings created"
    ).expect("metric creation failed");

    /// Listings executed (full purchases)
    pub static ref LISTINGS_EXECUTED: Counter = Counter::new(
        "fx_registry_listings_executed_total",
        "Total number of listings purchased outright"
    ).expect("metric creation failed");

    /// Listing edits
    pub static ref LISTINGS_EDITED: Counter = Counter::new(
        "fx_registry_listings_edited_total",
        "Total number of listing price/activity edits"
    ).expect("metric creation failed");

    // =========================================================================
    // FRACTION LEDGER
    // =========================================================================

    /// Fraction records minted
    pub static ref FRACTIONS_MINTED: Counter = Counter::new(
        "fx_fractions_minted_total",
        "Total number of fraction records minted"
    ).expect("metric creation failed");

    /// Fractions redeemed for currency
    pub static ref FRACTIONS_REDEEMED: Counter = Counter::new(
        "fx_fractions_redeemed_total",
        "Total number of fractions exchanged for currency"
    ).expect("metric creation failed");

    /// Fraction ownership transfers
    pub static ref FRACTION_TRANSFERS: Counter = Counter::new(
        "fx_fractions_transfers_total",
        "Total number of fraction transfers"
    ).expect("metric creation failed");

    // =========================================================================
    // FEE VAULT
    // =========================================================================

    /// Platform fee withdrawals
    pub static ref FEE_WITHDRAWALS: Counter = Counter::new(
        "fx_vault_withdrawals_total",
        "Total number of platform fee withdrawals"
    ).expect("metric creation failed");

    // =========================================================================
    // ERROR METRICS
    // =========================================================================

    /// Reverted operations by operation and error kind
    pub static ref OPERATIONS_REVERTED: CounterVec = CounterVec::new(
        Opts::new("fx_operations_reverted_total", "Reverted operations by type"),
        &["operation", "error_kind"]
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(LISTINGS_CREATED.clone()),
        Box::new(LISTINGS_EXECUTED.clone()),
        Box::new(LISTINGS_EDITED.clone()),
        Box::new(FRACTIONS_MINTED.clone()),
        Box::new(FRACTIONS_REDEEMED.clone()),
        Box::new(FRACTION_TRANSFERS.clone()),
        Box::new(FEE_WITHDRAWALS.clone()),
        Box::new(OPERATIONS_REVERTED.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
