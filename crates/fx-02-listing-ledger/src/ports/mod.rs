//! # Ports Layer
//!
//! - **Inbound** (`MarketplaceApi`): what callers can ask the ledger to do
//! - **Outbound**: asset registry, currency, clock and notification sink

pub mod inbound;
pub mod outbound;

pub use inbound::MarketplaceApi;
pub use outbound::{
    AssetTransferGateway, Checkpoint, EventSink, Journaled, TimeSource, ValueTransfer,
};
