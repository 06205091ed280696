//! # Adapters Layer
//!
//! In-process implementations of the outbound ports.

pub mod asset_registry;
pub mod clock;
pub mod event_sink;
pub mod value_ledger;

pub use asset_registry::{InMemoryAssetRegistry, ReceiveHook};
pub use clock::{ManualTimeSource, SystemTimeSource};
pub use event_sink::{BroadcastEventSink, InMemoryEventLog};
pub use value_ledger::{InMemoryValueLedger, PaymentHook};
