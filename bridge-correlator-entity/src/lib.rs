//! Data model for the bridge correlation engine.
//!
//! Two terminal entities ([`CrosschainMessage`], [`AppPayload`]) and two
//! staging entities ([`BusPassengerDraft`], [`BusManifest`]) that only exist
//! while a batched Stargate envelope is being reconciled. Staging records are
//! deliberately distinct types so they cannot leak into the terminal set.

mod address;
mod message;
mod payload;
mod staging;

pub use address::{checksummed, checksummed_opt, normalize_address};
pub use message::{CrosschainMessage, MessageLeg, MessageLegs, Protocol, Route};
pub use payload::{App, AppPayload, PayloadSide, PayloadSides, PayloadType};
pub use staging::{BusManifest, BusPassenger, BusPassengerDraft};
