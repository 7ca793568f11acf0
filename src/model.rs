//! Core data model for qrdispatch.
//!
//! Routing results, session state, view events, and the routing table.
//! Nothing in here performs I/O.

mod decision;
mod event;
mod family;

pub use decision::{DispatchDecision, RoutingOutcome};
pub use event::{ScanOutcome, SessionState, ViewEvent};
pub use family::{Family, RoutingTable};
