//! Session state and the events a scan session produces.

use super::DispatchDecision;

/// Snapshot of a scan session, read by whatever renders it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    pub is_scanning: bool,
}

/// Something the view layer should do.
///
/// Delivered at most once. Lost if nobody is subscribed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// Open the decision's locator.
    Navigate { decision: DispatchDecision },

    /// Show a message to the user, then scan again.
    Notify { message: String },
}

impl ViewEvent {
    /// A notification carrying `message`.
    pub fn notify(message: impl Into<String>) -> Self {
        Self::Notify {
            message: message.into(),
        }
    }
}

/// The single terminal result a scanner delivers for one scan request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// A barcode was read. `None` when it carried no raw value.
    Success(Option<String>),

    /// The user backed out.
    Canceled,

    /// The scanner gave up. Carries the cause's message.
    Failed(String),
}
