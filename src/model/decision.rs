//! Decisions: where a scanned payload should go.

use serde::Serialize;

/// The resolved instruction handed to the launcher.
///
/// `target` is only ever set to an app the registry confirmed installed
/// at the moment the decision was made. `None` means a generic view action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchDecision {
    /// The scanned payload, verbatim.
    pub locator: String,

    /// Package identifier of the app to open the locator with.
    pub target: Option<String>,
}

impl DispatchDecision {
    /// A decision with no target app: let the platform pick a handler.
    pub fn generic(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            target: None,
        }
    }

    /// A decision pinned to a specific app.
    pub fn targeted(locator: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            target: Some(target.into()),
        }
    }
}

/// Result of routing a payload.
///
/// Unparseable input is a normal variant, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RoutingOutcome {
    /// The payload is a locator and a decision was made.
    Resolved { decision: DispatchDecision },

    /// The payload is not a URI at all. Carries the original string.
    Unresolvable { payload: String },
}
