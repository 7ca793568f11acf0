//! Scan session controller.
//!
//! Owns the idle/scanning state, asks the scanner for one scan at a time,
//! and turns every terminal scan outcome into exactly one [`ViewEvent`].
//!
//! ```text
//! Idle ──request_scan──▶ Scanning ──success | canceled | failed──▶ Idle
//! ```
//!
//! All methods run on one thread. The `is_scanning` guard is the only thing
//! keeping two scans from overlapping.

use crate::model::{DispatchDecision, RoutingOutcome, ScanOutcome, SessionState, ViewEvent};
use crate::router::Router;
use crate::scanner::Scanner;

type Subscriber = Box<dyn FnMut(ViewEvent)>;

/// Drives one continuous scanning session.
pub struct ScanSession<S> {
    router: Router,
    scanner: S,
    state: SessionState,
    subscriber: Option<Subscriber>,
}

impl<S: Scanner> ScanSession<S> {
    pub fn new(router: Router, scanner: S) -> Self {
        Self {
            router,
            scanner,
            state: SessionState::default(),
            subscriber: None,
        }
    }

    /// Current snapshot for rendering.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Register the event observer, replacing any previous one.
    pub fn subscribe(&mut self, subscriber: impl FnMut(ViewEvent) + 'static) {
        self.subscriber = Some(Box::new(subscriber));
    }

    pub fn unsubscribe(&mut self) {
        self.subscriber = None;
    }

    /// Start a scan unless one is already in flight.
    ///
    /// Returns whether the scanner was actually asked to begin.
    pub fn request_scan(&mut self) -> bool {
        if self.state.is_scanning {
            tracing::debug!("scan already in flight; ignoring request");
            return false;
        }

        self.state.is_scanning = true;
        tracing::info!("scan started");
        self.scanner.begin();
        true
    }

    /// Dispatch a scanner outcome to the matching callback.
    pub fn deliver(&mut self, outcome: ScanOutcome) {
        match outcome {
            ScanOutcome::Success(payload) => self.on_scan_success(payload.as_deref()),
            ScanOutcome::Canceled => self.on_scan_canceled(),
            ScanOutcome::Failed(cause) => self.on_scan_failed(&cause),
        }
    }

    pub fn on_scan_success(&mut self, payload: Option<&str>) {
        self.finish_scan();

        let Some(payload) = payload else {
            self.emit(ViewEvent::notify("no data"));
            return;
        };

        match self.router.route(payload) {
            RoutingOutcome::Resolved { decision } => self.emit(ViewEvent::Navigate { decision }),
            RoutingOutcome::Unresolvable { payload } => {
                self.emit(ViewEvent::notify(format!("cannot open: {payload}")));
            }
        }
    }

    pub fn on_scan_canceled(&mut self) {
        self.finish_scan();
        self.emit(ViewEvent::notify("canceled"));
    }

    pub fn on_scan_failed(&mut self, cause: &dyn std::fmt::Display) {
        self.finish_scan();

        let message = cause.to_string();
        let message = if message.is_empty() {
            "Unknown error"
        } else {
            message.as_str()
        };
        self.emit(ViewEvent::notify(format!("scan failed: {message}")));
    }

    /// The caller could not open a decision it was told to navigate to.
    pub fn on_navigation_failed(&mut self, decision: &DispatchDecision, reason: &dyn std::fmt::Display) {
        self.finish_scan();
        tracing::warn!(locator = %decision.locator, %reason, "navigation failed");
        self.emit(ViewEvent::notify(format!("cannot open: {}", decision.locator)));
    }

    fn finish_scan(&mut self) {
        if self.state.is_scanning {
            tracing::info!("scan finished");
        }
        self.state.is_scanning = false;
    }

    fn emit(&mut self, event: ViewEvent) {
        match self.subscriber.as_mut() {
            Some(subscriber) => subscriber(event),
            None => tracing::debug!(?event, "no subscriber; event dropped"),
        }
    }
}
