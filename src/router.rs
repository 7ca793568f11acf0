//! Payload routing: turn a scanned string into a dispatch decision.
//!
//! Resolution order:
//!
//! 1. The payload must parse as an absolute URI, else it is unresolvable.
//! 2. A family is picked by exact scheme, then by domain substring.
//! 3. The family's candidates are tried in order; the first installed one wins.
//! 4. Anything else opens generically.

use url::Url;

use crate::model::{DispatchDecision, Family, RoutingOutcome, RoutingTable};
use crate::registry::InstalledChecker;

/// Maps scanned payloads to dispatch decisions.
pub struct Router {
    table: RoutingTable,
    checker: InstalledChecker,
}

impl Router {
    pub fn new(table: RoutingTable, checker: InstalledChecker) -> Self {
        Self { table, checker }
    }

    /// Route a payload. Never fails: bad input is `Unresolvable`.
    pub fn route(&self, payload: &str) -> RoutingOutcome {
        let uri = match Url::parse(payload) {
            Ok(uri) => uri,
            Err(e) => {
                tracing::debug!(payload, error = %e, "payload is not a URI");
                return RoutingOutcome::Unresolvable {
                    payload: payload.to_string(),
                };
            }
        };

        let family = self
            .table
            .by_scheme(uri.scheme())
            .or_else(|| self.table.by_domain(payload));

        let decision = match family {
            Some(family) => self.decide(family, payload),
            None => DispatchDecision::generic(payload),
        };

        tracing::debug!(
            payload,
            family = family.map(|f| f.name.as_str()),
            target = decision.target.as_deref(),
            "routed payload"
        );

        RoutingOutcome::Resolved { decision }
    }

    fn decide(&self, family: &Family, locator: &str) -> DispatchDecision {
        family
            .candidates()
            .find(|id| self.checker.is_installed(id))
            .map_or_else(
                || DispatchDecision::generic(locator),
                |id| DispatchDecision::targeted(locator, id),
            )
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::registry::{LookupError, PackageRegistry, StaticRegistry};

    const LINE: &str = "jp.naver.line.android";
    const TWITTER: &str = "com.twitter.android";
    const X: &str = "com.x.android";
    const INSTAGRAM: &str = "com.instagram.android";

    /// Records every identifier it is asked about.
    struct RecordingRegistry {
        installed: StaticRegistry,
        queries: Rc<RefCell<Vec<String>>>,
    }

    impl PackageRegistry for RecordingRegistry {
        fn lookup(&self, identifier: &str) -> Result<(), LookupError> {
            self.queries.borrow_mut().push(identifier.to_string());
            self.installed.lookup(identifier)
        }
    }

    fn router_with(installed: &[&str]) -> Router {
        let registry = StaticRegistry::new(installed.iter().copied());
        Router::new(RoutingTable::default(), InstalledChecker::new(registry))
    }

    fn recording_router(installed: &[&str]) -> (Router, Rc<RefCell<Vec<String>>>) {
        let queries = Rc::new(RefCell::new(Vec::new()));
        let registry = RecordingRegistry {
            installed: StaticRegistry::new(installed.iter().copied()),
            queries: Rc::clone(&queries),
        };
        let router = Router::new(RoutingTable::default(), InstalledChecker::new(registry));
        (router, queries)
    }

    fn resolved(outcome: RoutingOutcome) -> DispatchDecision {
        match outcome {
            RoutingOutcome::Resolved { decision } => decision,
            RoutingOutcome::Unresolvable { payload } => panic!("unexpectedly unresolvable: {payload}"),
        }
    }

    #[test]
    fn line_scheme_with_line_installed_targets_line() {
        let payload = "line://ti/p/@example";
        let decision = resolved(router_with(&[LINE]).route(payload));

        assert_eq!(decision, DispatchDecision::targeted(payload, LINE));
    }

    #[test]
    fn line_url_without_line_installed_opens_generically() {
        let payload = "https://line.me/R/ti/p/@example";
        let decision = resolved(router_with(&[]).route(payload));

        assert_eq!(decision, DispatchDecision::generic(payload));
    }

    #[test]
    fn line_url_with_line_installed_targets_line() {
        let payload = "https://line.me/R/ti/p/@example";
        let decision = resolved(router_with(&[LINE]).route(payload));

        assert_eq!(decision.target.as_deref(), Some(LINE));
    }

    #[test]
    fn twitter_url_with_only_x_installed_targets_x() {
        let payload = "https://twitter.com/someuser";
        let decision = resolved(router_with(&[X]).route(payload));

        assert_eq!(decision, DispatchDecision::targeted(payload, X));
    }

    #[test]
    fn twitter_primary_wins_over_alternate() {
        let decision = resolved(router_with(&[TWITTER, X]).route("twitter://user?screen_name=someuser"));
        assert_eq!(decision.target.as_deref(), Some(TWITTER));
    }

    #[test]
    fn x_domain_belongs_to_twitter_family() {
        let decision = resolved(router_with(&[X]).route("https://x.com/someuser"));
        assert_eq!(decision.target.as_deref(), Some(X));
    }

    #[test]
    fn instagram_scheme_without_app_opens_generically() {
        let payload = "instagram://user?username=someuser";
        let decision = resolved(router_with(&[]).route(payload));

        assert_eq!(decision, DispatchDecision::generic(payload));
    }

    #[test]
    fn instagram_url_with_app_targets_instagram() {
        let payload = "https://www.instagram.com/someprofile/";
        let decision = resolved(router_with(&[INSTAGRAM]).route(payload));

        assert_eq!(decision, DispatchDecision::targeted(payload, INSTAGRAM));
    }

    #[test]
    fn generic_url_opens_generically_without_querying() {
        let (router, queries) = recording_router(&[LINE, TWITTER, X, INSTAGRAM]);
        let payload = "http://www.google.com";

        let decision = resolved(router.route(payload));

        assert_eq!(decision, DispatchDecision::generic(payload));
        assert!(queries.borrow().is_empty());
    }

    #[test]
    fn locator_is_not_normalized() {
        let payload = "http://www.google.com";
        let decision = resolved(router_with(&[]).route(payload));

        // The URL parser would append a trailing slash.
        assert_eq!(decision.locator, payload);
    }

    #[test]
    fn scheme_takes_priority_over_domain() {
        let (router, queries) = recording_router(&[LINE]);

        // Instagram scheme, but the payload also mentions line.me.
        let decision = resolved(router.route("instagram://share?via=line.me"));

        assert_eq!(decision.target, None);
        assert_eq!(*queries.borrow(), [INSTAGRAM]);
    }

    #[test]
    fn alternates_are_tried_in_order() {
        let (router, queries) = recording_router(&[]);

        resolved(router.route("https://twitter.com/someuser"));

        assert_eq!(*queries.borrow(), [TWITTER, X]);
    }

    #[test]
    fn primary_hit_skips_alternates() {
        let (router, queries) = recording_router(&[TWITTER]);

        resolved(router.route("https://twitter.com/someuser"));

        assert_eq!(*queries.borrow(), [TWITTER]);
    }

    #[test]
    fn string_without_scheme_is_unresolvable() {
        let payload = "invalid_uri_string_without_scheme_or_domain";
        let outcome = router_with(&[]).route(payload);

        assert_eq!(
            outcome,
            RoutingOutcome::Unresolvable {
                payload: payload.to_string()
            }
        );
    }

    #[test]
    fn bare_domain_without_scheme_is_unresolvable() {
        let outcome = router_with(&[TWITTER]).route("twitter.com/someuser");
        assert!(matches!(outcome, RoutingOutcome::Unresolvable { .. }));
    }

    #[test]
    fn custom_table_is_honored() {
        let table = RoutingTable::new(vec![Family {
            name: "spotify".into(),
            primary: "com.spotify.music".into(),
            alternates: vec![],
            schemes: vec!["spotify".into()],
            domains: vec!["open.spotify.com".into()],
        }]);
        let router = Router::new(
            table,
            InstalledChecker::new(StaticRegistry::new(["com.spotify.music"])),
        );

        let decision = resolved(router.route("https://open.spotify.com/track/abc"));
        assert_eq!(decision.target.as_deref(), Some("com.spotify.music"));

        // The default table is gone.
        let decision = resolved(router.route("https://twitter.com/someuser"));
        assert_eq!(decision.target, None);
    }
}
