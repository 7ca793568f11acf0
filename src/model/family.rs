//! The routing table: which apps handle which links.
//!
//! A family is one logical destination app. It may have shipped under more
//! than one package identity (Twitter → X), so it carries an ordered list
//! of candidates rather than a single package.

use serde::Deserialize;

/// One logical destination app.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Family {
    /// Human-readable name (e.g. "twitter").
    pub name: String,

    /// Package identifier tried first.
    pub primary: String,

    /// Package identifiers tried after the primary, in order.
    #[serde(default)]
    pub alternates: Vec<String>,

    /// URI schemes that belong to this family, matched whole, ignoring case.
    #[serde(default)]
    pub schemes: Vec<String>,

    /// Substrings that mark a payload as belonging to this family.
    #[serde(default)]
    pub domains: Vec<String>,
}

impl Family {
    fn new(
        name: &str,
        primary: &str,
        alternates: &[&str],
        schemes: &[&str],
        domains: &[&str],
    ) -> Self {
        let owned = |items: &[&str]| -> Vec<String> { items.iter().map(ToString::to_string).collect() };
        Self {
            name: name.to_string(),
            primary: primary.to_string(),
            alternates: owned(alternates),
            schemes: owned(schemes),
            domains: owned(domains),
        }
    }

    /// Package identifiers in the order they should be tried.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.alternates.iter().map(String::as_str))
    }
}

/// Ordered list of families. Earlier families win ties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingTable {
    families: Vec<Family>,
}

impl RoutingTable {
    pub fn new(families: Vec<Family>) -> Self {
        Self { families }
    }

    pub fn families(&self) -> &[Family] {
        &self.families
    }

    /// The family claiming `scheme`, if any. Schemes are case-insensitive.
    pub fn by_scheme(&self, scheme: &str) -> Option<&Family> {
        self.families
            .iter()
            .find(|f| f.schemes.iter().any(|s| s.eq_ignore_ascii_case(scheme)))
    }

    /// The first family with a domain occurring anywhere in `payload`.
    ///
    /// Deliberately a plain substring test: `https://example.com/?next=x.com`
    /// matches the `x.com` family.
    pub fn by_domain(&self, payload: &str) -> Option<&Family> {
        self.families
            .iter()
            .find(|f| f.domains.iter().any(|d| payload.contains(d.as_str())))
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::new(vec![
            Family::new("line", "jp.naver.line.android", &[], &["line"], &["line.me"]),
            Family::new(
                "twitter",
                "com.twitter.android",
                &["com.x.android"],
                &["twitter"],
                &["twitter.com", "x.com"],
            ),
            Family::new(
                "instagram",
                "com.instagram.android",
                &[],
                &["instagram"],
                &["instagram.com"],
            ),
        ])
    }
}
