//! Output formatting for CLI display.

use crate::model::Family;

/// One line per family: name, candidates in try order, then what it matches.
pub(super) fn format_family(family: &Family) -> String {
    let candidates = family.candidates().collect::<Vec<_>>().join(" → ");
    format!(
        "{:<10} {candidates}  [schemes: {}] [domains: {}]",
        family.name,
        format_list(&family.schemes),
        format_list(&family.domains),
    )
}

fn format_list(items: &[String]) -> String {
    if items.is_empty() {
        return "none".to_string();
    }
    items.join(", ")
}
