//! Filtered alias ambiguity guard
//!
//! The engine guarantees correct enforcement of exactly one filtering alias
//! per concrete index; stacking semantics are undefined upstream. When a
//! requested index is reachable through more than one filter-carrying alias
//! and the action is search-shaped, the configured mode decides the
//! outcome.

use tracing::{debug, error, warn};

use crate::authz::matcher;
use crate::authz::resource::ResourceResolver;
use crate::config::models::FilteredAliasMode;

/// Search-shaped actions the guard applies to.
const SEARCH_ACTION_PATTERN: &str = "indices:data/read/*search*";

/// Outcome of the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasCheck {
    Allow,
    Deny,
}

/// Check the requested concrete indices for ambiguous filtered aliases.
pub fn check(
    resolved_indices: &[String],
    action: &str,
    mode: FilteredAliasMode,
    resolver: &dyn ResourceResolver,
) -> AliasCheck {
    if !matcher::matches(SEARCH_ACTION_PATTERN, action) {
        return AliasCheck::Allow;
    }

    for index in resolved_indices {
        let filtered = resolver.filtered_aliases(index);
        if filtered.len() <= 1 {
            continue;
        }

        match mode {
            FilteredAliasMode::Warn => {
                warn!(
                    count = filtered.len(),
                    index = index.as_str(),
                    aliases = ?filtered,
                    "more than one filtered alias for the same index, this is not recommended"
                );
            }
            FilteredAliasMode::Disallow => {
                error!(
                    count = filtered.len(),
                    index = index.as_str(),
                    aliases = ?filtered,
                    "more than one filtered alias for the same index, this is not supported"
                );
                return AliasCheck::Deny;
            }
            FilteredAliasMode::Silent => {
                debug!(
                    count = filtered.len(),
                    index = index.as_str(),
                    "more than one filtered alias for the same index"
                );
            }
        }
    }

    AliasCheck::Allow
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AliasedCatalog;

    impl ResourceResolver for AliasedCatalog {
        fn concrete_index_names(&self, _pattern: &str) -> Vec<String> {
            Vec::new()
        }

        fn has_index_or_alias(&self, _name: &str) -> bool {
            true
        }

        fn filtered_aliases(&self, index: &str) -> Vec<String> {
            match index {
                "ambiguous" => vec!["alias-a".to_string(), "alias-b".to_string()],
                "single" => vec!["alias-a".to_string()],
                _ => Vec::new(),
            }
        }
    }

    fn indices(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn disallow_mode_denies_ambiguous_index() {
        let result = check(
            &indices(&["ambiguous"]),
            "indices:data/read/search",
            FilteredAliasMode::Disallow,
            &AliasedCatalog,
        );
        assert_eq!(result, AliasCheck::Deny);
    }

    #[test]
    fn warn_and_silent_modes_allow() {
        for mode in [FilteredAliasMode::Warn, FilteredAliasMode::Silent] {
            let result = check(&indices(&["ambiguous"]), "indices:data/read/search", mode, &AliasedCatalog);
            assert_eq!(result, AliasCheck::Allow);
        }
    }

    #[test]
    fn single_filtered_alias_is_fine() {
        let result = check(
            &indices(&["single"]),
            "indices:data/read/search",
            FilteredAliasMode::Disallow,
            &AliasedCatalog,
        );
        assert_eq!(result, AliasCheck::Allow);
    }

    #[test]
    fn non_search_actions_are_ignored() {
        let result = check(
            &indices(&["ambiguous"]),
            "indices:data/write/index",
            FilteredAliasMode::Disallow,
            &AliasedCatalog,
        );
        assert_eq!(result, AliasCheck::Allow);
    }

    #[test]
    fn msearch_is_search_shaped() {
        let result = check(
            &indices(&["ambiguous"]),
            "indices:data/read/msearch",
            FilteredAliasMode::Disallow,
            &AliasedCatalog,
        );
        assert_eq!(result, AliasCheck::Deny);
    }
}
