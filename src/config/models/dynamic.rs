//! Dynamic settings block
//!
//! Behavior knobs the operator can flip with a configuration reload, read
//! by the evaluator on every call through the current snapshot.

use serde::{Deserialize, Serialize};

/// Policy applied when several filtered aliases cover one concrete index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilteredAliasMode {
    /// Log a warning, allow the request
    Warn,
    /// Deny the request
    Disallow,
    /// Allow silently
    Silent,
}

/// Dynamic settings snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicSettings {
    /// Treat composite actions (bulk, multi-get, multi-search, ...) as
    /// cluster-level permissions
    #[serde(default = "default_true")]
    pub composite_enabled: bool,
    /// Allow permission coverage to accumulate across roles instead of
    /// requiring one role to cover every requested resource
    #[serde(default)]
    pub multi_rolespan_enabled: bool,
    /// "Do not fail on forbidden": narrow read requests to the permitted
    /// index subset instead of denying outright
    #[serde(default)]
    pub do_not_fail_on_forbidden: bool,
    /// Allow a DNFOF rewrite that narrows to zero indices (for request
    /// shapes that tolerate an empty index list)
    #[serde(default)]
    pub dnfof_empty_result_enabled: bool,
    /// Multi-tenancy on/off; when off all tenant lookups address the
    /// global tenant
    #[serde(default = "default_true")]
    pub multitenancy_enabled: bool,
    /// `warn` | `disallow` | anything else = silent allow
    #[serde(default = "default_filtered_alias_mode")]
    pub filtered_alias_mode: String,
    /// Index backing the web console product surface
    #[serde(default = "default_console_index")]
    pub console_index: String,
    /// The engine's own configuration index, protected from regular users
    #[serde(default = "default_protected_index")]
    pub protected_index: String,
    /// Whether snapshot-restore actions are evaluated at all for regular
    /// users (off = always denied)
    #[serde(default = "default_true")]
    pub restore_privilege_enabled: bool,
    /// Require write privileges on every renamed restore target
    #[serde(default = "default_true")]
    pub check_restore_write_privileges: bool,
    /// Deadline for the parallel tenant-table rebuild
    #[serde(default = "default_rebuild_timeout_ms")]
    pub tenant_rebuild_timeout_ms: u64,
}

impl Default for DynamicSettings {
    fn default() -> Self {
        Self {
            composite_enabled: true,
            multi_rolespan_enabled: false,
            do_not_fail_on_forbidden: false,
            dnfof_empty_result_enabled: false,
            multitenancy_enabled: true,
            filtered_alias_mode: default_filtered_alias_mode(),
            console_index: default_console_index(),
            protected_index: default_protected_index(),
            restore_privilege_enabled: true,
            check_restore_write_privileges: true,
            tenant_rebuild_timeout_ms: default_rebuild_timeout_ms(),
        }
    }
}

impl DynamicSettings {
    /// Parse the filtered-alias mode string; unknown values fall back to
    /// silent allow, matching the operator-facing contract.
    pub fn filtered_alias_mode(&self) -> FilteredAliasMode {
        match self.filtered_alias_mode.as_str() {
            "warn" => FilteredAliasMode::Warn,
            "disallow" => FilteredAliasMode::Disallow,
            _ => FilteredAliasMode::Silent,
        }
    }

    /// Validate dynamic settings
    pub fn validate(&self) -> Result<(), String> {
        if self.protected_index.is_empty() {
            return Err("protected_index must not be empty".to_string());
        }
        if self.console_index.is_empty() {
            return Err("console_index must not be empty".to_string());
        }
        if self.tenant_rebuild_timeout_ms == 0 {
            return Err("tenant_rebuild_timeout_ms must be greater than zero".to_string());
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_filtered_alias_mode() -> String {
    "warn".to_string()
}

fn default_console_index() -> String {
    ".console".to_string()
}

fn default_protected_index() -> String {
    ".indexguard".to_string()
}

fn default_rebuild_timeout_ms() -> u64 {
    30_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_safe() {
        let settings = DynamicSettings::default();
        assert!(settings.composite_enabled);
        assert!(!settings.multi_rolespan_enabled);
        assert!(!settings.do_not_fail_on_forbidden);
        assert_eq!(settings.filtered_alias_mode(), FilteredAliasMode::Warn);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn unknown_alias_mode_is_silent() {
        let mut settings = DynamicSettings::default();
        settings.filtered_alias_mode = "nope".to_string();
        assert_eq!(settings.filtered_alias_mode(), FilteredAliasMode::Silent);
        settings.filtered_alias_mode = "disallow".to_string();
        assert_eq!(settings.filtered_alias_mode(), FilteredAliasMode::Disallow);
    }

    #[test]
    fn partial_document_fills_defaults() {
        let settings: DynamicSettings =
            serde_yaml::from_str("do_not_fail_on_forbidden: true").unwrap();
        assert!(settings.do_not_fail_on_forbidden);
        assert_eq!(settings.protected_index, ".indexguard");
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut settings = DynamicSettings::default();
        settings.tenant_rebuild_timeout_ms = 0;
        assert!(settings.validate().is_err());
    }
}
