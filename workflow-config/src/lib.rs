//! Configuration for the budget transfer workflow engine.
//!
//! Holds the small set of values the engine treats as injected configuration
//! rather than mutable runtime state: the archived-stage order threshold,
//! the operation-to-ability map used by authorization checks, pagination
//! defaults, and event-sink settings. Values are loaded from a TOML file and
//! may be overridden by environment variables, the same layering
//! `atomic-config` uses for repository settings.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_derive::{Deserialize, Serialize};

/// Stage `order_index` values at or above this threshold are archived: kept
/// for audit but never activated for new instances.
pub const DEFAULT_ARCHIVED_THRESHOLD: u32 = 9999;

/// Default page size for paginated visibility-service queries.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Engine-wide configuration, loaded once at startup and shared read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Order-index threshold at which a stage template is considered archived.
    #[serde(default = "default_archived_threshold")]
    pub archived_threshold: u32,

    /// Default page size for `listPendingForUser` / `listHistoryForUser`.
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Operation name (as used by API/CLI callers) to required ability tag.
    #[serde(default)]
    pub operation_abilities: HashMap<String, String>,

    /// Event sink configuration.
    #[serde(default)]
    pub events: EventSinkConfig,
}

fn default_archived_threshold() -> u32 {
    DEFAULT_ARCHIVED_THRESHOLD
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for EngineConfig {
    fn default() -> Self {
        let mut operation_abilities = HashMap::new();
        operation_abilities.insert("list_pending".to_string(), "approve".to_string());
        operation_abilities.insert("list_history".to_string(), "approve".to_string());
        operation_abilities.insert("start_workflow".to_string(), "transfer".to_string());
        operation_abilities.insert("cancel_workflow".to_string(), "edit".to_string());
        operation_abilities.insert("restart_workflow".to_string(), "edit".to_string());

        Self {
            archived_threshold: DEFAULT_ARCHIVED_THRESHOLD,
            default_page_size: DEFAULT_PAGE_SIZE,
            operation_abilities,
            events: EventSinkConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Look up the ability tag required to invoke a named boundary operation.
    pub fn operation_ability(&self, operation: &str) -> Option<&str> {
        self.operation_abilities
            .get(operation)
            .map(String::as_str)
    }

    /// Load configuration from a TOML file, falling back to defaults for any
    /// field the file omits.
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&text)?;
        Ok(config)
    }

    /// Load configuration the way a deployed engine does: look for
    /// `WORKFLOW_ENGINE_CONFIG` in the environment, else a `workflow-engine.toml`
    /// in the user's config directory, else fall back to built-in defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("WORKFLOW_ENGINE_CONFIG") {
            match Self::load_from_file(&path) {
                Ok(config) => return config,
                Err(err) => {
                    log::warn!("failed to load config from {path}: {err}");
                }
            }
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return config,
                    Err(err) => {
                        log::warn!("failed to load config from {}: {err}", path.display());
                    }
                }
            }
        }

        Self::default()
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|dir| dir.join("workflow-engine").join("config.toml"))
}

/// Configuration for the HTTP webhook event sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSinkConfig {
    /// Webhook URL the engine posts terminal/stage events to. `None` disables
    /// the HTTP sink (logging-only).
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Request timeout, in milliseconds, for webhook delivery attempts.
    #[serde(default = "default_webhook_timeout_ms")]
    pub webhook_timeout_ms: u64,

    /// Number of delivery retries the HTTP sink performs before giving up.
    /// This never re-evaluates engine state; it is a transport-level retry.
    #[serde(default = "default_webhook_retries")]
    pub webhook_retries: u32,
}

fn default_webhook_timeout_ms() -> u64 {
    5_000
}

fn default_webhook_retries() -> u32 {
    3
}

impl Default for EventSinkConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            webhook_timeout_ms: default_webhook_timeout_ms(),
            webhook_retries: default_webhook_retries(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_builtin_ability_map() {
        let config = EngineConfig::default();
        assert_eq!(config.archived_threshold, DEFAULT_ARCHIVED_THRESHOLD);
        assert_eq!(config.operation_ability("list_pending"), Some("approve"));
        assert_eq!(config.operation_ability("unknown_operation"), None);
    }

    #[test]
    fn loads_from_toml_with_partial_overrides() {
        let toml_text = r#"
            archived_threshold = 5000

            [events]
            webhook_url = "https://example.test/hook"
        "#;
        let dir = std::env::temp_dir().join(format!(
            "workflow-engine-config-test-{:?}",
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, toml_text).unwrap();

        let config = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(config.archived_threshold, 5000);
        assert_eq!(config.default_page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(
            config.events.webhook_url.as_deref(),
            Some("https://example.test/hook")
        );

        std::fs::remove_dir_all(&dir).ok();
    }
}
