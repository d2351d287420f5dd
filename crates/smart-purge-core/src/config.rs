use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;

pub const DEFAULT_DATABASE_PATH: &str = "smart_purge.db";

/// Name fragments that mark a view as temporary, in match priority order.
pub const DEFAULT_TEMP_VIEW_PATTERNS: [&str; 13] = [
    "temp", "test", "working", "copy", "old", "backup", "draft", "wip", "tmp", "delete", "unused",
    "archive", "obsolete",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PurgeConfig {
    pub database_path: String,
    /// Keep generic/default wall, floor and roof types out of the results.
    pub protect_defaults: bool,
    /// Ids below this value are treated as system-seeded.
    pub reserved_id_threshold: i64,
    pub dry_run_default: bool,
    /// How many failure reasons a purge summary lists before truncating.
    pub failure_summary_limit: usize,
    pub temp_view_patterns: Vec<String>,
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            protect_defaults: true,
            reserved_id_threshold: 100,
            dry_run_default: true,
            failure_summary_limit: 5,
            temp_view_patterns: DEFAULT_TEMP_VIEW_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

/// Load `Config.{toml,json,yaml,...}` if present, then `SMART_PURGE_*` overrides.
pub fn load_configuration() -> Result<PurgeConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(
            Environment::with_prefix("SMART_PURGE")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("temp_view_patterns"),
        )
        .build()?;
    builder.try_deserialize::<PurgeConfig>()
}
