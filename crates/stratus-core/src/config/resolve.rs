use std::fmt;
use std::path::{Path, PathBuf};

use stratus_types::error::{Result, StratusError};

use super::defaults::parse_human_duration;
use super::types::{PostBackupAction, StratusConfig};

/// Where the active config file came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly passed via `--config`.
    CliArg(PathBuf),
    /// Set via the `STRATUS_CONFIG` env var.
    EnvVar(PathBuf),
    /// Found by searching standard locations.
    SearchOrder { path: PathBuf, level: &'static str },
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::CliArg(p) => p,
            ConfigSource::EnvVar(p) => p,
            ConfigSource::SearchOrder { path, .. } => path,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::CliArg(p) => write!(f, "{} (--config)", p.display()),
            ConfigSource::EnvVar(p) => write!(f, "{} (STRATUS_CONFIG)", p.display()),
            ConfigSource::SearchOrder { path, level } => {
                write!(f, "{} ({})", path.display(), level)
            }
        }
    }
}

/// Returns search locations in priority order: project, user, system.
pub fn default_config_search_paths() -> Vec<(PathBuf, &'static str)> {
    let mut paths = vec![(PathBuf::from("stratus.yaml"), "project")];

    let user_config = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .map(|base| base.join("stratus").join("config.yaml"));

    if let Some(p) = user_config {
        paths.push((p, "user"));
    }

    paths.push((PathBuf::from("/etc/stratus/config.yaml"), "system"));

    paths
}

/// Resolve which config file to use.
///
/// Priority: CLI arg > `STRATUS_CONFIG` env var > first existing file from search paths.
/// Returns `None` if nothing is found.
pub fn resolve_config_path(cli_config: Option<&str>) -> Option<ConfigSource> {
    if let Some(path) = cli_config {
        return Some(ConfigSource::CliArg(PathBuf::from(path)));
    }

    if let Ok(val) = std::env::var("STRATUS_CONFIG") {
        if !val.is_empty() {
            return Some(ConfigSource::EnvVar(PathBuf::from(val)));
        }
    }

    default_config_search_paths()
        .into_iter()
        .find(|(path, _)| path.exists())
        .map(|(path, level)| ConfigSource::SearchOrder { path, level })
}

/// Load, parse and validate a config file.
pub fn load_config(path: &Path) -> Result<StratusConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        StratusError::Config(format!("cannot read config file '{}': {e}", path.display()))
    })?;
    let config: StratusConfig = serde_yaml::from_str(&contents).map_err(|e| {
        StratusError::Config(format!("invalid config file '{}': {e}", path.display()))
    })?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &StratusConfig) -> Result<()> {
    if config.archive_name_format.trim().is_empty() {
        return Err(StratusError::Config(
            "'archive_name_format' must not be empty".into(),
        ));
    }

    let manager = &config.manager;
    if manager.enabled {
        parse_human_duration(&manager.purge_after)
            .map_err(|e| StratusError::Config(format!("manager.purge_after: {e}")))?;
        if manager.post_backup_action == PostBackupAction::Purgatory
            && manager.purgatory_dir.is_none()
        {
            return Err(StratusError::Config(
                "manager.post_backup_action is 'purgatory' but 'manager.purgatory_dir' is not set"
                    .into(),
            ));
        }
    }
    Ok(())
}

/// Returns a commented YAML config template suitable for bootstrapping.
pub fn minimal_config_template() -> &'static str {
    r#"# stratus configuration file
# Fill in the section for the backend(s) you use.

aws:
  access_key: "AKIA..."
  secret_key: "secret"
  s3_bucket: my-backups          # S3 backend and Glacier inventory mirror
  glacier_vault: my-vault
  region: us-east-1

cloudfiles:
  api_user: "user"
  api_key: "key"
  container: backups
  region: dfw                    # dfw | ord | lon

default_backend: cloudfiles      # s3 | glacier | cloudfiles

# --- Common optional settings (uncomment as needed) ---

# inventory_path: ~/.local/share/stratus/inventory.json
# archive_name_format: "{name}{now:%Y%m%d%H%M%S}"
#
# encryption:
#   password: "secret"           # "none" disables encryption
#
# manager:
#   enabled: true
#   source_dir: /var/backup
#   pattern: "*.sql.gz"
#   backend: cloudfiles
#   post_backup_action: purgatory  # purgatory | delete | keep
#   purgatory_dir: /var/purgatory
#   purge_after: 2d                # s/m/h/d; a bare number is seconds
"#
}
