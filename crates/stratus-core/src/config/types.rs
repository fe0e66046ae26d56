use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use stratus_types::error::{Result, StratusError};

use super::defaults::*;
use super::util::expand_tilde;

/// Where archives are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    S3,
    Glacier,
    Cloudfiles,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::S3 => "s3",
            BackendKind::Glacier => "glacier",
            BackendKind::Cloudfiles => "cloudfiles",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = StratusError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s3" => Ok(BackendKind::S3),
            "glacier" => Ok(BackendKind::Glacier),
            "cloudfiles" => Ok(BackendKind::Cloudfiles),
            other => Err(StratusError::UnsupportedBackend(other.to_string())),
        }
    }
}

/// Top-level configuration, passed explicitly to every backend constructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StratusConfig {
    #[serde(default)]
    pub aws: Option<AwsConfig>,
    #[serde(default)]
    pub cloudfiles: Option<CloudfilesConfig>,
    #[serde(default = "default_backend")]
    pub default_backend: BackendKind,
    /// Local inventory file. Default: platform data dir + `stratus/inventory.json`.
    #[serde(default)]
    pub inventory_path: Option<String>,
    /// Stored-name template; `{name}` is the base name and `{now:FMT}` a
    /// local timestamp.
    #[serde(default = "default_archive_name_format")]
    pub archive_name_format: String,
    #[serde(default)]
    pub encryption: EncryptionConfig,
    #[serde(default)]
    pub manager: ManagerConfig,
}

impl Default for StratusConfig {
    fn default() -> Self {
        Self {
            aws: None,
            cloudfiles: None,
            default_backend: default_backend(),
            inventory_path: None,
            archive_name_format: default_archive_name_format(),
            encryption: EncryptionConfig::default(),
            manager: ManagerConfig::default(),
        }
    }
}

impl StratusConfig {
    pub fn aws(&self) -> Result<&AwsConfig> {
        self.aws
            .as_ref()
            .ok_or_else(|| StratusError::Config("missing 'aws' section".into()))
    }

    pub fn cloudfiles(&self) -> Result<&CloudfilesConfig> {
        self.cloudfiles
            .as_ref()
            .ok_or_else(|| StratusError::Config("missing 'cloudfiles' section".into()))
    }

    pub fn inventory_path(&self) -> Result<PathBuf> {
        if let Some(ref p) = self.inventory_path {
            return Ok(PathBuf::from(expand_tilde(p)));
        }
        dirs::data_dir()
            .map(|d| d.join("stratus").join("inventory.json"))
            .ok_or_else(|| {
                StratusError::Config(
                    "cannot determine a data directory; set 'inventory_path'".into(),
                )
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwsConfig {
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    /// S3 backend bucket; also holds the Glacier inventory mirror.
    #[serde(default)]
    pub s3_bucket: Option<String>,
    #[serde(default)]
    pub glacier_vault: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub glacier_endpoint: Option<String>,
}

impl AwsConfig {
    pub fn access_key(&self) -> Result<&str> {
        required(&self.access_key, "aws.access_key")
    }

    pub fn secret_key(&self) -> Result<&str> {
        required(&self.secret_key, "aws.secret_key")
    }

    pub fn s3_bucket(&self) -> Result<&str> {
        required(&self.s3_bucket, "aws.s3_bucket")
    }

    pub fn glacier_vault(&self) -> Result<&str> {
        required(&self.glacier_vault, "aws.glacier_vault")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CloudfilesConfig {
    #[serde(default)]
    pub api_user: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub container: Option<String>,
    /// `dfw`, `ord` or `lon`.
    #[serde(default = "default_cloudfiles_region")]
    pub region: String,
    #[serde(default)]
    pub auth_url: Option<String>,
}

impl CloudfilesConfig {
    pub fn api_user(&self) -> Result<&str> {
        required(&self.api_user, "cloudfiles.api_user")
    }

    pub fn api_key(&self) -> Result<&str> {
        required(&self.api_key, "cloudfiles.api_key")
    }

    pub fn container(&self) -> Result<&str> {
        required(&self.container, "cloudfiles.container")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncryptionConfig {
    /// `none` disables encryption without prompting.
    #[serde(default)]
    pub password: Option<String>,
}

/// What the retention manager does with a local file once it is backed up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostBackupAction {
    Purgatory,
    Delete,
    Keep,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManagerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub source_dir: Option<String>,
    /// Glob matched against file names in `source_dir`.
    #[serde(default = "default_pattern")]
    pub pattern: String,
    /// Falls back to `default_backend`.
    #[serde(default)]
    pub backend: Option<BackendKind>,
    #[serde(default = "default_post_backup_action")]
    pub post_backup_action: PostBackupAction,
    #[serde(default)]
    pub purgatory_dir: Option<String>,
    #[serde(default = "default_purge_after")]
    pub purge_after: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            source_dir: None,
            pattern: default_pattern(),
            backend: None,
            post_backup_action: default_post_backup_action(),
            purgatory_dir: None,
            purge_after: default_purge_after(),
        }
    }
}

fn required<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(StratusError::Config(format!("missing '{key}'"))),
    }
}
