use std::time::Duration;

use stratus_types::error::{Result, StratusError};

use super::types::{BackendKind, PostBackupAction};

pub(super) fn default_region() -> String {
    "us-east-1".to_string()
}

pub(super) fn default_cloudfiles_region() -> String {
    "dfw".to_string()
}

pub(super) fn default_backend() -> BackendKind {
    BackendKind::Cloudfiles
}

pub(super) fn default_archive_name_format() -> String {
    "{name}{now:%Y%m%d%H%M%S}".to_string()
}

pub(super) fn default_pattern() -> String {
    "*".to_string()
}

pub(super) fn default_post_backup_action() -> PostBackupAction {
    PostBackupAction::Keep
}

pub(super) fn default_purge_after() -> String {
    "2d".to_string()
}

/// Parse an age like "90", "90s", "30m", "4h" or "2d". A bare number is
/// seconds.
pub fn parse_human_duration(raw: &str) -> Result<Duration> {
    let input = raw.trim();
    let split = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (digits, unit) = input.split_at(split);
    if digits.is_empty() {
        return Err(StratusError::Config(format!(
            "invalid duration '{raw}': expected a number of seconds or a value like 30m, 4h, 2d"
        )));
    }

    let multiplier: u64 = match unit.to_ascii_lowercase().as_str() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        other => {
            return Err(StratusError::Config(format!(
                "unsupported duration unit '{other}' in '{raw}' (use s/m/h/d)"
            )));
        }
    };
    let value: u64 = digits
        .parse()
        .map_err(|_| StratusError::Config(format!("duration out of range: '{raw}'")))?;

    match value.saturating_mul(multiplier) {
        0 => Err(StratusError::Config(
            "duration must be greater than zero".into(),
        )),
        secs => Ok(Duration::from_secs(secs)),
    }
}
