use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone};

use crate::error::{Result, StratusError};

pub const ARCHIVE_SUFFIX: &str = ".tgz";
pub const ENCRYPTED_SUFFIX: &str = ".enc";

const DEFAULT_NOW_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Render an archive name template.
///
/// Supported placeholders: `{name}`, `{now}` and `{now:<strftime>}`.
pub fn render_name_format<Tz>(format: &str, name: &str, now: &DateTime<Tz>) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::with_capacity(format.len() + name.len());
    let mut rest = format;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('}').ok_or_else(|| {
            StratusError::Config(format!("unterminated placeholder in '{format}'"))
        })?;
        let token = &after[..end];
        match token.split_once(':') {
            None if token == "name" => out.push_str(name),
            None if token == "now" => out.push_str(&format_time(now, DEFAULT_NOW_FORMAT)?),
            Some(("now", fmt)) => out.push_str(&format_time(now, fmt)?),
            _ => {
                return Err(StratusError::Config(format!(
                    "unknown placeholder '{{{token}}}' in '{format}'"
                )))
            }
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);

    if out.is_empty() {
        return Err(StratusError::Config(format!(
            "archive name format '{format}' renders an empty name"
        )));
    }
    Ok(out)
}

fn format_time<Tz>(now: &DateTime<Tz>, fmt: &str) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
        return Err(StratusError::Config(format!(
            "invalid time format '{fmt}'"
        )));
    }
    Ok(now.format(fmt).to_string())
}

/// Full stored name: rendered template plus `.tgz` and, when encrypted, `.enc`.
pub fn stored_name<Tz>(
    format: &str,
    name: &str,
    now: &DateTime<Tz>,
    encrypted: bool,
) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut stored = render_name_format(format, name, now)?;
    stored.push_str(ARCHIVE_SUFFIX);
    if encrypted {
        stored.push_str(ENCRYPTED_SUFFIX);
    }
    Ok(stored)
}

pub fn is_encrypted(stored_name: &str) -> bool {
    stored_name.ends_with(ENCRYPTED_SUFFIX)
}

/// The lexicographically greatest name starting with `prefix`. With the
/// default timestamped format this is the most recent backup.
pub fn latest_matching<'a, I>(names: I, prefix: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    names
        .into_iter()
        .map(String::as_str)
        .filter(|n| n.starts_with(prefix))
        .max()
}
