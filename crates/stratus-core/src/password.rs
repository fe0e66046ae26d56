use zeroize::Zeroizing;

use crate::config::StratusConfig;
use crate::error::Result;

pub const PASSWORD_ENV: &str = "STRATUS_PASSWORD";

/// A configured password, or an explicit request for no encryption.
#[derive(Debug, PartialEq, Eq)]
pub enum Configured {
    Password(Zeroizing<String>),
    Disabled,
}

fn classify(raw: &str) -> Configured {
    if raw.eq_ignore_ascii_case("none") {
        Configured::Disabled
    } else {
        Configured::Password(Zeroizing::new(raw.to_string()))
    }
}

/// Non-interactive sources in precedence order: `--password`, config file,
/// `STRATUS_PASSWORD`. Empty values are ignored.
pub fn configured_password(cli: Option<&str>, config: &StratusConfig) -> Option<Configured> {
    if let Some(p) = cli.filter(|p| !p.is_empty()) {
        return Some(classify(p));
    }

    if let Some(p) = config
        .encryption
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
    {
        return Some(classify(p));
    }

    match std::env::var(PASSWORD_ENV) {
        Ok(p) if !p.is_empty() => Some(classify(&p)),
        _ => None,
    }
}

/// Resolve the password, falling back to `prompt` when nothing is
/// configured. A blank prompt answer means no encryption.
pub fn resolve_password<F>(
    cli: Option<&str>,
    config: &StratusConfig,
    prompt: F,
) -> Result<Option<Zeroizing<String>>>
where
    F: FnOnce() -> Result<Option<Zeroizing<String>>>,
{
    match configured_password(cli, config) {
        Some(Configured::Password(p)) => Ok(Some(p)),
        Some(Configured::Disabled) => Ok(None),
        None => Ok(prompt()?.filter(|p| !p.is_empty())),
    }
}
