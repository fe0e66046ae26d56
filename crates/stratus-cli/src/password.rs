use zeroize::Zeroizing;

use stratus_core::config::StratusConfig;
use stratus_core::error::Result;
use stratus_core::password::resolve_password;

use crate::prompt::{read_new_secret, read_secret};

/// Password for a new backup. A blank answer at the prompt stores the
/// archive unencrypted.
pub(crate) fn backup_password(
    cli: Option<&str>,
    config: &StratusConfig,
) -> Result<Option<Zeroizing<String>>> {
    resolve_password(cli, config, || {
        Ok(Some(read_new_secret("Encryption password (blank for none): ")?))
    })
}

/// Password for decrypting the archive selected by `prefix`.
pub(crate) fn restore_password(
    cli: Option<&str>,
    config: &StratusConfig,
    prefix: &str,
) -> Result<Option<Zeroizing<String>>> {
    resolve_password(cli, config, || {
        Ok(Some(read_secret(&format!("Password for '{prefix}*': "))?))
    })
}
