use chrono::Local;

use stratus_core::backend::open_backend;
use stratus_core::config::StratusConfig;
use stratus_core::crypto::KdfParams;
use stratus_core::manager::{self, ManageContext};
use stratus_core::password::{configured_password, Configured};

use crate::cli::ManageAction;
use crate::table::{add_kv_row, CliTableTheme};

pub(crate) fn run_manage(
    config: &StratusConfig,
    action: &ManageAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let ManageAction::Run = action;
    let kind = config.manager.backend.unwrap_or(config.default_backend);
    let backend = open_backend(kind, config)?;

    // Runs unattended, so never prompt.
    let password = match configured_password(None, config) {
        Some(Configured::Password(p)) => Some(p),
        Some(Configured::Disabled) | None => None,
    };

    let ctx = ManageContext {
        backend: backend.as_ref(),
        name_format: &config.archive_name_format,
        password: password.as_deref().map(|s| s.as_str()),
        kdf: KdfParams::default(),
        now: Local::now(),
    };
    let report = manager::run(&config.manager, &ctx)?;

    let theme = CliTableTheme::detect();
    let mut table = theme.new_kv_table();
    add_kv_row(&mut table, theme, "Backed up", report.backed_up);
    add_kv_row(&mut table, theme, "Failed", report.failed);
    add_kv_row(&mut table, theme, "Moved", report.moved);
    add_kv_row(&mut table, theme, "Deleted", report.deleted);
    add_kv_row(&mut table, theme, "Purged", report.purged);
    println!("{table}");

    if report.failed > 0 {
        return Err(format!("{} file(s) failed to back up", report.failed).into());
    }
    Ok(())
}
