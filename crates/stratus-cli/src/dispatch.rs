use stratus_core::config::StratusConfig;

use crate::cli::Commands;
use crate::cmd;

pub(crate) fn dispatch_command(
    command: &Commands,
    cfg: &StratusConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let kind = command.backend().unwrap_or(cfg.default_backend);
    match command {
        Commands::Init { .. } => cmd::init::run_init(cfg, kind),
        Commands::Backup { path, password, .. } => {
            cmd::backup::run_backup(cfg, kind, path, password.as_deref())
        }
        Commands::Restore {
            prefix,
            password,
            dest,
            ..
        } => cmd::restore::run_restore(cfg, kind, prefix, password.as_deref(), dest),
        Commands::Delete { prefix, .. } => cmd::delete::run_delete(cfg, kind, prefix),
        Commands::List { .. } => cmd::list::run_list(cfg, kind),
        Commands::Checksum { prefix, .. } => cmd::checksum::run_checksum(cfg, kind, prefix),
        Commands::Inventory { action } => cmd::inventory::run_inventory(cfg, action),
        Commands::Manage { action } => cmd::manage::run_manage(cfg, action),
        Commands::Config { dest } => crate::config_gen::run_config_generate(dest.as_deref()),
    }
}
