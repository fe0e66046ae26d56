use stratus_core::config::StratusConfig;
use stratus_core::glacier::GlacierBackend;

use crate::cli::InventoryAction;

pub(crate) fn run_inventory(
    config: &StratusConfig,
    action: &InventoryAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let glacier = GlacierBackend::from_config(config)?;
    match action {
        InventoryAction::Backup => {
            let n = glacier.backup_inventory()?;
            println!("Mirrored {n} inventory entries");
        }
        InventoryAction::Restore => {
            let n = glacier.restore_inventory()?;
            println!("Restored {n} inventory entries");
        }
    }
    Ok(())
}
