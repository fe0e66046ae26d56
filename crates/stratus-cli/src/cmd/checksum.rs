use comfy_table::Cell;

use stratus_core::backend::{open_backend, BackendKind};
use stratus_core::commands;
use stratus_core::config::StratusConfig;

use crate::table::CliTableTheme;

pub(crate) fn run_checksum(
    config: &StratusConfig,
    kind: BackendKind,
    prefix: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = open_backend(kind, config)?;
    let Some(entry) = commands::checksum::run(backend.as_ref(), prefix)? else {
        return Ok(());
    };

    let theme = CliTableTheme::detect();
    let mut table = theme.new_data_table(&["Name", "Checksum"]);
    table.add_row(vec![
        Cell::new(&entry.name),
        Cell::new(entry.checksum.as_deref().unwrap_or("-")),
    ]);
    println!("{table}");
    Ok(())
}
