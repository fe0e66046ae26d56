use stratus_core::backend::{open_backend, BackendKind};
use stratus_core::commands;
use stratus_core::config::StratusConfig;

pub(crate) fn run_list(
    config: &StratusConfig,
    kind: BackendKind,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = open_backend(kind, config)?;
    for name in commands::list::run(backend.as_ref())? {
        println!("{name}");
    }
    Ok(())
}
