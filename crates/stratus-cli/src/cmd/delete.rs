use stratus_core::backend::{open_backend, BackendKind};
use stratus_core::commands;
use stratus_core::config::StratusConfig;

pub(crate) fn run_delete(
    config: &StratusConfig,
    kind: BackendKind,
    prefix: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = open_backend(kind, config)?;
    if let Some(name) = commands::delete::run(backend.as_ref(), prefix)? {
        println!("Deleted {name}");
    }
    Ok(())
}
