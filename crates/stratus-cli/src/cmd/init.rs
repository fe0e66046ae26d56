use stratus_core::backend::{open_backend, BackendKind};
use stratus_core::config::StratusConfig;

pub(crate) fn run_init(
    config: &StratusConfig,
    kind: BackendKind,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = open_backend(kind, config)?;
    backend.init()?;
    println!("Initialized {}", backend.location());
    Ok(())
}
