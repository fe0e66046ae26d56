use std::path::PathBuf;

use stratus_core::backend::{open_backend, BackendKind};
use stratus_core::commands::restore::{self, RestoreOutcome};
use stratus_core::config::{expand_tilde, StratusConfig};

use crate::password::restore_password;

pub(crate) fn run_restore(
    config: &StratusConfig,
    kind: BackendKind,
    prefix: &str,
    password: Option<&str>,
    dest: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = open_backend(kind, config)?;
    let dest = PathBuf::from(expand_tilde(dest));

    match restore::run(backend.as_ref(), prefix, &dest, || {
        restore_password(password, config, prefix)
    })? {
        RestoreOutcome::Restored { name, dest } => {
            println!("Restored {name} into {}", dest.display());
        }
        RestoreOutcome::Pending { name, job } => {
            println!(
                "Retrieval of {name} is still running (job {}); run restore again later.",
                job.job_id
            );
        }
        RestoreOutcome::NoMatch => {}
    }
    Ok(())
}
