//! Construction of the remote clients from configuration. Constructors do
//! not touch the network; credentials are only checked for presence.

use stratus_storage::cloudfiles_backend::auth_url_for_region;
use stratus_storage::{CloudfilesBackend, GlacierClient, S3Backend};

use crate::config::StratusConfig;
use crate::error::Result;
use crate::inventory::FileInventory;

pub fn s3_store(config: &StratusConfig) -> Result<S3Backend> {
    let aws = config.aws()?;
    S3Backend::new(
        aws.s3_bucket()?,
        &aws.region,
        aws.endpoint.as_deref(),
        aws.access_key()?,
        aws.secret_key()?,
    )
}

pub fn glacier_client(config: &StratusConfig) -> Result<GlacierClient> {
    let aws = config.aws()?;
    GlacierClient::new(
        aws.glacier_vault()?,
        &aws.region,
        aws.glacier_endpoint.as_deref(),
        aws.access_key()?,
        aws.secret_key()?,
    )
}

pub fn cloudfiles_store(config: &StratusConfig) -> Result<CloudfilesBackend> {
    let cf = config.cloudfiles()?;
    let auth_url = cf
        .auth_url
        .as_deref()
        .unwrap_or_else(|| auth_url_for_region(&cf.region));
    CloudfilesBackend::new(auth_url, cf.api_user()?, cf.api_key()?, cf.container()?)
}

pub fn file_inventory(config: &StratusConfig) -> Result<FileInventory> {
    Ok(FileInventory::new(config.inventory_path()?))
}
