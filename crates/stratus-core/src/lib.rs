pub mod archive;
pub mod backend;
pub mod commands;
pub mod config;
pub mod crypto;
pub mod glacier;
pub mod inventory;
pub mod manager;
pub mod mirror;
pub mod naming;
pub mod password;
pub mod storage;

pub use stratus_types::error;

#[cfg(test)]
mod tests;
#[cfg(test)]
mod testutil;
