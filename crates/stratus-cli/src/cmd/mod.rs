pub(crate) mod backup;
pub(crate) mod checksum;
pub(crate) mod delete;
pub(crate) mod init;
pub(crate) mod inventory;
pub(crate) mod list;
pub(crate) mod manage;
pub(crate) mod restore;
