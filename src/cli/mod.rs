pub mod add;
pub mod dashboard;
pub mod init;
pub mod list;
pub mod mark;
pub mod migrate;
pub mod reconcile;
pub mod server;
