pub mod check;
pub mod compact;
pub mod init;
pub mod show;
pub mod status;
pub mod update;
