pub mod init;
pub mod provision;
pub mod status;
pub mod tools;
pub mod worker;
