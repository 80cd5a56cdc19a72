//! Command implementations for forge-cli

pub mod deploy;
pub mod diff;
pub mod init;
pub mod list;
pub mod remove;

pub use deploy::{run_deploy, run_install, run_update};
pub use diff::run_diff;
pub use init::run_init;
pub use list::run_list;
pub use remove::run_remove;
