//! Command implementations for the NuFX CLI.

pub mod extract;
pub mod info;
pub mod list;
pub mod scan;
pub mod test;

pub use extract::{ExtractOptions, cmd_extract};
pub use info::cmd_info;
pub use list::{ListOptions, cmd_list};
pub use scan::cmd_scan;
pub use test::cmd_test;
