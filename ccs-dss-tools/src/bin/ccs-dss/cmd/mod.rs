pub mod build;
pub mod docs;
pub mod list_targets;
pub mod load;
pub mod restart;
