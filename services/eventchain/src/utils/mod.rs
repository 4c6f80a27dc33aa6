pub mod format;
pub mod revert;
