pub mod completions;
pub mod help;
pub mod list;
pub mod pick;
