pub mod divide;
pub mod list;
pub mod prompt;
pub mod undo;
