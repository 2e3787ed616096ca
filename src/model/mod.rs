pub mod document;
pub mod field;
pub mod priority;
pub mod task;
