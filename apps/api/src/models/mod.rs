pub mod critique;
pub mod document;
