pub mod diff;
pub mod parser;
pub mod portal;
pub mod store;
pub mod telegram;
