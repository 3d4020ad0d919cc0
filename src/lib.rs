pub mod memory;
pub mod processor;
