pub mod cli;
pub mod driver;
pub mod engine;
pub mod generator;
pub mod models;
pub mod processor;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

pub use driver::{database_name, run};
