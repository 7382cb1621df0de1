#![doc = "forge-harvest: collect GitHub users and their repositories into flat CSV datasets."]

//! The pipeline runs search → detail → repositories → projection → write,
//! sequentially. See [`harvest`] for the orchestration and [`contract`] for
//! the seams used to mock the network and the output in tests.

pub mod cli;
pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod fetch;
pub mod harvest;
pub mod load_config;
pub mod paginate;
pub mod project;
pub mod writer;

pub use cli::{run, Cli, Commands};
