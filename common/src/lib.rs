pub mod aggregate;
pub mod command;
pub mod config;
pub mod error;
pub mod grid;
pub mod registry;
pub mod results;
pub mod runner;
pub mod sweep;
pub mod util;
