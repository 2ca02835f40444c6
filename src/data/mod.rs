//! Local data files consumed by the command-line tool

mod catalog;
mod loader;

pub use catalog::*;
pub use loader::*;
