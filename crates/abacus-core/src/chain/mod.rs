//! Sequential skill chains with `$previous.<path>` data flow between steps.

pub mod path;
pub mod runner;

pub use path::{PREVIOUS, Placeholder, is_placeholder};
pub use runner::run_chain;
