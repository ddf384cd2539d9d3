//! Command-line front end for the `unlzx` binary.

pub mod args;

pub use args::{Action, Args};
