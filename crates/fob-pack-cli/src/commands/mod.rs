//! Command implementations for the fob-pack CLI.
//!
//! - [`pack`] - Pack the scripts of a built site

pub mod pack;

pub use pack::execute as pack_execute;
