//! Commands for the Memoir binary.

pub mod health;
pub mod serve;
