//! Library half of the `hannou` binary, split out so commands can be
//! exercised from integration tests.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod output;
pub mod timing;
