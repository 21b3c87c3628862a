//! Command implementations for the hannou CLI.
//!
//! Each command drives an `AppController` the way a user would drive the
//! page, then reports the error slot.

pub mod completions;
pub mod config;
pub mod item;
pub mod list;
pub mod tags;
pub mod upload;

pub use completions::generate_completions;
pub use config::run_config;
pub use item::{run_copy, run_delete, run_tag};
pub use list::{run_list, run_search};
pub use tags::run_tags;
pub use upload::{UploadArgs, run_upload};
