//! kopy-watch: a supervised multi-task directory synchronizer with live
//! filesystem watching and debounced sync passes.

pub mod config;
pub mod controller;
pub mod hash;
pub mod logging;
pub mod ops;
pub mod pathutil;
pub mod resources;
pub mod scanner;
pub mod supervisor;
pub mod sync;
pub mod task;
pub mod types;
pub mod ui;
pub mod watch;

pub use config::{Cli, TaskConfig};
pub use controller::Controller;
pub use task::Task;
pub use types::KopyError;
