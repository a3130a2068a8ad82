//! Sync engine and pool (spec components C and D).

mod engine;
mod plan;
mod pool;

pub use engine::{run_pass, Pair};
pub use plan::build_plan;
pub use pool::{PassCounts, SyncPool};
