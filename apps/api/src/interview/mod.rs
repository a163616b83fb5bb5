//! Interview sessions: question generation, the progression state machine,
//! the per-session actor that runs it, and post-interview scoring.

pub mod completion;
pub mod evaluation;
pub mod fallback;
pub mod handlers;
pub mod machine;
pub mod models;
pub mod questions;
pub mod recovery;
pub mod reducer;
pub mod registry;
pub mod runner;
