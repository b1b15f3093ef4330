//! Configuration faults.
//!
//! A fault poisons the whole configuration: dispatch stops and
//! `run` reports `Aborted`. There is no per-message recovery at this
//! level; Kernel-level failures travel as THROW messages instead.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("message queue overflow (limit {limit})")]
    QueueOverflow { limit: usize },

    #[error("message sent to a non-actor value")]
    NotAnActor,

    #[error("delivery to a cell with no behavior")]
    NoBehavior,

    #[error("configuration aborted: {0}")]
    Abort(String),
}
