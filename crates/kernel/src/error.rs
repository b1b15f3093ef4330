//! Kernel driver errors.
//!
//! Kernel-level failures (`Undefined`, `Immutable`, `Not-Understood`)
//! travel as THROW messages and never surface here; this type covers the
//! driver seams: unreadable input, poisoned configurations, undrained
//! queues, and the self-test battery.

use abe_core::Fault;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KernelError {
    #[error("read error near '{0}'")]
    Read(String),

    #[error(transparent)]
    Fault(#[from] Fault),

    #[error("{queued} message(s) left undelivered after budget exhausted")]
    Backlog { queued: usize },

    #[error("self-test failed: {0}")]
    TestFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
