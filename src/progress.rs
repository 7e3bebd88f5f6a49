//! Request stages and the callback trait that observes them.
//!
//! Every request walks the same state machine:
//!
//! ```text
//! Received ─▶ Validated ─▶ Extracted (files only) ─▶ Generated ─▶ Responded
//!     │            │              │                      │
//!     └────────────┴──────────────┴──────────────────────┴──▶ Failed(kind)
//! ```
//!
//! Inject an [`Arc<dyn StageCallback>`] via
//! [`crate::config::SolverConfigBuilder::stage_callback`] to follow it, e.g.
//! to drive a spinner in the CLI or count failures by kind.
//!
//! # Example
//!
//! ```rust
//! use edgequake_qpsolve::{SolverConfig, Stage, StageCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct FailureCounter(AtomicUsize);
//!
//! impl StageCallback for FailureCounter {
//!     fn on_stage(&self, stage: Stage) {
//!         if let Stage::Failed(_) = stage {
//!             self.0.fetch_add(1, Ordering::SeqCst);
//!         }
//!     }
//! }
//!
//! let config = SolverConfig::builder()
//!     .stage_callback(Arc::new(FailureCounter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use crate::error::ErrorKind;
use std::fmt;
use std::sync::Arc;

/// Where a request currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validated,
    Extracted,
    Generated,
    Responded,
    Failed(ErrorKind),
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Responded | Stage::Failed(_))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Received => f.write_str("received"),
            Stage::Validated => f.write_str("validated"),
            Stage::Extracted => f.write_str("extracted"),
            Stage::Generated => f.write_str("generated"),
            Stage::Responded => f.write_str("responded"),
            Stage::Failed(kind) => write!(f, "failed({kind:?})"),
        }
    }
}

/// Called by the solver as each request changes stage.
///
/// Implementations must be `Send + Sync`: a server shares one solver across
/// concurrent requests, so calls for different requests may interleave.
/// Both methods default to no-ops.
pub trait StageCallback: Send + Sync {
    /// Called on every transition, including the terminal one.
    fn on_stage(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called once extraction finished, before the emptiness check.
    ///
    /// # Arguments
    /// * `chars`: character count of the extracted text
    fn on_extracted(&self, chars: usize) {
        let _ = chars;
    }
}

/// Shared handle stored in [`crate::config::SolverConfig`].
pub type StageCallbackRef = Arc<dyn StageCallback>;
