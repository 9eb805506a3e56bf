//! # taskweave core
//!
//! Domain types, traits, and error definitions for the taskweave
//! orchestration engine. This crate has **no I/O** — it defines the model
//! that the engine drives and that generator backends implement against.
//!
//! ## Design Philosophy
//!
//! Every external capability is a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping the language-model backend via configuration
//! - Deterministic testing with scripted generators
//! - Clean dependency graph (all crates depend inward on core)

pub mod capability;
pub mod error;
pub mod event;
pub mod generator;
pub mod state;
pub mod store;
pub mod task;

// Re-export key types at crate root for ergonomics
pub use capability::CapabilityRegistry;
pub use error::{Error, Result};
pub use event::{EventBus, WorkflowEvent};
pub use generator::{Completion, Generator};
pub use state::{Node, RunState};
pub use store::TaskStore;
pub use task::{Feedback, FeedbackKind, Task, TaskStatus};
