//! Deployment plans, run conditions, and the barrier-stepping runtime.
//!
//! The runtime layer consumes what the rest of the crate produces: a
//! compiled [`Executable`] from the deployment planner, built process
//! instances from the [`ProcessBuilder`](crate::builder::ProcessBuilder),
//! and channel endpoints from the transport layer. `initialize()` validates
//! the plan and starts the endpoints; `run()` drives every instance as its
//! own task with a barrier between steps until the [`RunCondition`] fires.

pub mod plan;
pub mod run_condition;
pub mod runtime;
pub mod runtime_config;

pub use plan::{Executable, Node, NodeConfig, ResourceKind};
pub use run_condition::{RunCondition, RunSteps, RunWhile};
pub use runtime::{RunReport, Runtime, RuntimeError, RuntimePhase};
pub use runtime_config::RuntimeConfig;
