//! # Procmesh: Builder and Runtime Core for Dataflow Process Models
//!
//! Procmesh turns compiled process descriptors into live, channel-wired
//! process instances and drives their execution with barrier-synchronized
//! stepping.
//!
//! ## Core Concepts
//!
//! - **Vars**: Named, shaped process state with an initial value and a
//!   precision hint
//! - **Ports**: Directional, typed data endpoints, bound to channel
//!   endpoints or left dangling
//! - **Schema**: Static per-model attribute contracts validated at build
//!   time
//! - **Builder**: Validation and materialization of one process instance
//! - **Runtime**: Deployment-plan validation, channel lifecycle, and the
//!   stepped barrier loop
//!
//! ## Building a Process Instance
//!
//! A model type declares its contract as a static schema and receives its
//! live state through explicit assembly:
//!
//! ```rust
//! use std::sync::LazyLock;
//! use async_trait::async_trait;
//! use procmesh::builder::{BuildError, ProcessBuilder};
//! use procmesh::process::{
//!     ModelError, ModelParts, Port, PortInitializer, PortRead, ProcessModel, StepOutcome, Var,
//!     VarInitializer,
//! };
//! use procmesh::schema::ModelSchema;
//! use procmesh::types::{DType, PortDirection};
//!
//! static SCHEMA: LazyLock<ModelSchema> = LazyLock::new(|| {
//!     ModelSchema::builder("Gain")
//!         .input("s_in", DType::Float64, 24)
//!         .var("gain", DType::Float64, 24)
//!         .output("a_out", DType::Float64, 24)
//!         .build()
//! });
//!
//! struct Gain {
//!     gain: Var,
//!     s_in: Port,
//!     a_out: Port,
//! }
//!
//! #[async_trait]
//! impl ProcessModel for Gain {
//!     fn schema() -> &'static ModelSchema {
//!         &SCHEMA
//!     }
//!
//!     fn assemble(mut parts: ModelParts) -> Result<Self, BuildError> {
//!         Ok(Gain {
//!             gain: parts.take_var("gain")?,
//!             s_in: parts.take_port("s_in")?,
//!             a_out: parts.take_port("a_out")?,
//!         })
//!     }
//!
//!     fn kind(&self) -> &'static str {
//!         "Gain"
//!     }
//!
//!     async fn run_step(&mut self, _step: u64) -> Result<StepOutcome, ModelError> {
//!         match self.s_in.recv().await? {
//!             PortRead::Frame(frame) => {
//!                 self.a_out.send(&frame).await?;
//!                 Ok(StepOutcome::Completed)
//!             }
//!             PortRead::Dangling => Ok(StepOutcome::Completed),
//!             PortRead::Closed => Ok(StepOutcome::EndOfStream),
//!         }
//!     }
//! }
//!
//! let mut builder = ProcessBuilder::<Gain>::new(0);
//! builder.set_variables(vec![VarInitializer::new("gain", [1], 2.0, 0)])?;
//! builder.set_ports(vec![
//!     PortInitializer::new("s_in", [2, 1], DType::Float64, PortDirection::Input, 32),
//!     PortInitializer::new("a_out", [2, 1], DType::Float64, PortDirection::Output, 32),
//! ])?;
//! // No endpoints supplied: both ports are built dangling, which is legal.
//! builder.check_all_vars_and_ports_set()?;
//! builder.check_type_compatibility()?;
//! let gain = builder.build()?;
//! assert_eq!(gain.gain.as_scalar(), Some(2.0));
//! assert!(gain.s_in.is_dangling());
//! # Ok::<(), procmesh::builder::BuildError>(())
//! ```
//!
//! ## Running a Mesh
//!
//! Built instances and their channel endpoints are handed to a
//! [`Runtime`](crate::runtimes::Runtime), which validates the deployment
//! plan, starts the endpoints, and barriers every step:
//!
//! ```rust,no_run
//! # async fn example(
//! #     producer: Box<dyn procmesh::process::ProcessModel>,
//! #     consumer: Box<dyn procmesh::process::ProcessModel>,
//! # ) -> Result<(), procmesh::runtimes::RuntimeError> {
//! use procmesh::runtimes::{Executable, Node, NodeConfig, ResourceKind, RunSteps, Runtime};
//!
//! let mut executable = Executable::new();
//! executable.push_config(NodeConfig::new(vec![Node::new(
//!     ResourceKind::HeadNode,
//!     vec!["Producer".into(), "Consumer".into()],
//! )]));
//!
//! let mut runtime = Runtime::new(executable, RunSteps::new(10));
//! runtime.register_instance(producer);
//! runtime.register_instance(consumer);
//! runtime.initialize()?;
//! let report = runtime.run().await?;
//! assert_eq!(report.steps, 10);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Guide
//!
//! - [`types`] - Shapes, element types, and port directions
//! - [`tensor`] - Dense values, broadcasting, element-wise combination
//! - [`schema`] - Static per-model attribute contracts
//! - [`process`] - The `ProcessModel` trait, Vars, and Ports
//! - [`reduce`] - Combination strategies for multi-producer input ports
//! - [`builder`] - Validation and materialization of process instances
//! - [`channels`] - Channel endpoints and the flume transport
//! - [`runtimes`] - Deployment plans, run conditions, and the runtime
//! - [`telemetry`] - Tracing installation helpers

pub mod builder;
pub mod channels;
pub mod process;
pub mod reduce;
pub mod runtimes;
pub mod schema;
pub mod telemetry;
pub mod tensor;
pub mod types;
