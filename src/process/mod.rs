//! Process models: the runnable instances produced by the builder.
//!
//! A process-model type declares its contract as a static
//! [`ModelSchema`](crate::schema::ModelSchema) and receives its live state
//! through [`ModelParts`]: the builder validates initializers, materializes
//! Vars and Ports, and hands the parts to [`ProcessModel::assemble`], which
//! populates the concrete struct field by field. After assembly the instance
//! is driven step by step by the runtime.

use async_trait::async_trait;
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::builder::BuildError;
use crate::channels::ChannelError;
use crate::schema::ModelSchema;
use crate::tensor::ShapeError;

pub mod ports;
pub mod variable;

pub use ports::{Port, PortInitializer, PortRead};
pub use variable::{Var, VarInit, VarInitializer};

/// Failure raised by a model's per-step computation.
#[derive(Debug, Error, Diagnostic)]
pub enum ModelError {
    #[error(transparent)]
    #[diagnostic(code(procmesh::process::channel))]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    #[diagnostic(code(procmesh::process::shape))]
    Shape(#[from] ShapeError),

    #[error("step computation failed: {detail}")]
    #[diagnostic(code(procmesh::process::compute))]
    Compute { detail: String },
}

/// How a step ended, from the instance's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step finished; the instance is ready for the next barrier.
    Completed,
    /// A required input reached end of stream; the instance leaves the mesh
    /// gracefully.
    EndOfStream,
}

/// The materialized Vars and Ports the builder hands to
/// [`ProcessModel::assemble`].
///
/// Assembly is by-name extraction: each declared attribute is taken exactly
/// once and moved into its struct field.
#[derive(Debug, Default)]
pub struct ModelParts {
    vars: FxHashMap<String, Var>,
    ports: FxHashMap<String, Port>,
}

impl ModelParts {
    pub(crate) fn insert_var(&mut self, var: Var) {
        self.vars.insert(var.name.clone(), var);
    }

    pub(crate) fn insert_port(&mut self, port: Port) {
        self.ports.insert(port.name().to_string(), port);
    }

    /// Move the named Var out of the parts.
    pub fn take_var(&mut self, name: &str) -> Result<Var, BuildError> {
        self.vars.remove(name).ok_or_else(|| BuildError::MissingPart {
            attr: name.to_string(),
        })
    }

    /// Move the named Port out of the parts.
    pub fn take_port(&mut self, name: &str) -> Result<Port, BuildError> {
        self.ports
            .remove(name)
            .ok_or_else(|| BuildError::MissingPart {
                attr: name.to_string(),
            })
    }
}

/// A runnable process-model type.
///
/// The static half (`schema`, `assemble`) serves the builder; the dynamic
/// half (`run_step`) serves the runtime, which drives every instance as its
/// own task and barriers between steps.
///
/// # Examples
///
/// ```rust
/// use std::sync::LazyLock;
/// use async_trait::async_trait;
/// use procmesh::builder::BuildError;
/// use procmesh::process::{ModelParts, ModelError, Port, PortRead, ProcessModel, StepOutcome, Var};
/// use procmesh::schema::ModelSchema;
/// use procmesh::types::DType;
///
/// static SCHEMA: LazyLock<ModelSchema> = LazyLock::new(|| {
///     ModelSchema::builder("Relay")
///         .input("s_in", DType::Float64, 24)
///         .var("hops", DType::Int32, 27)
///         .output("a_out", DType::Float64, 24)
///         .build()
/// });
///
/// struct Relay {
///     hops: Var,
///     s_in: Port,
///     a_out: Port,
/// }
///
/// #[async_trait]
/// impl ProcessModel for Relay {
///     fn schema() -> &'static ModelSchema {
///         &SCHEMA
///     }
///
///     fn assemble(mut parts: ModelParts) -> Result<Self, BuildError> {
///         Ok(Relay {
///             hops: parts.take_var("hops")?,
///             s_in: parts.take_port("s_in")?,
///             a_out: parts.take_port("a_out")?,
///         })
///     }
///
///     fn kind(&self) -> &'static str {
///         "Relay"
///     }
///
///     async fn run_step(&mut self, _step: u64) -> Result<StepOutcome, ModelError> {
///         match self.s_in.recv().await? {
///             PortRead::Frame(frame) => {
///                 self.a_out.send(&frame).await?;
///                 Ok(StepOutcome::Completed)
///             }
///             PortRead::Dangling => Ok(StepOutcome::Completed),
///             PortRead::Closed => Ok(StepOutcome::EndOfStream),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait ProcessModel: Send + 'static {
    /// The static schema describing this type's attributes.
    fn schema() -> &'static ModelSchema
    where
        Self: Sized;

    /// Populate the concrete struct from materialized parts.
    fn assemble(parts: ModelParts) -> Result<Self, BuildError>
    where
        Self: Sized;

    /// Stable type name used in runtime diagnostics.
    fn kind(&self) -> &'static str;

    /// Run one step of the process's computation.
    async fn run_step(&mut self, step: u64) -> Result<StepOutcome, ModelError>;
}
