//! Fixture process models shared across the integration tests.

use std::sync::LazyLock;

use async_trait::async_trait;
use procmesh::builder::BuildError;
use procmesh::process::{
    ModelError, ModelParts, Port, PortRead, ProcessModel, StepOutcome, Var,
};
use procmesh::schema::ModelSchema;
use procmesh::tensor::Tensor;
use procmesh::types::DType;

/// A model with the full attribute variety: two ports, scalar vars with and
/// without explicit inits, and tensor vars that do and do not need
/// broadcasting.
#[derive(Debug)]
pub struct Dynamics {
    pub u: Var,
    pub bias: Var,
    pub weights: Var,
    pub kernel: Var,
    pub s_in: Port,
    pub a_out: Port,
}

static DYNAMICS_SCHEMA: LazyLock<ModelSchema> = LazyLock::new(|| {
    ModelSchema::builder("Dynamics")
        .input("s_in", DType::Int32, 8)
        .var("u", DType::Int32, 27)
        .var("bias", DType::Int32, 27)
        .var("weights", DType::Int32, 6)
        .var("kernel", DType::Int32, 6)
        .output("a_out", DType::Int32, 8)
        .build()
});

#[async_trait]
impl ProcessModel for Dynamics {
    fn schema() -> &'static ModelSchema {
        &DYNAMICS_SCHEMA
    }

    fn assemble(mut parts: ModelParts) -> Result<Self, BuildError> {
        Ok(Dynamics {
            u: parts.take_var("u")?,
            bias: parts.take_var("bias")?,
            weights: parts.take_var("weights")?,
            kernel: parts.take_var("kernel")?,
            s_in: parts.take_port("s_in")?,
            a_out: parts.take_port("a_out")?,
        })
    }

    fn kind(&self) -> &'static str {
        "Dynamics"
    }

    async fn run_step(&mut self, _step: u64) -> Result<StepOutcome, ModelError> {
        // Fake dynamics, just enough to show the built Vars are usable.
        self.u.value = self.u.value.add(&self.bias.value)?;
        Ok(StepOutcome::Completed)
    }
}

/// Emits the step number as a scalar frame each step.
pub struct Source {
    pub a_out: Port,
}

static SOURCE_SCHEMA: LazyLock<ModelSchema> =
    LazyLock::new(|| ModelSchema::builder("Source").output("a_out", DType::Float64, 24).build());

#[async_trait]
impl ProcessModel for Source {
    fn schema() -> &'static ModelSchema {
        &SOURCE_SCHEMA
    }

    fn assemble(mut parts: ModelParts) -> Result<Self, BuildError> {
        Ok(Source {
            a_out: parts.take_port("a_out")?,
        })
    }

    fn kind(&self) -> &'static str {
        "Source"
    }

    async fn run_step(&mut self, step: u64) -> Result<StepOutcome, ModelError> {
        self.a_out.send(&Tensor::scalar(step as f64)).await?;
        Ok(StepOutcome::Completed)
    }
}

/// Accumulates received frames and forwards the running total.
pub struct Sink {
    pub total: Var,
    pub s_in: Port,
    pub a_out: Port,
}

static SINK_SCHEMA: LazyLock<ModelSchema> = LazyLock::new(|| {
    ModelSchema::builder("Sink")
        .input("s_in", DType::Float64, 24)
        .var("total", DType::Float64, 24)
        .output("a_out", DType::Float64, 24)
        .build()
});

#[async_trait]
impl ProcessModel for Sink {
    fn schema() -> &'static ModelSchema {
        &SINK_SCHEMA
    }

    fn assemble(mut parts: ModelParts) -> Result<Self, BuildError> {
        Ok(Sink {
            total: parts.take_var("total")?,
            s_in: parts.take_port("s_in")?,
            a_out: parts.take_port("a_out")?,
        })
    }

    fn kind(&self) -> &'static str {
        "Sink"
    }

    async fn run_step(&mut self, _step: u64) -> Result<StepOutcome, ModelError> {
        match self.s_in.recv().await? {
            PortRead::Frame(frame) => {
                self.total.value = self.total.value.add(&frame)?;
                self.a_out.send(&self.total.value).await?;
                Ok(StepOutcome::Completed)
            }
            PortRead::Dangling => Ok(StepOutcome::Completed),
            PortRead::Closed => Ok(StepOutcome::EndOfStream),
        }
    }
}

/// Halts gracefully once the step counter reaches the fuse value.
pub struct Fuse {
    pub fuse: Var,
}

static FUSE_SCHEMA: LazyLock<ModelSchema> =
    LazyLock::new(|| ModelSchema::builder("Fuse").var("fuse", DType::Int32, 8).build());

#[async_trait]
impl ProcessModel for Fuse {
    fn schema() -> &'static ModelSchema {
        &FUSE_SCHEMA
    }

    fn assemble(mut parts: ModelParts) -> Result<Self, BuildError> {
        Ok(Fuse {
            fuse: parts.take_var("fuse")?,
        })
    }

    fn kind(&self) -> &'static str {
        "Fuse"
    }

    async fn run_step(&mut self, step: u64) -> Result<StepOutcome, ModelError> {
        let fuse = self.fuse.as_scalar().unwrap_or(f64::MAX) as u64;
        if step >= fuse {
            Ok(StepOutcome::EndOfStream)
        } else {
            Ok(StepOutcome::Completed)
        }
    }
}

/// Fails abnormally once the step counter reaches the fuse value.
pub struct Faulty {
    pub fuse: Var,
}

static FAULTY_SCHEMA: LazyLock<ModelSchema> =
    LazyLock::new(|| ModelSchema::builder("Faulty").var("fuse", DType::Int32, 8).build());

#[async_trait]
impl ProcessModel for Faulty {
    fn schema() -> &'static ModelSchema {
        &FAULTY_SCHEMA
    }

    fn assemble(mut parts: ModelParts) -> Result<Self, BuildError> {
        Ok(Faulty {
            fuse: parts.take_var("fuse")?,
        })
    }

    fn kind(&self) -> &'static str {
        "Faulty"
    }

    async fn run_step(&mut self, step: u64) -> Result<StepOutcome, ModelError> {
        let fuse = self.fuse.as_scalar().unwrap_or(f64::MAX) as u64;
        if step >= fuse {
            Err(ModelError::Compute {
                detail: format!("fuse blew at step {step}"),
            })
        } else {
            Ok(StepOutcome::Completed)
        }
    }
}
