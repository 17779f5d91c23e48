//! Live ports and their compiler-supplied initializers.
//!
//! A [`Port`] is a passive typed handle: it owns no computation, only the
//! delegation of send/receive to its bound channel endpoints. Ports are
//! created by the builder and mutated only during build (endpoint binding);
//! afterwards the only thing that moves is channel traffic.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::channels::{ChannelEndpoint, ChannelError};
use crate::reduce::{ReduceOp, ReduceSum};
use crate::tensor::Tensor;
use crate::types::{DType, PortDirection, Shape};

/// Immutable port descriptor produced by the compiler.
///
/// `size_hint` is the transport buffer size the channel-allocation layer
/// should use for endpoints feeding this port.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortInitializer {
    pub name: String,
    pub shape: Shape,
    pub dtype: DType,
    pub direction: PortDirection,
    pub size_hint: usize,
}

impl PortInitializer {
    pub fn new(
        name: impl Into<String>,
        shape: impl Into<Shape>,
        dtype: DType,
        direction: PortDirection,
        size_hint: usize,
    ) -> Self {
        PortInitializer {
            name: name.into(),
            shape: shape.into(),
            dtype,
            direction,
            size_hint,
        }
    }
}

/// Result of one receive on an input port.
#[derive(Clone, Debug, PartialEq)]
pub enum PortRead {
    /// The combined frame for this step.
    Frame(Tensor),
    /// No endpoint is bound; the port produces no data.
    Dangling,
    /// Every peer stopped cleanly; the stream is over.
    Closed,
}

static SUM: ReduceSum = ReduceSum;

/// A live, directional, typed data endpoint of a process.
///
/// A port may be bound to zero endpoints (dangling, which is legal and common
/// for terminal outputs and diagnostic inputs), one endpoint, or, for inputs,
/// several endpoints whose per-step frames are folded with the port's
/// [`ReduceOp`] (default element-wise sum).
pub struct Port {
    name: String,
    direction: PortDirection,
    shape: Shape,
    dtype: DType,
    endpoints: Vec<Arc<dyn ChannelEndpoint>>,
    reduce: Option<Arc<dyn ReduceOp>>,
}

impl Port {
    pub fn input(name: impl Into<String>, shape: impl Into<Shape>, dtype: DType) -> Self {
        Port {
            name: name.into(),
            direction: PortDirection::Input,
            shape: shape.into(),
            dtype,
            endpoints: Vec::new(),
            reduce: None,
        }
    }

    pub fn output(name: impl Into<String>, shape: impl Into<Shape>, dtype: DType) -> Self {
        Port {
            name: name.into(),
            direction: PortDirection::Output,
            shape: shape.into(),
            dtype,
            endpoints: Vec::new(),
            reduce: None,
        }
    }

    /// Replace the default sum reduce strategy. Input ports only.
    #[must_use]
    pub fn with_reduce(mut self, op: Arc<dyn ReduceOp>) -> Self {
        self.reduce = Some(op);
        self
    }

    /// Bind one more channel endpoint. Called by the builder during build;
    /// binding several endpoints is only meaningful for input ports.
    pub fn bind(&mut self, endpoint: Arc<dyn ChannelEndpoint>) {
        self.endpoints.push(endpoint);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> PortDirection {
        self.direction
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn endpoints(&self) -> &[Arc<dyn ChannelEndpoint>] {
        &self.endpoints
    }

    /// A dangling port has no bound endpoint; it yields no data and its
    /// sends are no-ops.
    #[must_use]
    pub fn is_dangling(&self) -> bool {
        self.endpoints.is_empty()
    }

    fn reduce_op(&self) -> &dyn ReduceOp {
        self.reduce.as_deref().unwrap_or(&SUM)
    }

    /// Send one frame to every bound endpoint. A dangling port accepts and
    /// discards the frame.
    pub async fn send(&self, frame: &Tensor) -> Result<(), ChannelError> {
        if !self.direction.is_output() {
            return Err(ChannelError::Direction {
                port: self.name.clone(),
                expected: PortDirection::Output,
            });
        }
        for endpoint in &self.endpoints {
            endpoint.send(frame.clone()).await?;
        }
        Ok(())
    }

    /// Receive one frame from every bound endpoint and fold them with the
    /// reduce strategy. The fold is deterministic (endpoint binding order)
    /// and the strategy commutative, so the result does not depend on
    /// arrival interleaving.
    pub async fn recv(&self) -> Result<PortRead, ChannelError> {
        if !self.direction.is_input() {
            return Err(ChannelError::Direction {
                port: self.name.clone(),
                expected: PortDirection::Input,
            });
        }
        let mut acc: Option<Tensor> = None;
        for endpoint in &self.endpoints {
            let frame = match endpoint.recv().await {
                Ok(frame) => frame,
                Err(ChannelError::Closed { .. }) => return Ok(PortRead::Closed),
                Err(err) => return Err(err),
            };
            acc = Some(match acc {
                None => frame,
                Some(folded) => {
                    self.reduce_op()
                        .combine(folded, &frame)
                        .map_err(|source| ChannelError::Reduce {
                            port: self.name.clone(),
                            source,
                        })?
                }
            });
        }
        Ok(match acc {
            Some(frame) => PortRead::Frame(frame),
            None => PortRead::Dangling,
        })
    }
}

impl std::fmt::Debug for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Port")
            .field("name", &self.name)
            .field("direction", &self.direction)
            .field("shape", &self.shape)
            .field("dtype", &self.dtype)
            .field("endpoints", &self.endpoints.len())
            .finish()
    }
}
