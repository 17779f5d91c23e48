//! Channel endpoints: the only sanctioned cross-instance communication path.
//!
//! A [`ChannelEndpoint`] is one named end of a message channel between two
//! ports. Endpoints are created by the transport layer, handed to the
//! [`ProcessBuilder`](crate::builder::ProcessBuilder) for binding, and owned
//! (lifecycle-wise) by the [`Runtime`](crate::runtimes::Runtime), which
//! starts them at `initialize()` and stops them at shutdown.
//!
//! The bundled transport is [`FlumeEndpoint`].

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

use crate::tensor::ShapeError;
use crate::types::{DType, PortDirection, Shape};

pub mod flume_endpoint;

pub use flume_endpoint::FlumeEndpoint;

/// Failures on the channel plane.
///
/// `Closed` is the expected shutdown path after `stop()`; `Disconnected`
/// means a peer vanished while the mesh was still running and is surfaced as
/// abnormal termination.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum ChannelError {
    #[error("channel endpoint `{endpoint}` used before start()")]
    #[diagnostic(code(procmesh::channels::not_started))]
    NotStarted { endpoint: String },

    #[error("channel endpoint `{endpoint}` reached end of stream")]
    #[diagnostic(code(procmesh::channels::closed))]
    Closed { endpoint: String },

    #[error("channel endpoint `{endpoint}` disconnected while running")]
    #[diagnostic(
        code(procmesh::channels::disconnected),
        help("a peer dropped its endpoint without a stop(); this is abnormal termination")
    )]
    Disconnected { endpoint: String },

    #[error("port `{port}` is not an {expected} port")]
    #[diagnostic(code(procmesh::channels::direction))]
    Direction {
        port: String,
        expected: PortDirection,
    },

    #[error("reduce combine failed on port `{port}`")]
    #[diagnostic(code(procmesh::channels::reduce))]
    Reduce {
        port: String,
        #[source]
        source: ShapeError,
    },
}

/// Capability set implemented by the transport layer.
///
/// Each endpoint carries identity (`name`, matching the port attribute it
/// binds to), geometry (`shape`, `dtype`), a transport buffer size, and the
/// start/stop lifecycle. `send` and `recv` suspend until a peer is ready or
/// the endpoint reaches end of stream.
#[async_trait]
pub trait ChannelEndpoint: Send + Sync {
    fn name(&self) -> &str;

    fn shape(&self) -> &Shape;

    fn dtype(&self) -> DType;

    /// Transport buffer size in frames.
    fn capacity(&self) -> usize;

    fn start(&self);

    /// Begin graceful shutdown: no further sends are accepted, receivers
    /// drain buffered frames and then observe end of stream.
    fn stop(&self);

    async fn send(&self, frame: crate::tensor::Tensor) -> Result<(), ChannelError>;

    async fn recv(&self) -> Result<crate::tensor::Tensor, ChannelError>;
}
