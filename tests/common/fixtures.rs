//! Initializer, endpoint, and plan fixtures shared across the integration
//! tests.

use std::sync::Arc;

use procmesh::channels::{ChannelEndpoint, FlumeEndpoint};
use procmesh::process::{PortInitializer, VarInitializer};
use procmesh::runtimes::{Executable, Node, NodeConfig, ResourceKind};
use procmesh::tensor::Tensor;
use procmesh::types::{DType, PortDirection, Shape};

/// Var initializers matching the `Dynamics` fixture schema: an
/// uninitialized scalar, an initialized scalar, a tensor filled from a
/// scalar, and a tensor with an exact-shape init.
pub fn dynamics_var_initializers() -> Vec<VarInitializer> {
    vec![
        VarInitializer::with_default("u", [1], 0),
        VarInitializer::new("bias", [1], 2.0, 1),
        VarInitializer::new("weights", [2, 3], 10.0, 2),
        VarInitializer::new(
            "kernel",
            [3, 2],
            kernel_init(),
            3,
        ),
    ]
}

/// The exact-shape init value for the `kernel` Var.
pub fn kernel_init() -> Tensor {
    Tensor::from_vec(Shape::from([3, 2]), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        .expect("kernel init is well-shaped")
}

/// Port initializers matching the `Dynamics` fixture schema.
pub fn dynamics_port_initializers() -> Vec<PortInitializer> {
    vec![
        PortInitializer::new("s_in", [2, 1], DType::Int32, PortDirection::Input, 32),
        PortInitializer::new("a_out", [3, 2], DType::Int32, PortDirection::Output, 32),
    ]
}

/// A started loopback endpoint whose sends arrive at its own receiver.
pub fn started_loopback(
    name: &str,
    shape: impl Into<Shape>,
    capacity: usize,
) -> Arc<FlumeEndpoint> {
    let endpoint = FlumeEndpoint::loopback(name, shape.into(), DType::Float64, capacity);
    endpoint.start();
    endpoint
}

/// Upcast a concrete endpoint for the builder's endpoint list.
pub fn as_endpoint(endpoint: &Arc<FlumeEndpoint>) -> Arc<dyn ChannelEndpoint> {
    Arc::clone(endpoint) as Arc<dyn ChannelEndpoint>
}

/// An executable holding exactly one single-node config, the only plan this
/// runtime variant accepts.
pub fn single_node_executable() -> Executable {
    let mut executable = Executable::new();
    executable.push_config(NodeConfig::new(vec![head_node()]));
    executable
}

pub fn head_node() -> Node {
    Node::new(ResourceKind::HeadNode, vec![])
}
