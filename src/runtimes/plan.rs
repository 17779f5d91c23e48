//! Compiled deployment plan: which process models run on which logical
//! execution units.
//!
//! These are plain descriptors emitted by the deployment planner. They stay
//! mutable after construction; the runtime revalidates counts on every
//! `initialize()` call, so a plan amended after a successful validation is
//! caught the next time it is used.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of execution resource a node represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// The coordinating head node of a deployment.
    HeadNode,
    Cpu,
    Gpu,
    NeuroCore,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::HeadNode => write!(f, "head-node"),
            ResourceKind::Cpu => write!(f, "cpu"),
            ResourceKind::Gpu => write!(f, "gpu"),
            ResourceKind::NeuroCore => write!(f, "neuro-core"),
        }
    }
}

/// One logical execution unit and the process models assigned to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub resource: ResourceKind,
    pub models: Vec<String>,
}

impl Node {
    pub fn new(resource: ResourceKind, models: Vec<String>) -> Self {
        Node { resource, models }
    }
}

/// One complete deployment plan: an ordered sequence of nodes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    nodes: Vec<Node>,
}

impl NodeConfig {
    pub fn new(nodes: Vec<Node>) -> Self {
        NodeConfig { nodes }
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// The compiled output handed to the runtime: candidate node configs, of
/// which exactly one must be selected for a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Executable {
    node_configs: Vec<NodeConfig>,
}

impl Executable {
    pub fn new() -> Self {
        Executable::default()
    }

    pub fn push_config(&mut self, config: NodeConfig) {
        self.node_configs.push(config);
    }

    pub fn node_configs(&self) -> &[NodeConfig] {
        &self.node_configs
    }

    pub fn node_configs_mut(&mut self) -> &mut Vec<NodeConfig> {
        &mut self.node_configs
    }
}
