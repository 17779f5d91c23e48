//! Core domain tags for the procmesh framework.
//!
//! This module defines the small vocabulary shared by every other layer:
//! [`Shape`] for the geometry of values and ports, [`DType`] for declared
//! element types, and [`PortDirection`] for the direction capability a port
//! satisfies.
//!
//! These types cross the compiler boundary inside initializers and deployment
//! plans, so all of them carry serde derives.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered sequence of positive axis lengths.
///
/// The scalar convention is rank one with a single axis of length one,
/// written `(1,)`.
///
/// # Examples
///
/// ```rust
/// use procmesh::types::Shape;
///
/// let matrix = Shape::from([2, 3]);
/// assert_eq!(matrix.rank(), 2);
/// assert_eq!(matrix.num_elements(), 6);
///
/// let scalar = Shape::scalar();
/// assert_eq!(scalar.dims(), &[1]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape(Vec<usize>);

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Shape(dims)
    }

    /// The `(1,)` shape used for scalar Vars and ports.
    pub fn scalar() -> Self {
        Shape(vec![1])
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Total element count; the empty shape counts as one element.
    pub fn num_elements(&self) -> usize {
        self.0.iter().product()
    }

    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.num_elements() == 1
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape(dims)
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Shape(dims.to_vec())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        if self.0.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

/// Declared element type of a Var or Port.
///
/// `DType` is metadata: live values are carried as `f64` inside
/// [`Tensor`](crate::tensor::Tensor), and the declared type travels alongside
/// for validation and for the transport layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
}

impl DType {
    /// Bit width of one element of this type.
    pub fn bits(&self) -> u32 {
        match self {
            DType::Bool => 1,
            DType::Int8 => 8,
            DType::Int16 => 16,
            DType::Int32 => 32,
            DType::Int64 => 64,
            DType::Float32 => 32,
            DType::Float64 => 64,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::Bool => write!(f, "bool"),
            DType::Int8 => write!(f, "int8"),
            DType::Int16 => write!(f, "int16"),
            DType::Int32 => write!(f, "int32"),
            DType::Int64 => write!(f, "int64"),
            DType::Float32 => write!(f, "float32"),
            DType::Float64 => write!(f, "float64"),
        }
    }
}

/// Direction capability of a port: data flows in or data flows out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    #[must_use]
    pub fn is_input(&self) -> bool {
        matches!(self, PortDirection::Input)
    }

    #[must_use]
    pub fn is_output(&self) -> bool {
        matches!(self, PortDirection::Output)
    }
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::Input => write!(f, "input"),
            PortDirection::Output => write!(f, "output"),
        }
    }
}
