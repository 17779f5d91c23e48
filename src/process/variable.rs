//! Process state: Vars and their compiler-supplied initializers.

use serde::{Deserialize, Serialize};

use crate::tensor::{ShapeError, Tensor};
use crate::types::Shape;

/// Initial value of a Var as emitted by the compiler: a scalar to fill the
/// declared shape with, or a dense value to take as-is or broadcast.
///
/// Declaring no init means zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum VarInit {
    Scalar(f64),
    Dense(Tensor),
}

impl Default for VarInit {
    fn default() -> Self {
        VarInit::Scalar(0.0)
    }
}

impl From<f64> for VarInit {
    fn from(value: f64) -> Self {
        VarInit::Scalar(value)
    }
}

impl From<Tensor> for VarInit {
    fn from(value: Tensor) -> Self {
        VarInit::Dense(value)
    }
}

impl VarInit {
    /// Produce the live value for the declared shape, broadcasting when the
    /// supplied value is lower-rank or has unit axes.
    pub fn materialize(&self, shape: &Shape) -> Result<Tensor, ShapeError> {
        match self {
            VarInit::Scalar(v) => Ok(Tensor::filled(shape.clone(), *v)),
            VarInit::Dense(t) => t.broadcast_to(shape),
        }
    }
}

/// Immutable Var descriptor produced by the compiler; read-only input to the
/// builder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VarInitializer {
    pub name: String,
    pub shape: Shape,
    pub init: VarInit,
    pub id: u32,
}

impl VarInitializer {
    pub fn new(
        name: impl Into<String>,
        shape: impl Into<Shape>,
        init: impl Into<VarInit>,
        id: u32,
    ) -> Self {
        VarInitializer {
            name: name.into(),
            shape: shape.into(),
            init: init.into(),
            id,
        }
    }

    /// An initializer with the default zero init.
    pub fn with_default(name: impl Into<String>, shape: impl Into<Shape>, id: u32) -> Self {
        Self::new(name, shape, VarInit::default(), id)
    }
}

/// A live piece of process state owned by a built model instance.
///
/// `precision` is the bit-width hint copied from the attribute's type
/// descriptor at build time, carried as a typed field next to the value.
#[derive(Clone, Debug, PartialEq)]
pub struct Var {
    pub name: String,
    pub shape: Shape,
    pub value: Tensor,
    pub id: u32,
    pub precision: u32,
}

impl Var {
    /// The single element of a scalar Var, if this Var is scalar-shaped.
    pub fn as_scalar(&self) -> Option<f64> {
        self.value.as_scalar()
    }
}
