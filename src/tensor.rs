//! Dense numeric values exchanged between Vars, Ports, and channels.
//!
//! [`Tensor`] is a row-major buffer of `f64` with an attached [`Shape`]. It is
//! deliberately small: the framework core only needs construction, shape
//! checks, broadcasting for Var initialization, and element-wise addition for
//! the reduce path. The declared element type of a Var or Port stays in
//! [`DType`](crate::types::DType) metadata.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Shape;

/// Shape-level failures raised while materializing or combining values.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum ShapeError {
    #[error("cannot broadcast value of shape {from} to {to}")]
    #[diagnostic(
        code(procmesh::tensor::broadcast),
        help("aligned trailing axes must be equal, or the source axis must be 1")
    )]
    Broadcast { from: Shape, to: Shape },

    #[error("{got} elements do not fill shape {shape}")]
    #[diagnostic(code(procmesh::tensor::element_count))]
    ElementCount { shape: Shape, got: usize },

    #[error("element-wise combine over mismatched shapes {left} and {right}")]
    #[diagnostic(code(procmesh::tensor::mismatch))]
    Mismatch { left: Shape, right: Shape },
}

/// A dense row-major value with a shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    shape: Shape,
    data: Vec<f64>,
}

impl Tensor {
    /// A `(1,)`-shaped value holding one element.
    pub fn scalar(value: f64) -> Self {
        Tensor {
            shape: Shape::scalar(),
            data: vec![value],
        }
    }

    /// A value of the given shape with every element set to `value`.
    pub fn filled(shape: Shape, value: f64) -> Self {
        let data = vec![value; shape.num_elements()];
        Tensor { shape, data }
    }

    pub fn zeros(shape: Shape) -> Self {
        Self::filled(shape, 0.0)
    }

    /// Wrap an existing row-major buffer, checking the element count.
    pub fn from_vec(shape: Shape, data: Vec<f64>) -> Result<Self, ShapeError> {
        if data.len() != shape.num_elements() {
            return Err(ShapeError::ElementCount {
                shape,
                got: data.len(),
            });
        }
        Ok(Tensor { shape, data })
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// The single element of a one-element value, if this is one.
    pub fn as_scalar(&self) -> Option<f64> {
        if self.shape.is_scalar() {
            self.data.first().copied()
        } else {
            None
        }
    }

    /// Broadcast this value to `target` using trailing-axis alignment: each
    /// aligned source axis must equal the target axis or be 1, and missing
    /// leading axes replicate.
    pub fn broadcast_to(&self, target: &Shape) -> Result<Tensor, ShapeError> {
        if &self.shape == target {
            return Ok(self.clone());
        }
        let src = self.shape.dims();
        let dst = target.dims();
        if src.len() > dst.len() {
            return Err(ShapeError::Broadcast {
                from: self.shape.clone(),
                to: target.clone(),
            });
        }
        let offset = dst.len() - src.len();
        for (i, &s) in src.iter().enumerate() {
            if s != dst[offset + i] && s != 1 {
                return Err(ShapeError::Broadcast {
                    from: self.shape.clone(),
                    to: target.clone(),
                });
            }
        }

        // Row-major strides over the source, zeroed on replicated axes.
        let mut strides = vec![0usize; dst.len()];
        let mut acc = 1usize;
        for i in (0..src.len()).rev() {
            if src[i] != 1 {
                strides[offset + i] = acc;
            }
            acc *= src[i];
        }

        let mut out = Vec::with_capacity(target.num_elements());
        let mut idx = vec![0usize; dst.len()];
        for _ in 0..target.num_elements() {
            let flat: usize = idx.iter().zip(&strides).map(|(i, s)| i * s).sum();
            out.push(self.data[flat]);
            for ax in (0..dst.len()).rev() {
                idx[ax] += 1;
                if idx[ax] < dst[ax] {
                    break;
                }
                idx[ax] = 0;
            }
        }
        Ok(Tensor {
            shape: target.clone(),
            data: out,
        })
    }

    /// Element-wise addition over identical shapes.
    pub fn add(&self, rhs: &Tensor) -> Result<Tensor, ShapeError> {
        if self.shape != rhs.shape {
            return Err(ShapeError::Mismatch {
                left: self.shape.clone(),
                right: rhs.shape.clone(),
            });
        }
        let data = self
            .data
            .iter()
            .zip(&rhs.data)
            .map(|(a, b)| a + b)
            .collect();
        Ok(Tensor {
            shape: self.shape.clone(),
            data,
        })
    }
}
