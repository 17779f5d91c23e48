//! Combination strategies for input ports fed by multiple producers.
//!
//! When more than one channel endpoint is bound to the same input port, each
//! step delivers one frame per endpoint and the port folds them into a single
//! value with its [`ReduceOp`]. Strategies must be commutative and
//! associative so the folded result does not depend on arrival order.

use crate::tensor::{ShapeError, Tensor};

/// A commutative, associative fold over per-endpoint frames.
pub trait ReduceOp: Send + Sync {
    /// Strategy name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Fold one more frame into the accumulator.
    fn combine(&self, acc: Tensor, frame: &Tensor) -> Result<Tensor, ShapeError>;
}

/// Element-wise addition across producers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReduceSum;

impl ReduceOp for ReduceSum {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn combine(&self, acc: Tensor, frame: &Tensor) -> Result<Tensor, ShapeError> {
        acc.add(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Shape;

    #[test]
    fn sum_is_order_independent() {
        let a = Tensor::from_vec(Shape::from([2]), vec![1.0, 2.0]).unwrap();
        let b = Tensor::from_vec(Shape::from([2]), vec![10.0, 20.0]).unwrap();
        let ab = ReduceSum.combine(a.clone(), &b).unwrap();
        let ba = ReduceSum.combine(b, &a).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.data(), &[11.0, 22.0]);
    }

    #[test]
    fn sum_rejects_mismatched_shapes() {
        let a = Tensor::scalar(1.0);
        let b = Tensor::zeros(Shape::from([2]));
        assert!(ReduceSum.combine(a, &b).is_err());
    }
}
