//! Arithmetic operations over numbers, shared by every combination strategy.

use serde::{Deserialize, Serialize};

use crate::OperationError;

/// Binary operation between two random variables (or a variable and a
/// number).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgebraicOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Logarithm,
}

impl AlgebraicOperation {
    pub fn apply(self, a: f64, b: f64) -> Result<f64, OperationError> {
        match self {
            AlgebraicOperation::Add => Ok(a + b),
            AlgebraicOperation::Subtract => Ok(a - b),
            AlgebraicOperation::Multiply => Ok(a * b),
            AlgebraicOperation::Divide => {
                if b == 0.0 {
                    Err(OperationError::DivisionByZero)
                } else {
                    Ok(a / b)
                }
            }
            AlgebraicOperation::Power => power(a, b),
            AlgebraicOperation::Logarithm => logarithm(a, b),
        }
    }

    /// The matching convolution, for operations that have one.
    pub fn as_convolution(self) -> Option<ConvolutionOperation> {
        match self {
            AlgebraicOperation::Add => Some(ConvolutionOperation::Add),
            AlgebraicOperation::Subtract => Some(ConvolutionOperation::Subtract),
            AlgebraicOperation::Multiply => Some(ConvolutionOperation::Multiply),
            _ => None,
        }
    }

    /// The matching scale operation, used when the right operand is a
    /// number and the combination is pointwise.
    pub fn as_scale(self) -> Option<ScaleOperation> {
        match self {
            AlgebraicOperation::Multiply => Some(ScaleOperation::Multiply),
            AlgebraicOperation::Divide => Some(ScaleOperation::Divide),
            AlgebraicOperation::Power => Some(ScaleOperation::Power),
            AlgebraicOperation::Logarithm => Some(ScaleOperation::Logarithm),
            AlgebraicOperation::Add | AlgebraicOperation::Subtract => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AlgebraicOperation::Add => "add",
            AlgebraicOperation::Subtract => "subtract",
            AlgebraicOperation::Multiply => "multiply",
            AlgebraicOperation::Divide => "divide",
            AlgebraicOperation::Power => "pow",
            AlgebraicOperation::Logarithm => "log",
        }
    }
}

/// Operations numeric convolution supports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConvolutionOperation {
    Add,
    Subtract,
    Multiply,
}

impl ConvolutionOperation {
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            ConvolutionOperation::Add => a + b,
            ConvolutionOperation::Subtract => a - b,
            ConvolutionOperation::Multiply => a * b,
        }
    }
}

/// Operations applied to every y value of a point set with a fixed number.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScaleOperation {
    Multiply,
    Divide,
    Power,
    Logarithm,
}

impl ScaleOperation {
    pub fn apply(self, y: f64, factor: f64) -> Result<f64, OperationError> {
        match self {
            ScaleOperation::Multiply => Ok(y * factor),
            ScaleOperation::Divide => AlgebraicOperation::Divide.apply(y, factor),
            ScaleOperation::Power => power(y, factor),
            ScaleOperation::Logarithm => logarithm(y, factor),
        }
    }

    /// New integral sum after scaling, when it is known without integrating.
    pub fn integral_sum(self, sum: f64, factor: f64) -> Option<f64> {
        match self {
            ScaleOperation::Multiply => Some(sum * factor),
            ScaleOperation::Divide if factor != 0.0 => Some(sum / factor),
            _ => None,
        }
    }
}

fn power(a: f64, b: f64) -> Result<f64, OperationError> {
    if a < 0.0 && b.fract() != 0.0 {
        return Err(OperationError::ComplexNumber);
    }
    Ok(a.powf(b))
}

fn logarithm(a: f64, base: f64) -> Result<f64, OperationError> {
    if a < 0.0 || base <= 0.0 {
        return Err(OperationError::ComplexNumber);
    }
    if base == 1.0 {
        return Err(OperationError::DivisionByZero);
    }
    if a == 0.0 {
        return Err(OperationError::NegativeInfinity);
    }
    Ok(a.ln() / base.ln())
}
