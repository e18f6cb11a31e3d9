//! Distribution errors.

use crate::XyShapeError;

/// Failure of a single numeric operation.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum OperationError {
    #[error("Cannot divide by zero")]
    DivisionByZero,

    #[error("Operation returned complex result")]
    ComplexNumber,

    #[error("Operation returned positive infinity")]
    Infinity,

    #[error("Operation returned negative infinity")]
    NegativeInfinity,

    #[error("PDF is invalid")]
    PdfInvalid,

    #[error("{0}")]
    Other(String),
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum DistError {
    #[error("Function not yet implemented")]
    NotYetImplemented,

    #[error("Unreachable")]
    Unreachable,

    #[error("Distribution vertical shift is invalid")]
    DistributionVerticalShiftIsInvalid,

    #[error("Too few samples when constructing sample set")]
    TooFewSamples,

    #[error("Too few samples when converting to point set")]
    TooFewSamplesForConversionToPointSet,

    #[error("Distributions have non-overlapping support")]
    NonOverlappingSupport,

    #[error("Argument Error: {0}")]
    ArgumentError(String),

    #[error(transparent)]
    OperationError(#[from] OperationError),

    #[error("{0}")]
    Other(String),
}

impl From<XyShapeError> for DistError {
    fn from(err: XyShapeError) -> Self {
        DistError::ArgumentError(err.to_string())
    }
}

pub type DistResult<T> = Result<T, DistError>;
