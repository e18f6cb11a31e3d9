//! Runtime values for the Squiggle engine.
//!
//! [`Value`] is the interpreter's universe: scalars, containers, lambdas,
//! distributions and the presentation types the standard library builds.
//! Runtime failures are [`EvalError`]s, a message plus the stack trace
//! captured when the error first crossed a call site.

mod domain;
mod error;
mod heap;
mod lambda;
mod plot;
mod tags;
mod value;

pub use domain::Domain;
pub use error::{ErrorMessage, EvalError, StackFrame, StackTrace};
pub use heap::Heap;
pub use lambda::{
    BuiltinFn, BuiltinLambda, Context, FnDefinition, FrType, Lambda, LambdaParameter, UserLambda,
};
pub use plot::{
    Calculator, Input, InputKind, LabeledDist, Plot, Scale, ScaleKind, TableChart, TableColumn,
};
pub use tags::{ExportData, Location, ValueTags};
pub use value::{
    Value, ValueKind, ValueMap, MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND, MS_PER_YEAR,
};

pub use sq_dist::{Dist, DistRng, Env};
