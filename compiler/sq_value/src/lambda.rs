//! Function values.
//!
//! A builtin lambda is a stable registry name plus its overloads; the bundle
//! codec stores only the name and looks the overloads up again when
//! deserializing. A user lambda is a compiled body plus the values it
//! captured when it was created.

use std::fmt;
use std::sync::Arc;

use sq_dist::{DistRng, Env};
use sq_ir::Expression;

use crate::{Domain, ErrorMessage, EvalError, Value, ValueKind};

/// What a builtin may ask of the running evaluator.
pub trait Context {
    fn env(&self) -> &Env;
    /// The run's environment together with its random stream.
    fn sampler(&mut self) -> (&Env, &mut DistRng);
    /// Call any lambda, user-defined or builtin.
    fn call(&mut self, lambda: &Lambda, args: Vec<Value>) -> Result<Value, EvalError>;
}

pub type BuiltinFn = fn(&[Value], &mut dyn Context) -> Result<Value, EvalError>;

/// Argument type accepted by one builtin overload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrType {
    Any,
    Number,
    String,
    Bool,
    Date,
    Duration,
    Dist,
    /// A distribution or a number (numbers act as point masses).
    DistOrNumber,
    Array(Box<FrType>),
    Dict,
    Lambda,
    Domain,
    Scale,
    Input,
    /// May be omitted when trailing.
    Optional(Box<FrType>),
}

impl FrType {
    pub fn check(&self, value: &Value) -> bool {
        match (self, value.kind()) {
            (FrType::Any, _)
            | (FrType::Number, ValueKind::Number(_))
            | (FrType::String, ValueKind::String(_))
            | (FrType::Bool, ValueKind::Bool(_))
            | (FrType::Date, ValueKind::Date(_))
            | (FrType::Duration, ValueKind::Duration(_))
            | (FrType::Dist, ValueKind::Dist(_))
            | (FrType::DistOrNumber, ValueKind::Dist(_) | ValueKind::Number(_))
            | (FrType::Dict, ValueKind::Dict(_))
            | (FrType::Lambda, ValueKind::Lambda(_))
            | (FrType::Domain, ValueKind::Domain(_))
            | (FrType::Scale, ValueKind::Scale(_))
            | (FrType::Input, ValueKind::Input(_)) => true,
            (FrType::Array(item), ValueKind::Array(items)) => items.iter().all(|v| item.check(v)),
            (FrType::Optional(inner), _) => inner.check(value),
            _ => false,
        }
    }

    fn is_optional(&self) -> bool {
        matches!(self, FrType::Optional(_))
    }
}

impl fmt::Display for FrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrType::Any => f.write_str("any"),
            FrType::Number => f.write_str("Number"),
            FrType::String => f.write_str("String"),
            FrType::Bool => f.write_str("Bool"),
            FrType::Date => f.write_str("Date"),
            FrType::Duration => f.write_str("Duration"),
            FrType::Dist => f.write_str("Dist"),
            FrType::DistOrNumber => f.write_str("Dist|Number"),
            FrType::Array(item) => write!(f, "List({item})"),
            FrType::Dict => f.write_str("Dict"),
            FrType::Lambda => f.write_str("Function"),
            FrType::Domain => f.write_str("Domain"),
            FrType::Scale => f.write_str("Scale"),
            FrType::Input => f.write_str("Input"),
            FrType::Optional(inner) => write!(f, "{inner}?"),
        }
    }
}

/// One overload of a builtin.
#[derive(Clone)]
pub struct FnDefinition {
    inputs: Vec<FrType>,
    rest: Option<FrType>,
    run: BuiltinFn,
}

impl FnDefinition {
    pub fn new(inputs: Vec<FrType>, run: BuiltinFn) -> Self {
        FnDefinition {
            inputs,
            rest: None,
            run,
        }
    }

    /// `inputs` followed by any number of `rest` arguments.
    pub fn variadic(inputs: Vec<FrType>, rest: FrType, run: BuiltinFn) -> Self {
        FnDefinition {
            inputs,
            rest: Some(rest),
            run,
        }
    }

    pub fn inputs(&self) -> &[FrType] {
        &self.inputs
    }

    pub fn run(&self) -> BuiltinFn {
        self.run
    }

    /// Argument count, when it cannot vary.
    pub fn fixed_arity(&self) -> Option<usize> {
        if self.rest.is_some() || self.inputs.iter().any(FrType::is_optional) {
            None
        } else {
            Some(self.inputs.len())
        }
    }

    pub fn matches(&self, args: &[Value]) -> bool {
        let required = self.inputs.iter().filter(|t| !t.is_optional()).count();
        if args.len() < required {
            return false;
        }
        if args.len() > self.inputs.len() && self.rest.is_none() {
            return false;
        }
        args.iter().enumerate().all(|(i, arg)| match self.inputs.get(i) {
            Some(input) => input.check(arg),
            None => self.rest.as_ref().is_some_and(|rest| rest.check(arg)),
        })
    }

    pub fn signature(&self, name: &str) -> String {
        let mut parts: Vec<String> = self.inputs.iter().map(ToString::to_string).collect();
        if let Some(rest) = &self.rest {
            parts.push(format!("...{rest}"));
        }
        format!("{name}({})", parts.join(", "))
    }
}

impl fmt::Debug for FnDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnDefinition")
            .field("inputs", &self.inputs)
            .field("rest", &self.rest)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct BuiltinLambda {
    name: String,
    definitions: Arc<[FnDefinition]>,
    is_decorator: bool,
}

impl BuiltinLambda {
    pub fn new(name: impl Into<String>, definitions: Vec<FnDefinition>) -> Self {
        BuiltinLambda {
            name: name.into(),
            definitions: definitions.into(),
            is_decorator: false,
        }
    }

    /// Marks the builtin as usable with `@name` decorator syntax.
    #[must_use]
    pub fn decorator(mut self) -> Self {
        self.is_decorator = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn definitions(&self) -> &[FnDefinition] {
        &self.definitions
    }

    pub fn is_decorator(&self) -> bool {
        self.is_decorator
    }

    /// Shared arity of every overload, when they agree.
    pub fn fixed_arity(&self) -> Option<usize> {
        let first = self.definitions.first()?.fixed_arity()?;
        self.definitions
            .iter()
            .all(|d| d.fixed_arity() == Some(first))
            .then_some(first)
    }

    /// Run the first overload whose inputs accept `args`.
    pub fn call(&self, args: &[Value], context: &mut dyn Context) -> Result<Value, EvalError> {
        if let Some(definition) = self.definitions.iter().find(|d| d.matches(args)) {
            return (definition.run)(args, context);
        }
        if let Some(expected) = self.fixed_arity() {
            if expected != args.len() {
                return Err(ErrorMessage::Arity {
                    expected,
                    got: args.len(),
                }
                .into());
            }
        }
        let signatures: Vec<String> = self
            .definitions
            .iter()
            .map(|d| format!("  {}", d.signature(&self.name)))
            .collect();
        let given: Vec<&str> = args.iter().map(Value::type_name).collect();
        Err(EvalError::other(format!(
            "There are function matches for {}(), but with different arguments:\n{}\nWas given arguments: ({})",
            self.name,
            signatures.join("\n"),
            given.join(", ")
        )))
    }
}

/// Builtins are identified by name; overloads are looked up again on
/// deserialization.
impl PartialEq for BuiltinLambda {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.is_decorator == other.is_decorator
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LambdaParameter {
    pub name: String,
    pub domain: Option<Domain>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UserLambda {
    pub name: Option<String>,
    pub parameters: Vec<LambdaParameter>,
    pub body: Arc<Expression>,
    pub captures: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Lambda {
    Builtin(BuiltinLambda),
    User(UserLambda),
}

impl Lambda {
    pub fn name(&self) -> Option<&str> {
        match self {
            Lambda::Builtin(b) => Some(b.name()),
            Lambda::User(u) => u.name.as_deref(),
        }
    }

    /// Name used in stack traces.
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or("<anonymous>")
    }

    pub fn parameter_count(&self) -> Option<usize> {
        match self {
            Lambda::Builtin(b) => b.fixed_arity(),
            Lambda::User(u) => Some(u.parameters.len()),
        }
    }
}

impl fmt::Display for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lambda::Builtin(b) => write!(f, "[builtin {}]", b.name()),
            Lambda::User(u) => {
                let names: Vec<&str> = u.parameters.iter().map(|p| p.name.as_str()).collect();
                write!(f, "({}) => internal code", names.join(","))
            }
        }
    }
}
