//! The interpreter loop.
//!
//! Bindings live on a single value stack. `Assign` pushes, a block truncates
//! back to its starting height when it finishes, and a call pushes its
//! arguments into a fresh region above the caller's bindings. Intermediate
//! results are never pushed, so the compiler's stack offsets count bindings
//! only.

use std::mem;

use sq_dist::{DistRng, Env};
use sq_ir::{CallKind, CaptureSource, ExprKind, Expression, LambdaExpr, Literal, ProgramExpr, Span};
use sq_stack::{ensure_sufficient_stack, DepthLimit};
use sq_value::{
    Context, Domain, ErrorMessage, EvalError, ExportData, Lambda, LambdaParameter, Location,
    StackFrame, StackTrace, UserLambda, Value, ValueMap, ValueTags,
};

use crate::Registry;

/// Nested user calls allowed before `StackOverflow`.
pub const MAX_CALL_DEPTH: usize = 10_000;

/// Innermost frames kept in a captured trace.
const MAX_TRACE_FRAMES: usize = 20;

/// What a program evaluates to.
#[derive(Clone, Debug, PartialEq)]
pub struct RunOutput {
    pub result: Value,
    /// Top-level bindings, latest definition per name.
    pub bindings: ValueMap,
    /// The exported subset of `bindings`, tagged with their provenance.
    pub exports: ValueMap,
}

struct Frame {
    name: String,
    location: Option<Location>,
}

pub struct Reducer<'r> {
    env: Env,
    rng: DistRng,
    registry: &'r Registry,
    source_id: String,
    stack: Vec<Value>,
    frames: Vec<Frame>,
    /// Captures of the lambda currently executing.
    captures: Vec<Value>,
    externals: ValueMap,
    depth: DepthLimit,
}

impl<'r> Reducer<'r> {
    pub fn new(env: Env, registry: &'r Registry) -> Self {
        let rng = env.rng();
        Reducer {
            env,
            rng,
            registry,
            source_id: "main".to_string(),
            stack: Vec::new(),
            frames: Vec::new(),
            captures: Vec::new(),
            externals: ValueMap::new(),
            depth: DepthLimit::new(MAX_CALL_DEPTH),
        }
    }

    /// Module name recorded in locations, traces and export tags.
    #[must_use]
    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = source_id.into();
        self
    }

    /// Evaluate a compiled program. `externals` is a dict of the values the
    /// program's imports are bound to.
    #[tracing::instrument(level = "debug", skip_all, fields(source_id = %self.source_id))]
    pub fn evaluate_program(
        &mut self,
        expression: &Expression,
        externals: &Value,
    ) -> Result<RunOutput, EvalError> {
        self.externals = match externals.as_dict() {
            Some(map) => map.clone(),
            None if externals.is_void() => ValueMap::new(),
            None => {
                return Err(ErrorMessage::ExpectedType {
                    expected: "Dict".to_string(),
                    got: externals.type_name().to_string(),
                }
                .into())
            }
        };
        let base = self.stack.len();
        let output = match &expression.kind {
            ExprKind::Program(program) => self.run_program(program, base),
            _ => self.evaluate(expression).map(|result| RunOutput {
                result,
                bindings: ValueMap::new(),
                exports: ValueMap::new(),
            }),
        };
        self.stack.truncate(base);
        if let Ok(output) = &output {
            tracing::debug!(
                bindings = output.bindings.len(),
                exports = output.exports.len(),
                "evaluated program"
            );
        }
        output
    }

    fn run_program(&mut self, program: &ProgramExpr, base: usize) -> Result<RunOutput, EvalError> {
        for statement in &program.statements {
            self.evaluate(statement)?;
        }
        let result = match &program.result {
            Some(result) => self.evaluate(result)?,
            None => Value::void(),
        };

        let mut bindings = ValueMap::new();
        for (name, slot) in &program.bindings {
            if let Some(value) = self.stack.get(base + slot) {
                bindings.insert(name.clone(), value.clone());
            }
        }
        let mut exports = ValueMap::new();
        for name in &program.exports {
            if let Some(value) = bindings.get(name) {
                let tags = ValueTags {
                    export_data: Some(ExportData {
                        source_id: self.source_id.clone(),
                        path: vec![name.clone()],
                    }),
                    ..ValueTags::default()
                };
                exports.insert(name.clone(), value.with_tags(&tags));
            }
        }
        Ok(RunOutput {
            result,
            bindings,
            exports,
        })
    }

    fn evaluate(&mut self, expression: &Expression) -> Result<Value, EvalError> {
        ensure_sufficient_stack(|| self.evaluate_inner(expression))
    }

    fn evaluate_inner(&mut self, expression: &Expression) -> Result<Value, EvalError> {
        match &expression.kind {
            ExprKind::Program(program) => {
                let base = self.stack.len();
                let output = self.run_program(program, base);
                self.stack.truncate(base);
                output.map(|o| o.result)
            }
            ExprKind::Block(expressions) => {
                let base = self.stack.len();
                let mut result = Ok(Value::void());
                for expression in expressions {
                    result = self.evaluate(expression);
                    if result.is_err() {
                        break;
                    }
                }
                self.stack.truncate(base);
                result
            }
            ExprKind::StackRef(offset) => self.stack_ref(*offset),
            ExprKind::CaptureRef(index) => self.capture_ref(*index),
            ExprKind::Builtin(name) => self.registry.get(name).cloned().ok_or_else(|| {
                self.raise(ErrorMessage::SymbolNotFound(name.clone()), expression.span)
            }),
            ExprKind::External(name) => self.external(name),
            ExprKind::Assign { right, .. } => {
                let value = self.evaluate(right)?;
                self.stack.push(value);
                Ok(Value::void())
            }
            ExprKind::Call { func, args, kind } => {
                let callee = self.evaluate(func)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.evaluate(arg)?);
                }
                self.call_value(&callee, values, *kind, expression.span)
            }
            ExprKind::Lambda(lambda) => self.make_lambda(lambda),
            ExprKind::Ternary {
                condition,
                if_true,
                if_false,
            } => {
                let condition = self.evaluate(condition)?;
                match condition.as_bool() {
                    Some(true) => self.evaluate(if_true),
                    Some(false) => self.evaluate(if_false),
                    None => Err(self.raise(
                        ErrorMessage::ExpectedType {
                            expected: "Boolean".to_string(),
                            got: condition.type_name().to_string(),
                        },
                        expression.span,
                    )),
                }
            }
            ExprKind::Array(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element)?);
                }
                Ok(Value::array(values))
            }
            ExprKind::Dict(pairs) => {
                let mut map = ValueMap::with_capacity(pairs.len());
                for (key_expr, value) in pairs {
                    let key = self.evaluate(key_expr)?;
                    let Some(key) = key.as_str() else {
                        return Err(self.raise(
                            ErrorMessage::ExpectedType {
                                expected: "String".to_string(),
                                got: key.type_name().to_string(),
                            },
                            key_expr.span,
                        ));
                    };
                    let key = key.to_string();
                    let value = self.evaluate(value)?;
                    map.insert(key, value);
                }
                Ok(Value::dict(map))
            }
            ExprKind::Literal(literal) => Ok(match literal {
                Literal::Number(n) => Value::number(n.get()),
                Literal::String(s) => Value::string(s.as_str()),
                Literal::Bool(b) => Value::bool(*b),
                Literal::Void => Value::void(),
            }),
        }
    }

    fn stack_ref(&self, offset: usize) -> Result<Value, EvalError> {
        self.stack
            .len()
            .checked_sub(offset + 1)
            .and_then(|index| self.stack.get(index))
            .cloned()
            .ok_or_else(|| EvalError::other(format!("Stack reference {offset} out of range")))
    }

    fn capture_ref(&self, index: usize) -> Result<Value, EvalError> {
        self.captures
            .get(index)
            .cloned()
            .ok_or_else(|| EvalError::other(format!("Capture {index} out of range")))
    }

    fn external(&self, name: &str) -> Result<Value, EvalError> {
        self.externals
            .get(name)
            .cloned()
            .ok_or_else(|| ErrorMessage::SymbolNotFound(name.to_string()).into())
    }

    /// Annotations are evaluated now, in the defining scope, and captures
    /// are copied out of the current stack.
    fn make_lambda(&mut self, lambda: &LambdaExpr) -> Result<Value, EvalError> {
        let mut parameters = Vec::with_capacity(lambda.parameters.len());
        for parameter in &lambda.parameters {
            let domain = match &parameter.annotation {
                Some(annotation) => {
                    let value = self.evaluate(annotation)?;
                    Some(Domain::from_annotation(&value)?)
                }
                None => None,
            };
            parameters.push(LambdaParameter {
                name: parameter.name.clone(),
                domain,
            });
        }
        let mut captures = Vec::with_capacity(lambda.captures.len());
        for source in &lambda.captures {
            let value = match source {
                CaptureSource::StackRef(offset) => self.stack_ref(*offset)?,
                CaptureSource::CaptureRef(index) => self.capture_ref(*index)?,
                CaptureSource::External(name) => self.external(name)?,
            };
            captures.push(value);
        }
        Ok(Value::lambda(Lambda::User(UserLambda {
            name: lambda.name.clone(),
            parameters,
            body: lambda.body.clone(),
            captures,
        })))
    }

    fn call_value(
        &mut self,
        callee: &Value,
        args: Vec<Value>,
        kind: CallKind,
        span: Span,
    ) -> Result<Value, EvalError> {
        let Some(lambda) = callee.as_lambda() else {
            return Err(self.raise(ErrorMessage::NotAFunction(callee.to_string()), span));
        };
        if kind == CallKind::Decorate {
            let is_decorator = matches!(lambda, Lambda::Builtin(b) if b.is_decorator());
            if !is_decorator {
                return Err(self.raise(ErrorMessage::NotADecorator(callee.to_string()), span));
            }
        }
        self.call_lambda(lambda, args, Some(self.location(span)))
    }

    fn call_lambda(
        &mut self,
        lambda: &Lambda,
        args: Vec<Value>,
        location: Option<Location>,
    ) -> Result<Value, EvalError> {
        self.frames.push(Frame {
            name: lambda.display_name().to_string(),
            location,
        });
        let result = match self.depth.enter() {
            Ok(()) => {
                let result = match lambda {
                    Lambda::Builtin(builtin) => builtin.call(&args, self),
                    Lambda::User(user) => self.call_user(user, args),
                };
                self.depth.exit();
                result
            }
            Err(exceeded) => Err(ErrorMessage::StackOverflow {
                limit: exceeded.limit,
            }
            .into()),
        };
        let result = result.map_err(|err| err.with_trace_if_missing(|| self.trace()));
        self.frames.pop();
        result
    }

    fn call_user(&mut self, lambda: &UserLambda, args: Vec<Value>) -> Result<Value, EvalError> {
        if args.len() != lambda.parameters.len() {
            return Err(ErrorMessage::Arity {
                expected: lambda.parameters.len(),
                got: args.len(),
            }
            .into());
        }
        for (parameter, arg) in lambda.parameters.iter().zip(&args) {
            if let Some(domain) = &parameter.domain {
                domain.validate(&parameter.name, arg)?;
            }
        }

        let base = self.stack.len();
        self.stack.extend(args);
        let saved = mem::replace(&mut self.captures, lambda.captures.clone());
        let result = self.evaluate(&lambda.body);
        self.captures = saved;
        self.stack.truncate(base);
        result
    }

    fn location(&self, span: Span) -> Location {
        Location {
            source_id: self.source_id.clone(),
            span,
        }
    }

    /// An error thrown by the reducer itself. Its first frame is the throw
    /// site inside the innermost active function (`<top>` outside any call).
    fn raise(&self, message: ErrorMessage, span: Span) -> EvalError {
        let name = self.frames.last().map_or("<top>", |frame| frame.name.as_str());
        let mut frames = vec![StackFrame {
            name: name.to_string(),
            location: Some(self.location(span)),
        }];
        frames.extend(self.trace().frames().iter().take(MAX_TRACE_FRAMES - 1).cloned());
        EvalError {
            message,
            trace: StackTrace::new(frames),
        }
    }

    /// The active call frames, innermost first.
    fn trace(&self) -> StackTrace {
        StackTrace::new(
            self.frames
                .iter()
                .rev()
                .take(MAX_TRACE_FRAMES)
                .map(|frame| StackFrame {
                    name: frame.name.clone(),
                    location: frame.location.clone(),
                })
                .collect(),
        )
    }
}

impl Context for Reducer<'_> {
    fn env(&self) -> &Env {
        &self.env
    }

    fn sampler(&mut self) -> (&Env, &mut DistRng) {
        (&self.env, &mut self.rng)
    }

    fn call(&mut self, lambda: &Lambda, args: Vec<Value>) -> Result<Value, EvalError> {
        self.call_lambda(lambda, args, None)
    }
}
