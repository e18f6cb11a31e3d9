//! Unit-type inference for `::` annotations.
//!
//! Every binding gets an unknown unit type. Annotations, products, quotients
//! and the operators that need matching units (`+`, `-`, `to`, comparisons)
//! contribute constraints of the form "this product of variables and units
//! is dimensionless". The constraints form a linear system over the
//! exponents, which is solved by Gauss-Jordan elimination. A row whose
//! variables all cancel but whose units don't is a conflict.
//!
//! Anything the checker doesn't understand (literals, calls, powers) is
//! unconstrained, so programs without annotations never fail here.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use sq_ir::{format_number, InfixOp, NodeKind, Span, SyntaxNode, UnaryOp, UnitOp};

use crate::CompileError;

const EPSILON: f64 = 1e-9;

/// A product of variable and unit powers.
#[derive(Clone, Default, Debug)]
struct Product {
    vars: BTreeMap<usize, f64>,
    units: BTreeMap<String, f64>,
}

impl Product {
    fn var(id: usize) -> Self {
        let mut product = Product::default();
        product.vars.insert(id, 1.0);
        product
    }

    fn unit(name: &str) -> Self {
        let mut product = Product::default();
        product.units.insert(name.to_string(), 1.0);
        product
    }

    fn is_empty(&self) -> bool {
        self.vars.is_empty() && self.units.is_empty()
    }

    fn add_scaled(mut self, other: &Product, factor: f64) -> Self {
        for (&id, power) in &other.vars {
            add_power(&mut self.vars, id, power * factor);
        }
        for (name, power) in &other.units {
            add_power(&mut self.units, name.clone(), power * factor);
        }
        self
    }

    fn scaled(&self, factor: f64) -> Self {
        Product::default().add_scaled(self, factor)
    }
}

fn add_power<K: Ord>(powers: &mut BTreeMap<K, f64>, key: K, delta: f64) {
    let power = powers.entry(key).or_insert(0.0);
    *power += delta;
    if power.abs() < EPSILON {
        powers.retain(|_, p| p.abs() >= EPSILON);
    }
}

/// `None` is an unconstrained type; any combination with it stays unconstrained.
type UnitType = Option<Product>;

fn multiply(lhs: UnitType, rhs: UnitType) -> UnitType {
    Some(lhs?.add_scaled(&rhs?, 1.0))
}

fn divide(lhs: UnitType, rhs: UnitType) -> UnitType {
    Some(lhs?.add_scaled(&rhs?, -1.0))
}

/// Render unit powers as `a * b^2 / c`.
fn render<'a>(powers: impl IntoIterator<Item = (&'a str, f64)>) -> String {
    let mut entries: Vec<(&str, f64)> = powers.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    let term = |(name, power): &(&str, f64)| {
        if (power.abs() - 1.0).abs() < EPSILON {
            (*name).to_string()
        } else {
            format!("{name}^{}", format_number(power.abs()))
        }
    };
    let positive: Vec<String> = entries.iter().filter(|e| e.1 > 0.0).map(term).collect();
    let negative: Vec<String> = entries.iter().filter(|e| e.1 < 0.0).map(term).collect();
    let mut out = if positive.is_empty() {
        "1".to_string()
    } else {
        positive.join(" * ")
    };
    if !negative.is_empty() {
        out.push_str(" / ");
        out.push_str(&negative.join(" / "));
    }
    out
}

/// The unit type inferred for a binding.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct InferredUnit {
    pub name: String,
    pub span: Span,
    /// Rendered like `meters / seconds`; `1` for a dimensionless value.
    pub unit: String,
}

/// Unit types of every `let` binding the constraints fully determine.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct UnitTypes {
    bindings: Vec<InferredUnit>,
}

impl UnitTypes {
    /// The type of the last binding named `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|b| b.name == name)
            .map(|b| b.unit.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &InferredUnit> {
        self.bindings.iter()
    }
}

struct Variable {
    name: String,
    span: Span,
    /// Only `let` bindings are reported; parameters and function results
    /// are internal unknowns.
    reported: bool,
}

#[derive(Default)]
struct Checker {
    /// `None` marks a name bound to a function, which has no unit type.
    scopes: Vec<FxHashMap<String, Option<usize>>>,
    variables: Vec<Variable>,
    constraints: Vec<(Product, Span)>,
}

/// Check unit annotations across `ast` and infer the unit of each binding.
#[tracing::instrument(level = "debug", skip_all)]
pub fn check_unit_types(ast: &SyntaxNode) -> Result<UnitTypes, CompileError> {
    let mut checker = Checker::default();
    checker.visit(ast);
    if checker.constraints.is_empty() {
        return Ok(UnitTypes::default());
    }
    checker.solve()
}

impl Checker {
    /// A new unknown that no name refers to.
    fn fresh(&mut self, name: &str, span: Span, reported: bool) -> usize {
        self.variables.push(Variable {
            name: name.to_string(),
            span,
            reported,
        });
        self.variables.len() - 1
    }

    fn declare(&mut self, name: &str, span: Span, reported: bool) -> usize {
        let id = self.fresh(name, span, reported);
        self.bind(name, Some(id));
        id
    }

    fn bind(&mut self, name: &str, id: Option<usize>) {
        if self.scopes.is_empty() {
            self.scopes.push(FxHashMap::default());
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), id);
        }
    }

    fn lookup(&self, name: &str) -> Option<usize> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .copied()
            .flatten()
    }

    fn require(&mut self, constraint: UnitType, span: Span) {
        if let Some(product) = constraint {
            if !product.is_empty() {
                self.constraints.push((product, span));
            }
        }
    }

    fn require_same(&mut self, lhs: &UnitType, rhs: &UnitType, span: Span) {
        self.require(divide(lhs.clone(), rhs.clone()), span);
    }

    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.scopes.push(FxHashMap::default());
        let result = f(self);
        self.scopes.pop();
        result
    }

    fn visit_all(&mut self, nodes: &[SyntaxNode]) {
        for node in nodes {
            self.visit(node);
        }
    }

    fn visit(&mut self, node: &SyntaxNode) -> UnitType {
        match &node.kind {
            NodeKind::Program {
                statements, result, ..
            } => self.scoped(|this| {
                this.visit_all(statements);
                if let Some(result) = result {
                    this.visit(result);
                }
                None
            }),
            NodeKind::Block { statements, result } => self.scoped(|this| {
                this.visit_all(statements);
                this.visit(result)
            }),
            NodeKind::LetStatement {
                variable,
                unit_type,
                value,
                ..
            } => {
                let value = self.visit(value);
                let id = self.declare(&variable.name, variable.span, true);
                let var = Some(Product::var(id));
                if let Some(signature) = unit_type {
                    let signature = annotation(signature);
                    self.require_same(&var, &signature, node.span);
                }
                self.require_same(&var, &value, node.span);
                None
            }
            NodeKind::DefunStatement {
                variable, value, ..
            } => {
                // Bound first so recursive calls see a function.
                self.bind(&variable.name, None);
                self.visit(value);
                None
            }
            NodeKind::Lambda {
                args,
                body,
                return_unit,
                ..
            } => self.scoped(|this| {
                for arg in args {
                    let id = this.declare(&arg.variable.name, arg.span, false);
                    if let Some(signature) = &arg.unit_type {
                        let signature = annotation(signature);
                        this.require_same(&Some(Product::var(id)), &signature, arg.span);
                    }
                }
                let result = Some(Product::var(this.fresh("<result>", body.span, false)));
                let body_type = this.visit(body);
                this.require_same(&result, &body_type, body.span);
                if let Some(unit) = return_unit {
                    this.require_same(&result, &annotation(unit), unit.span);
                }
                None
            }),
            NodeKind::Identifier(name) => self.lookup(name).map(Product::var),
            NodeKind::InfixCall { op, lhs, rhs } => {
                let lhs = self.visit(lhs);
                let rhs = self.visit(rhs);
                match op {
                    InfixOp::Multiply | InfixOp::DotMultiply => multiply(lhs, rhs),
                    InfixOp::Divide | InfixOp::DotDivide => divide(lhs, rhs),
                    InfixOp::Add
                    | InfixOp::Subtract
                    | InfixOp::DotAdd
                    | InfixOp::DotSubtract
                    | InfixOp::To => {
                        self.require_same(&lhs, &rhs, node.span);
                        lhs.or(rhs)
                    }
                    InfixOp::Equal
                    | InfixOp::NotEqual
                    | InfixOp::Less
                    | InfixOp::LessEq
                    | InfixOp::Greater
                    | InfixOp::GreaterEq => {
                        self.require_same(&lhs, &rhs, node.span);
                        None
                    }
                    InfixOp::Power | InfixOp::DotPower | InfixOp::And | InfixOp::Or => None,
                }
            }
            NodeKind::UnaryCall { op, arg } => {
                let arg = self.visit(arg);
                match op {
                    UnaryOp::Minus => arg,
                    UnaryOp::Not => None,
                }
            }
            NodeKind::Call { func, args } => {
                self.visit(func);
                self.visit_all(args);
                None
            }
            NodeKind::Pipe {
                left,
                func,
                right_args,
            } => {
                self.visit(left);
                self.visit(func);
                self.visit_all(right_args);
                None
            }
            NodeKind::DotLookup { arg, .. } => {
                self.visit(arg);
                None
            }
            NodeKind::BracketLookup { arg, key } => {
                self.visit(arg);
                self.visit(key);
                None
            }
            NodeKind::Array(elements) | NodeKind::Dict(elements) => {
                self.visit_all(elements);
                None
            }
            NodeKind::KeyValue { key, value } => {
                self.visit(key);
                self.visit(value);
                None
            }
            NodeKind::Ternary {
                condition,
                true_expr,
                false_expr,
                ..
            } => {
                self.visit(condition);
                self.visit(true_expr);
                self.visit(false_expr);
                None
            }
            NodeKind::UnitValue { value, .. } => {
                self.visit(value);
                None
            }
            NodeKind::Float(_)
            | NodeKind::String(_)
            | NodeKind::Boolean(_)
            | NodeKind::UnitName(_)
            | NodeKind::ExponentialUnitType { .. }
            | NodeKind::InfixUnitType { .. } => None,
        }
    }

    /// Gauss-Jordan elimination with variables as columns on the left and
    /// unit names on the right.
    fn solve(&self) -> Result<UnitTypes, CompileError> {
        let mut unit_names: Vec<&str> = self
            .constraints
            .iter()
            .flat_map(|(product, _)| product.units.keys().map(String::as_str))
            .collect();
        unit_names.sort_unstable();
        unit_names.dedup();
        let unit_column: FxHashMap<&str, usize> = unit_names
            .iter()
            .enumerate()
            .map(|(i, name)| (*name, i))
            .collect();

        let mut rows: Vec<Row> = self
            .constraints
            .iter()
            .enumerate()
            .map(|(i, (product, _))| {
                let mut vars = vec![0.0; self.variables.len()];
                for (&id, &power) in &product.vars {
                    vars[id] = power;
                }
                let mut units = vec![0.0; unit_names.len()];
                for (name, &power) in &product.units {
                    if let Some(&column) = unit_column.get(name.as_str()) {
                        units[column] = power;
                    }
                }
                Row {
                    vars,
                    units,
                    sources: vec![i],
                }
            })
            .collect();

        let mut pivots = Vec::new();
        for column in 0..self.variables.len() {
            let next = pivots.len();
            let Some(best) = (next..rows.len()).max_by(|&a, &b| {
                rows[a].vars[column]
                    .abs()
                    .total_cmp(&rows[b].vars[column].abs())
            }) else {
                break;
            };
            if rows[best].vars[column].abs() < EPSILON {
                continue;
            }
            rows.swap(next, best);
            let pivot = rows[next].clone().scaled(1.0 / rows[next].vars[column]);
            for (i, row) in rows.iter_mut().enumerate() {
                let factor = row.vars[column];
                if i != next && factor.abs() >= EPSILON {
                    row.subtract(&pivot, factor);
                }
            }
            rows[next] = pivot;
            pivots.push(column);
        }

        if let Some(conflict) = rows[pivots.len()..]
            .iter()
            .find(|row| row.units.iter().any(|u| u.abs() >= EPSILON))
        {
            return Err(self.conflict(conflict));
        }

        let mut bindings = Vec::new();
        for (row, &column) in rows.iter().zip(&pivots) {
            let variable = &self.variables[column];
            let determined = row
                .vars
                .iter()
                .enumerate()
                .all(|(i, v)| i == column || v.abs() < EPSILON);
            if !variable.reported || !determined {
                continue;
            }
            // The row reads `var + units = 0`.
            let unit = render(
                unit_names
                    .iter()
                    .zip(&row.units)
                    .filter(|(_, p)| p.abs() >= EPSILON)
                    .map(|(name, p)| (*name, -p)),
            );
            bindings.push(InferredUnit {
                name: variable.name.clone(),
                span: variable.span,
                unit,
            });
        }
        bindings.sort_by_key(|b| b.span.start);
        Ok(UnitTypes { bindings })
    }

    fn conflict(&self, row: &Row) -> CompileError {
        let sources = &row.sources;
        let conflicts = sources
            .iter()
            .map(|&i| {
                let (product, _) = &self.constraints[i];
                format!("{} :: {}", self.render_vars(product), render_units(product))
            })
            .collect();
        // Reported where the last contributing constraint was introduced.
        let span = sources
            .last()
            .map_or(Span::DUMMY, |&i| self.constraints[i].1);
        CompileError::ConflictingUnitTypes { conflicts, span }
    }

    fn render_vars(&self, product: &Product) -> String {
        if product.vars.is_empty() {
            return "<unitless>".to_string();
        }
        render(
            product
                .vars
                .iter()
                .map(|(&id, &p)| (self.variables[id].name.as_str(), p)),
        )
    }
}

fn render_units(product: &Product) -> String {
    if product.units.is_empty() {
        return "<unitless>".to_string();
    }
    render(product.units.iter().map(|(name, &p)| (name.as_str(), -p)))
}

#[derive(Clone)]
struct Row {
    vars: Vec<f64>,
    units: Vec<f64>,
    /// Constraints combined into this row.
    sources: Vec<usize>,
}

impl Row {
    fn scaled(mut self, factor: f64) -> Self {
        for v in self.vars.iter_mut().chain(self.units.iter_mut()) {
            *v *= factor;
        }
        self
    }

    fn subtract(&mut self, pivot: &Row, factor: f64) {
        for (v, p) in self.vars.iter_mut().zip(&pivot.vars) {
            *v -= factor * p;
        }
        for (u, p) in self.units.iter_mut().zip(&pivot.units) {
            *u -= factor * p;
        }
        self.sources.extend_from_slice(&pivot.sources);
        self.sources.sort_unstable();
        self.sources.dedup();
    }
}

/// The unit type an annotation spells out.
fn annotation(node: &SyntaxNode) -> UnitType {
    match &node.kind {
        NodeKind::UnitName(name) => Some(Product::unit(name)),
        NodeKind::ExponentialUnitType { base, exponent } => {
            annotation(base).map(|base| base.scaled(exponent.get()))
        }
        NodeKind::InfixUnitType { op, lhs, rhs } => match op {
            UnitOp::Multiply => multiply(annotation(lhs), annotation(rhs)),
            UnitOp::Divide => divide(annotation(lhs), annotation(rhs)),
        },
        NodeKind::Float(_) => Some(Product::default()),
        _ => None,
    }
}
