//! Reduces expressions to literal strings where that needs no outside input.
//!
//! Anything depending on variables, data sources, resources or unsupported
//! functions is [`Evaluation::Unresolved`], which callers skip silently.

use hcl_edit::expr::{Expression, FuncCall, Object, ObjectKey};
use hcl_edit::template::{Element, Template};
use serde_json::{Map, Number, Value};

/// Deepest nesting the evaluator descends into.
pub const MAX_DEPTH: usize = 256;

/// Why an expression has no literal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// Refers to a variable, local, resource or data source.
    Reference,
    /// Calls a function the evaluator does not implement, or with unusable arguments.
    Function(String),
    /// Uses a unary or binary operator.
    Operator,
    /// Is a `for` expression.
    ForExpr,
    /// Contains a template directive.
    Directive,
    /// Conditional whose condition is not a literal bool.
    Condition,
    /// Resolves to a value that is not a string, number or bool.
    NotAString,
}

impl std::fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reference => write!(f, "references a runtime value"),
            Self::Function(name) => write!(f, "calls unsupported function '{name}'"),
            Self::Operator => write!(f, "uses an operator"),
            Self::ForExpr => write!(f, "is a for expression"),
            Self::Directive => write!(f, "contains a template directive"),
            Self::Condition => write!(f, "has a non-literal condition"),
            Self::NotAString => write!(f, "is not a string"),
        }
    }
}

/// Outcome of evaluating an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// The expression has this literal value.
    Literal(String),
    /// The value depends on something outside the configuration text.
    Unresolved(UnresolvedReason),
}

impl Evaluation {
    /// Returns the literal, if any.
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(value) => Some(value),
            Self::Unresolved(_) => None,
        }
    }
}

/// Faults of the evaluator itself, as opposed to dynamic values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// Nesting exceeded [`MAX_DEPTH`].
    #[error("Expression nested deeper than {MAX_DEPTH} levels")]
    TooDeep,

    /// A number has no JSON representation.
    #[error("Number {0} cannot be encoded as JSON")]
    NonFiniteNumber(String),

    /// JSON encoding failed.
    #[error("Failed to encode JSON: {0}")]
    Encode(String),
}

enum Skip {
    Unresolved(UnresolvedReason),
    Fault(EvalError),
}

impl From<EvalError> for Skip {
    fn from(e: EvalError) -> Self {
        Self::Fault(e)
    }
}

impl From<UnresolvedReason> for Skip {
    fn from(reason: UnresolvedReason) -> Self {
        Self::Unresolved(reason)
    }
}

/// Evaluates `expr` to a literal string.
///
/// Numbers and bools are rendered the way Terraform converts them to
/// strings. `null`, tuples and objects are [`UnresolvedReason::NotAString`].
///
/// # Errors
///
/// Returns an error only for evaluator faults such as excessive nesting.
pub fn evaluate(expr: &Expression) -> Result<Evaluation, EvalError> {
    match value(expr, 0).and_then(|v| Ok(to_text(v)?)) {
        Ok(text) => Ok(Evaluation::Literal(text)),
        Err(Skip::Unresolved(reason)) => Ok(Evaluation::Unresolved(reason)),
        Err(Skip::Fault(e)) => Err(e),
    }
}

fn to_text(value: Value) -> Result<String, UnresolvedReason> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => Err(UnresolvedReason::NotAString),
    }
}

fn value(expr: &Expression, depth: usize) -> Result<Value, Skip> {
    if depth > MAX_DEPTH {
        return Err(EvalError::TooDeep.into());
    }
    let next = depth + 1;

    match expr {
        Expression::Null(_) => Ok(Value::Null),
        Expression::Bool(b) => Ok(Value::Bool(*b.value())),
        Expression::Number(n) => number(n.value()).map(Value::Number),
        Expression::String(s) => Ok(Value::String(s.value().clone())),
        Expression::Array(array) => array
            .iter()
            .map(|e| value(e, next))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Expression::Object(object) => self::object(object, next).map(Value::Object),
        Expression::StringTemplate(t) => template(t, next).map(Value::String),
        Expression::HeredocTemplate(h) => template(&h.template, next).map(Value::String),
        Expression::Parenthesis(p) => value(p.inner(), next),
        Expression::Conditional(c) => match value(&c.cond_expr, next)? {
            Value::Bool(true) => value(&c.true_expr, next),
            Value::Bool(false) => value(&c.false_expr, next),
            _ => Err(UnresolvedReason::Condition.into()),
        },
        Expression::FuncCall(call) => func_call(call, next),
        Expression::Variable(_) | Expression::Traversal(_) => {
            Err(UnresolvedReason::Reference.into())
        }
        Expression::UnaryOp(_) | Expression::BinaryOp(_) => Err(UnresolvedReason::Operator.into()),
        Expression::ForExpr(_) => Err(UnresolvedReason::ForExpr.into()),
    }
}

fn number(n: &hcl_edit::Number) -> Result<Number, Skip> {
    if let Some(i) = n.as_i64() {
        return Ok(Number::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Number::from(u));
    }
    n.as_f64()
        .and_then(Number::from_f64)
        .ok_or_else(|| EvalError::NonFiniteNumber(n.to_string()).into())
}

fn object(object: &Object, depth: usize) -> Result<Map<String, Value>, Skip> {
    let mut map = Map::new();
    for (key, val) in object.iter() {
        let key = match key {
            ObjectKey::Ident(ident) => ident.as_str().to_string(),
            ObjectKey::Expression(expr) => to_text(value(expr, depth)?)?,
        };
        map.insert(key, value(val.expr(), depth)?);
    }
    Ok(map)
}

fn template(template: &Template, depth: usize) -> Result<String, Skip> {
    let mut out = String::new();
    for element in template.iter() {
        match element {
            Element::Literal(lit) => out.push_str(lit.value()),
            Element::Interpolation(interp) => out.push_str(&to_text(value(&interp.expr, depth)?)?),
            Element::Directive(_) => return Err(UnresolvedReason::Directive.into()),
        }
    }
    Ok(out)
}

fn func_call(call: &FuncCall, depth: usize) -> Result<Value, Skip> {
    let name = call.name.name.as_str();
    let unsupported = || Skip::Unresolved(UnresolvedReason::Function(name.to_string()));

    if !call.name.namespace.is_empty() || call.args.expand_final() {
        return Err(unsupported());
    }

    let args = call
        .args
        .iter()
        .map(|arg| value(arg, depth))
        .collect::<Result<Vec<_>, _>>()?;

    match (name, args.as_slice()) {
        ("jsonencode", [arg]) => serde_json::to_string(arg)
            .map(Value::String)
            .map_err(|e| EvalError::Encode(e.to_string()).into()),
        ("tostring", [arg]) => Ok(Value::String(to_text(arg.clone())?)),
        ("lower", [Value::String(s)]) => Ok(Value::String(s.to_lowercase())),
        ("upper", [Value::String(s)]) => Ok(Value::String(s.to_uppercase())),
        ("trimspace", [Value::String(s)]) => Ok(Value::String(s.trim().to_string())),
        ("join", [Value::String(sep), lists @ ..]) if !lists.is_empty() => {
            let mut parts = Vec::new();
            for list in lists {
                let Value::Array(items) = list else {
                    return Err(unsupported());
                };
                for item in items {
                    parts.push(to_text(item.clone())?);
                }
            }
            Ok(Value::String(parts.join(sep.as_str())))
        }
        _ => Err(unsupported()),
    }
}
