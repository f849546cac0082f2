use std::collections::HashMap;

use evalexpr::{ContextWithMutableVariables, DefaultNumericTypes, HashMapContext, Node, Value};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{FitError, FitResult};

/// The closed variable namespace a formula is evaluated against.
///
/// A scope holds named numeric variables supplied by the caller, plus the
/// constants `pi` and `e`. Nothing else is reachable from inside a formula:
/// the evaluation context is rebuilt from the scope for every evaluation and
/// contains no other bindings. The only callables are evalexpr's built-in
/// math functions (`math::sqrt`, `math::pow`, `math::sin`, `floor`, `ceil`,
/// `min`, `max`, ...).
#[derive(Debug, Clone)]
pub struct EvalScope {
    vars: HashMap<String, f32>,
}

impl EvalScope {
    pub fn new() -> Self {
        let mut vars = HashMap::new();
        vars.insert("pi".to_string(), std::f32::consts::PI);
        vars.insert("e".to_string(), std::f32::consts::E);
        Self { vars }
    }

    /// Builder-style variable insertion.
    pub fn with_var(mut self, name: &str, value: f32) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: f32) {
        self.vars.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.vars.get(name).copied()
    }

    pub(crate) fn to_context(&self) -> HashMapContext {
        let mut context = HashMapContext::new();
        for (name, value) in self.vars.iter() {
            let _ = context.set_value(name.clone(), Value::Float(*value as f64));
        }
        context
    }
}

impl Default for EvalScope {
    fn default() -> Self {
        Self::new()
    }
}

/// A mathematical formula that can be evaluated to calculate an attribute value.
///
/// Formulas are defined as strings (e.g., `"2 + math::sqrt(ship_mass / 1000)"`)
/// and are compiled into an internal representation for efficient evaluation.
/// They can reference variables from an [`EvalScope`] and nothing else.
#[derive(Debug, Clone)]
pub struct Expression {
    pub(crate) definition: String,
    pub(crate) compiled: Node<DefaultNumericTypes>,
}

impl Expression {
    /// Creates a new `Expression` by parsing and compiling an expression string.
    ///
    /// Returns `Err(FitError)` if the expression string is invalid.
    pub fn new(expression: &str) -> FitResult<Self> {
        let compiled = evalexpr::build_operator_tree(expression)
            .map_err(|err| FitError::ExpressionError {
                expression: expression.to_string(),
                details: err.to_string(),
            })?;

        Ok(Self {
            definition: expression.to_string(),
            compiled,
        })
    }

    /// The source string this expression was compiled from.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Evaluates the expression against a scope.
    ///
    /// Any failure — an undefined name, a call outside the math whitelist, a
    /// division error — collapses to 0.0. Callers treat 0 as "could not
    /// compute"; evaluation never raises past this boundary.
    pub fn evaluate(&self, scope: &EvalScope) -> f32 {
        self.try_evaluate(scope).unwrap_or_else(|err| {
            log::warn!("{}", err);
            0.0
        })
    }

    /// Fallible evaluation that uses the compiled expression without reparsing.
    pub fn try_evaluate(&self, scope: &EvalScope) -> FitResult<f32> {
        let context = scope.to_context();

        let eval_value = self
            .compiled
            .eval_with_context(&context)
            .map_err(|e| FitError::ExpressionError {
                expression: self.definition.clone(),
                details: e.to_string(),
            })?;

        eval_value
            .as_number()
            .map(|n| n as f32)
            .map_err(|e| FitError::ExpressionError {
                expression: self.definition.clone(),
                details: e.to_string(),
            })
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.definition == other.definition
    }
}

/// A declared attribute value: either a plain number or a formula evaluated
/// at recalculation time.
///
/// Declarations write `"mass": 40.0` or `"mass": "20 * math::sqrt(ship_mass / 1000)"`;
/// the distinction is resolved once at load time, not re-sniffed at every read.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Literal(f32),
    Formula(Expression),
}

impl AttributeValue {
    /// Resolves the attribute against a scope. Formulas that cannot be
    /// computed resolve to 0.0.
    pub fn resolve(&self, scope: &EvalScope) -> f32 {
        match self {
            AttributeValue::Literal(value) => *value,
            AttributeValue::Formula(expr) => expr.evaluate(scope),
        }
    }

    /// The literal value, or 0.0 for a formula that has not been evaluated
    /// yet. Used to seed provisional attributes at construction.
    pub fn literal_or_zero(&self) -> f32 {
        match self {
            AttributeValue::Literal(value) => *value,
            AttributeValue::Formula(_) => 0.0,
        }
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, AttributeValue::Formula(_))
    }
}

impl Default for AttributeValue {
    fn default() -> Self {
        Self::Literal(0.0)
    }
}

impl From<f32> for AttributeValue {
    fn from(value: f32) -> Self {
        Self::Literal(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        match Expression::new(value) {
            Ok(expr) => Self::Formula(expr),
            Err(err) => {
                log::warn!("{}", err);
                Self::Literal(0.0)
            }
        }
    }
}

/// Deserialize `AttributeValue` from floats, integers, or formula strings.
impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AttributeValueVisitor;

        impl<'de> Visitor<'de> for AttributeValueVisitor {
            type Value = AttributeValue;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "a float, integer, or string containing a formula")
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(AttributeValue::Literal(value as f32))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(AttributeValue::Literal(value as f32))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(AttributeValue::Literal(value as f32))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                // A formula that fails to compile degrades to 0.0 so one bad
                // content entry cannot abort the whole load.
                Ok(AttributeValue::from(value))
            }
        }

        deserializer.deserialize_any(AttributeValueVisitor)
    }
}

impl Serialize for AttributeValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            AttributeValue::Literal(value) => serializer.serialize_f32(*value),
            AttributeValue::Formula(expr) => serializer.serialize_str(&expr.definition),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_and_formula_resolve() {
        let scope = EvalScope::new().with_var("ship_mass", 4000.0);

        let literal = AttributeValue::from(12.5);
        assert_eq!(literal.resolve(&scope), 12.5);

        let formula = AttributeValue::from("10 * math::sqrt(ship_mass / 1000)");
        assert!(formula.is_formula());
        assert_eq!(formula.resolve(&scope), 20.0);
    }

    #[test]
    fn undefined_name_evaluates_to_zero() {
        let expr = Expression::new("missing + 2").expect("expression should compile");
        assert_eq!(expr.evaluate(&EvalScope::new()), 0.0);
    }

    #[test]
    fn malformed_formula_degrades_to_zero_literal() {
        let value = AttributeValue::from("2 +* 3");
        assert_eq!(value, AttributeValue::Literal(0.0));
    }

    #[test]
    fn constants_are_in_scope() {
        let expr = Expression::new("math::cos(pi)").unwrap();
        let result = expr.evaluate(&EvalScope::new());
        assert!((result - -1.0).abs() < 1e-6);
    }
}
