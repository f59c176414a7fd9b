//! Arithmetic utility tools.
//!
//! A small calculator toolset the agent can call for exact arithmetic
//! instead of doing math in-context. Each operation is exposed as its own
//! named tool; [`math_tools`] returns the full set.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::{RagError, Result};
use crate::tool::Tool;

/// The arithmetic operation a [`MathTool`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Sqrt,
    Percentage,
    Factorial,
    Max,
    Min,
    Mean,
}

/// Argument shape of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    /// Two operands, `a` and `b`.
    Binary,
    /// One operand, `value`.
    Unary,
    /// A non-empty list, `values`.
    List,
}

impl MathOp {
    fn arity(self) -> Arity {
        match self {
            MathOp::Add
            | MathOp::Subtract
            | MathOp::Multiply
            | MathOp::Divide
            | MathOp::Power
            | MathOp::Percentage => Arity::Binary,
            MathOp::Sqrt | MathOp::Factorial => Arity::Unary,
            MathOp::Max | MathOp::Min | MathOp::Mean => Arity::List,
        }
    }

    fn name(self) -> &'static str {
        match self {
            MathOp::Add => "add_numbers",
            MathOp::Subtract => "subtract_numbers",
            MathOp::Multiply => "multiply_numbers",
            MathOp::Divide => "divide_numbers",
            MathOp::Power => "power_numbers",
            MathOp::Sqrt => "sqrt_number",
            MathOp::Percentage => "percentage_of_total",
            MathOp::Factorial => "factorial_number",
            MathOp::Max => "maximum_value",
            MathOp::Min => "minimum_value",
            MathOp::Mean => "average_value",
        }
    }

    fn description(self) -> &'static str {
        match self {
            MathOp::Add => "Add two numbers (a + b)",
            MathOp::Subtract => "Subtract two numbers (a - b)",
            MathOp::Multiply => "Multiply two numbers (a * b)",
            MathOp::Divide => "Divide two numbers (a / b)",
            MathOp::Power => "Raise a number to a power (a ^ b)",
            MathOp::Sqrt => "Calculate the square root of a number",
            MathOp::Percentage => "Calculate what percentage a is of b",
            MathOp::Factorial => "Calculate the factorial of a non-negative integer (n!)",
            MathOp::Max => "Get the highest value in a list of numbers",
            MathOp::Min => "Get the smallest value in a list of numbers",
            MathOp::Mean => "Calculate the average (mean) of a list of numbers",
        }
    }
}

/// A single arithmetic operation exposed as an agent tool.
pub struct MathTool {
    op: MathOp,
}

impl MathTool {
    /// Create a tool for the given operation.
    pub fn new(op: MathOp) -> Self {
        Self { op }
    }

    fn apply_binary(&self, a: f64, b: f64) -> Result<f64> {
        match self.op {
            MathOp::Add => Ok(a + b),
            MathOp::Subtract => Ok(a - b),
            MathOp::Multiply => Ok(a * b),
            MathOp::Divide => {
                if b == 0.0 {
                    Err(RagError::Tool("division by zero".into()))
                } else {
                    Ok(a / b)
                }
            }
            MathOp::Power => Ok(a.powf(b)),
            MathOp::Percentage => {
                if b == 0.0 {
                    Err(RagError::Tool("total must not be zero".into()))
                } else {
                    Ok(a / b * 100.0)
                }
            }
            _ => unreachable!("not a binary op"),
        }
    }

    fn apply_list(&self, values: &[f64]) -> Result<f64> {
        if values.is_empty() {
            return Err(RagError::Tool("'values' must not be empty".into()));
        }
        let result = match self.op {
            MathOp::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            MathOp::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            MathOp::Mean => values.iter().sum::<f64>() / values.len() as f64,
            _ => unreachable!("not a list op"),
        };
        Ok(result)
    }
}

fn factorial(n: u64) -> Result<u128> {
    let mut acc: u128 = 1;
    for i in 2..=u128::from(n) {
        acc = acc
            .checked_mul(i)
            .ok_or_else(|| RagError::Tool(format!("factorial of {n} overflows")))?;
    }
    Ok(acc)
}

fn require_f64(args: &Value, key: &str) -> Result<f64> {
    args.get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| RagError::Tool(format!("missing or invalid '{key}' parameter")))
}

#[async_trait]
impl Tool for MathTool {
    fn name(&self) -> &str {
        self.op.name()
    }

    fn description(&self) -> &str {
        self.op.description()
    }

    fn parameters_schema(&self) -> Option<Value> {
        let schema = match self.op.arity() {
            Arity::Binary => json!({
                "type": "object",
                "properties": {
                    "a": { "type": "number", "description": "The first number" },
                    "b": { "type": "number", "description": "The second number" }
                },
                "required": ["a", "b"]
            }),
            Arity::Unary if self.op == MathOp::Factorial => json!({
                "type": "object",
                "properties": {
                    "n": { "type": "integer", "description": "A non-negative integer" }
                },
                "required": ["n"]
            }),
            Arity::Unary => json!({
                "type": "object",
                "properties": {
                    "value": { "type": "number", "description": "The input number" }
                },
                "required": ["value"]
            }),
            Arity::List => json!({
                "type": "object",
                "properties": {
                    "values": {
                        "type": "array",
                        "items": { "type": "number" },
                        "description": "The list of numbers"
                    }
                },
                "required": ["values"]
            }),
        };
        Some(schema)
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let result = match (self.op, self.op.arity()) {
            (MathOp::Factorial, _) => {
                let n = args
                    .get("n")
                    .and_then(|v| v.as_u64())
                    .ok_or_else(|| {
                        RagError::Tool("'n' must be a non-negative integer".into())
                    })?;
                return Ok(json!({ "result": factorial(n)?.to_string() }));
            }
            (MathOp::Sqrt, _) => {
                let value = require_f64(&args, "value")?;
                if value < 0.0 {
                    return Err(RagError::Tool(
                        "cannot take the square root of a negative number".into(),
                    ));
                }
                value.sqrt()
            }
            (_, Arity::Binary) => {
                let a = require_f64(&args, "a")?;
                let b = require_f64(&args, "b")?;
                self.apply_binary(a, b)?
            }
            (_, Arity::List) => {
                let values: Vec<f64> = args
                    .get("values")
                    .and_then(|v| v.as_array())
                    .map(|arr| arr.iter().filter_map(|v| v.as_f64()).collect())
                    .ok_or_else(|| RagError::Tool("missing or invalid 'values' parameter".into()))?;
                self.apply_list(&values)?
            }
            _ => unreachable!("unary ops handled above"),
        };

        Ok(json!({ "result": result }))
    }
}

/// The full arithmetic toolset.
pub fn math_tools() -> Vec<Arc<dyn Tool>> {
    [
        MathOp::Add,
        MathOp::Subtract,
        MathOp::Multiply,
        MathOp::Divide,
        MathOp::Power,
        MathOp::Sqrt,
        MathOp::Percentage,
        MathOp::Factorial,
        MathOp::Max,
        MathOp::Min,
        MathOp::Mean,
    ]
    .into_iter()
    .map(|op| Arc::new(MathTool::new(op)) as Arc<dyn Tool>)
    .collect()
}
