//! Constant folding and column type compatibility.

use thiserror::Error;

use crate::sql::catalog::ColumnDescriptor;
use crate::sql::datum::{ColumnType, Datum};
use crate::sql::expr::{BinaryOp, Expr};

/// Failure to fold an expression into a single datum.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// The expression reads a row value.
    #[error("column '{name}' is not a constant")]
    ColumnReference {
        /// Referenced column.
        name: String,
    },
    /// The expression kind cannot be folded.
    #[error("cannot evaluate {kind} as a scalar constant")]
    Unsupported {
        /// Offending node kind.
        kind: &'static str,
    },
    /// Operand types do not fit the operator.
    #[error("unsupported operand types for {op}: {left} and {right}")]
    OperandTypes {
        /// Operator spelling.
        op: &'static str,
        /// Left operand type.
        left: &'static str,
        /// Right operand type.
        right: &'static str,
    },
    /// Integer arithmetic overflowed.
    #[error("integer out of range")]
    Overflow,
    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,
}

/// Value does not fit the column's declared type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("value type {found} doesn't match type {expected} of column '{column}'")]
pub struct ConvertError {
    /// Column the value was checked against.
    pub column: String,
    /// Declared column type.
    pub expected: ColumnType,
    /// Type of the supplied value.
    pub found: &'static str,
}

/// Folds constant sub-expressions into datums.
pub trait ConstEvaluator {
    /// Evaluates `expr`, which must not reference any column.
    fn evaluate(&self, expr: &Expr) -> Result<Datum, EvalError>;
}

/// Evaluator covering literals, unary minus, arithmetic and concatenation.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultEvaluator;

impl ConstEvaluator for DefaultEvaluator {
    fn evaluate(&self, expr: &Expr) -> Result<Datum, EvalError> {
        match expr {
            Expr::Literal { value } => Ok(value.clone()),
            Expr::Paren { expr } => self.evaluate(expr),
            Expr::Neg { expr } => match self.evaluate(expr)? {
                Datum::Null => Ok(Datum::Null),
                Datum::Int(v) => v.checked_neg().map(Datum::Int).ok_or(EvalError::Overflow),
                Datum::Float(v) => Ok(Datum::Float(-v)),
                other => Err(EvalError::OperandTypes {
                    op: "-",
                    left: other.type_name(),
                    right: other.type_name(),
                }),
            },
            Expr::Binary { op, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                eval_binary(*op, left, right)
            }
            Expr::Column { name, .. } => Err(EvalError::ColumnReference { name: name.clone() }),
            Expr::Tuple { .. } => Err(EvalError::Unsupported { kind: "tuple" }),
            Expr::Func { .. } => Err(EvalError::Unsupported { kind: "function call" }),
            Expr::And { .. }
            | Expr::Or { .. }
            | Expr::Not { .. }
            | Expr::Comparison { .. }
            | Expr::Range { .. } => Err(EvalError::Unsupported { kind: "predicate" }),
        }
    }
}

fn eval_binary(op: BinaryOp, left: Datum, right: Datum) -> Result<Datum, EvalError> {
    match (op, left, right) {
        (_, Datum::Null, _) | (_, _, Datum::Null) => Ok(Datum::Null),
        (BinaryOp::Plus, Datum::Int(a), Datum::Int(b)) => {
            a.checked_add(b).map(Datum::Int).ok_or(EvalError::Overflow)
        }
        (BinaryOp::Minus, Datum::Int(a), Datum::Int(b)) => {
            a.checked_sub(b).map(Datum::Int).ok_or(EvalError::Overflow)
        }
        (BinaryOp::Mult, Datum::Int(a), Datum::Int(b)) => {
            a.checked_mul(b).map(Datum::Int).ok_or(EvalError::Overflow)
        }
        (BinaryOp::Div, Datum::Int(_), Datum::Int(0)) => Err(EvalError::DivisionByZero),
        (BinaryOp::Div, Datum::Int(a), Datum::Int(b)) => {
            a.checked_div(b).map(Datum::Int).ok_or(EvalError::Overflow)
        }
        (BinaryOp::Plus, Datum::Float(a), Datum::Float(b)) => Ok(Datum::Float(a + b)),
        (BinaryOp::Minus, Datum::Float(a), Datum::Float(b)) => Ok(Datum::Float(a - b)),
        (BinaryOp::Mult, Datum::Float(a), Datum::Float(b)) => Ok(Datum::Float(a * b)),
        (BinaryOp::Div, Datum::Float(_), Datum::Float(b)) if b == 0.0 => {
            Err(EvalError::DivisionByZero)
        }
        (BinaryOp::Div, Datum::Float(a), Datum::Float(b)) => Ok(Datum::Float(a / b)),
        (BinaryOp::Concat, Datum::String(a), Datum::String(b)) => Ok(Datum::String(a + &b)),
        (BinaryOp::Concat, Datum::Bytes(mut a), Datum::Bytes(b)) => {
            a.extend_from_slice(&b);
            Ok(Datum::Bytes(a))
        }
        (op, left, right) => Err(EvalError::OperandTypes {
            op: op.as_str(),
            left: left.type_name(),
            right: right.type_name(),
        }),
    }
}

/// Checks that `datum` can be stored in `column`, returning the value as the
/// column would encode it.
///
/// NULL fits every column and integers widen to FLOAT.
pub fn convert(column: &ColumnDescriptor, datum: Datum) -> Result<Datum, ConvertError> {
    match (column.ty, datum) {
        (_, Datum::Null) => Ok(Datum::Null),
        (ColumnType::Bool, d @ Datum::Bool(_))
        | (ColumnType::Int, d @ Datum::Int(_))
        | (ColumnType::Float, d @ Datum::Float(_))
        | (ColumnType::String, d @ Datum::String(_))
        | (ColumnType::Bytes, d @ Datum::Bytes(_)) => Ok(d),
        (ColumnType::Float, Datum::Int(v)) => Ok(Datum::Float(v as f64)),
        (expected, other) => Err(ConvertError {
            column: column.name.clone(),
            expected,
            found: other.type_name(),
        }),
    }
}
