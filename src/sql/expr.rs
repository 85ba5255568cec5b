//! Filter and projection expression trees handed over by the parser.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sql::datum::Datum;
use crate::types::ColumnId;

/// Comparison operators that can appear in a filter.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `IN`
    In,
    /// `NOT IN`
    NotIn,
}

impl ComparisonOp {
    /// Operator to use when the operands are swapped (`c < x` ⇔ `x > c`).
    pub fn commute(self) -> Self {
        match self {
            ComparisonOp::Lt => ComparisonOp::Gt,
            ComparisonOp::Le => ComparisonOp::Ge,
            ComparisonOp::Gt => ComparisonOp::Lt,
            ComparisonOp::Ge => ComparisonOp::Le,
            other => other,
        }
    }

    /// SQL spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Like => "LIKE",
            ComparisonOp::NotLike => "NOT LIKE",
            ComparisonOp::In => "IN",
            ComparisonOp::NotIn => "NOT IN",
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arithmetic and string operators.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Mult,
    /// `/`
    Div,
    /// `||`
    Concat,
}

impl BinaryOp {
    /// SQL spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Mult => "*",
            BinaryOp::Div => "/",
            BinaryOp::Concat => "||",
        }
    }
}

/// Expression node.
///
/// The analyzer dispatches on the boolean connectives, comparisons and
/// `BETWEEN`; every other variant is opaque to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// Conjunction.
    And {
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Disjunction.
    Or {
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Negation.
    Not {
        /// Negated operand.
        expr: Box<Expr>,
    },
    /// Parenthesized sub-expression.
    Paren {
        /// Wrapped expression.
        expr: Box<Expr>,
    },
    /// Binary comparison.
    Comparison {
        /// Operator.
        op: ComparisonOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `expr [NOT] BETWEEN from AND to`.
    Range {
        /// Whether the condition is negated.
        not: bool,
        /// Tested expression.
        expr: Box<Expr>,
        /// Lower end (inclusive).
        from: Box<Expr>,
        /// Upper end (inclusive).
        to: Box<Expr>,
    },
    /// Reference to the current row's value for a column.
    Column {
        /// Catalog identifier of the column.
        id: ColumnId,
        /// Column name, kept for display.
        name: String,
    },
    /// Literal value.
    Literal {
        /// The value.
        value: Datum,
    },
    /// Arithmetic or string operator.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Unary minus.
    Neg {
        /// Operand.
        expr: Box<Expr>,
    },
    /// Parenthesized list, e.g. the right side of `IN`.
    Tuple {
        /// List items.
        items: Vec<Expr>,
    },
    /// Function call.
    Func {
        /// Function name.
        name: String,
        /// Call arguments.
        args: Vec<Expr>,
    },
}

impl Expr {
    /// `left AND right`.
    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// `left OR right`.
    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// `NOT expr`.
    pub fn not(expr: Expr) -> Self {
        Expr::Not {
            expr: Box::new(expr),
        }
    }

    /// `(expr)`.
    pub fn paren(expr: Expr) -> Self {
        Expr::Paren {
            expr: Box::new(expr),
        }
    }

    /// `left op right`.
    pub fn cmp(op: ComparisonOp, left: Expr, right: Expr) -> Self {
        Expr::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// `left = right`.
    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::cmp(ComparisonOp::Eq, left, right)
    }

    /// `left < right`.
    pub fn lt(left: Expr, right: Expr) -> Self {
        Self::cmp(ComparisonOp::Lt, left, right)
    }

    /// `left <= right`.
    pub fn le(left: Expr, right: Expr) -> Self {
        Self::cmp(ComparisonOp::Le, left, right)
    }

    /// `left > right`.
    pub fn gt(left: Expr, right: Expr) -> Self {
        Self::cmp(ComparisonOp::Gt, left, right)
    }

    /// `left >= right`.
    pub fn ge(left: Expr, right: Expr) -> Self {
        Self::cmp(ComparisonOp::Ge, left, right)
    }

    /// `expr BETWEEN from AND to`.
    pub fn between(expr: Expr, from: Expr, to: Expr) -> Self {
        Expr::Range {
            not: false,
            expr: Box::new(expr),
            from: Box::new(from),
            to: Box::new(to),
        }
    }

    /// `expr NOT BETWEEN from AND to`.
    pub fn not_between(expr: Expr, from: Expr, to: Expr) -> Self {
        Expr::Range {
            not: true,
            expr: Box::new(expr),
            from: Box::new(from),
            to: Box::new(to),
        }
    }

    /// Column reference.
    pub fn column(id: ColumnId, name: impl Into<String>) -> Self {
        Expr::Column {
            id,
            name: name.into(),
        }
    }

    /// Literal value.
    pub fn lit(value: impl Into<Datum>) -> Self {
        Expr::Literal {
            value: value.into(),
        }
    }

    /// `left op right` for arithmetic and string operators.
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Visits this node and every descendant in pre-order.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        f(self);
        match self {
            Expr::And { left, right }
            | Expr::Or { left, right }
            | Expr::Comparison { left, right, .. }
            | Expr::Binary { left, right, .. } => {
                left.walk(f);
                right.walk(f);
            }
            Expr::Not { expr } | Expr::Paren { expr } | Expr::Neg { expr } => expr.walk(f),
            Expr::Range { expr, from, to, .. } => {
                expr.walk(f);
                from.walk(f);
                to.walk(f);
            }
            Expr::Tuple { items } => items.iter().for_each(|item| item.walk(f)),
            Expr::Func { args, .. } => args.iter().for_each(|arg| arg.walk(f)),
            Expr::Column { .. } | Expr::Literal { .. } => {}
        }
    }

    /// Returns true if no column reference appears anywhere in the tree.
    pub fn is_const(&self) -> bool {
        let mut found = false;
        self.walk(&mut |node| {
            if matches!(node, Expr::Column { .. }) {
                found = true;
            }
        });
        !found
    }

    /// Adds every referenced column id to `out`.
    pub fn collect_columns(&self, out: &mut BTreeSet<ColumnId>) {
        self.walk(&mut |node| {
            if let Expr::Column { id, .. } = node {
                out.insert(*id);
            }
        });
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::And { left, right } => write!(f, "{left} AND {right}"),
            Expr::Or { left, right } => write!(f, "{left} OR {right}"),
            Expr::Not { expr } => write!(f, "NOT {expr}"),
            Expr::Paren { expr } => write!(f, "({expr})"),
            Expr::Comparison { op, left, right } => write!(f, "{left} {op} {right}"),
            Expr::Range {
                not,
                expr,
                from,
                to,
            } => {
                let kw = if *not { "NOT BETWEEN" } else { "BETWEEN" };
                write!(f, "{expr} {kw} {from} AND {to}")
            }
            Expr::Column { name, .. } => f.write_str(name),
            Expr::Literal { value } => write!(f, "{value}"),
            Expr::Binary { op, left, right } => write!(f, "{left} {} {right}", op.as_str()),
            Expr::Neg { expr } => write!(f, "-{expr}"),
            Expr::Tuple { items } => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Expr::Func { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}
