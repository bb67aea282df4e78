//! Scalar evaluation of expressions against a single row.
//!
//! Evaluation follows SQL three-valued logic: comparisons involving NULL are
//! NULL, `AND`/`OR` use Kleene semantics, and a predicate only accepts a row
//! when it evaluates to TRUE.

use std::cmp::Ordering;

use common_error::{QuarryError, QuarryResult};
use quarry_core::{DataType, Row, SessionTimeZone, Value};

use super::{BinaryOp, FuncExpr, LogicalExpr, UnaryOp, builtin};

/// Evaluate `expr` against `row`.
///
/// String values compared against typed values are converted using
/// `time_zone` for temporal types.
pub fn evaluate(expr: &LogicalExpr, row: &Row, time_zone: &SessionTimeZone) -> QuarryResult<Value> {
    Evaluator { row, time_zone }.eval(expr)
}

/// Evaluate `expr` as a filter predicate. NULL and FALSE both reject.
pub fn evaluate_predicate(
    expr: &LogicalExpr,
    row: &Row,
    time_zone: &SessionTimeZone,
) -> QuarryResult<bool> {
    match evaluate(expr, row, time_zone)? {
        Value::Bool(b) => Ok(b),
        Value::Null => Ok(false),
        other => Err(QuarryError::type_error(format!(
            "predicate {expr} evaluated to {}, expected Bool",
            other.type_name()
        ))),
    }
}

struct Evaluator<'a> {
    row: &'a Row,
    time_zone: &'a SessionTimeZone,
}

impl Evaluator<'_> {
    fn eval(&self, expr: &LogicalExpr) -> QuarryResult<Value> {
        match expr {
            LogicalExpr::Literal(v) => Ok(v.clone()),

            LogicalExpr::Column(name) => self
                .row
                .get(name)
                .cloned()
                .ok_or_else(|| QuarryError::ColumnNotFound(name.clone())),

            LogicalExpr::QualifiedColumn { qualifier, name } => self
                .row
                .get(&format!("{qualifier}.{name}"))
                .or_else(|| self.row.get(name))
                .cloned()
                .ok_or_else(|| QuarryError::ColumnNotFound(format!("{qualifier}.{name}"))),

            LogicalExpr::Binary { left, op, right } => match op {
                BinaryOp::And => self.eval_and(left, right),
                BinaryOp::Or => self.eval_or(left, right),
                _ => {
                    let l = self.eval(left)?;
                    let r = self.eval(right)?;
                    self.eval_binary(l, *op, r)
                }
            },

            LogicalExpr::Unary { op, expr } => eval_unary(*op, self.eval(expr)?),

            LogicalExpr::Function(func) => self.eval_function(func),

            LogicalExpr::Cast { expr, data_type } => {
                self.eval(expr)?.cast_to(data_type, self.time_zone)
            }

            LogicalExpr::InList {
                expr,
                list,
                negated,
            } => {
                let needle = self.eval(expr)?;
                let found = self.eval_in_list(&needle, list)?;
                Ok(negate_if(found, *negated))
            }

            LogicalExpr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                let value = self.eval(expr)?;
                let lower = self.eval_binary(self.eval(low)?, BinaryOp::LtEq, value.clone())?;
                let upper = self.eval_binary(value, BinaryOp::LtEq, self.eval(high)?)?;
                let within = kleene_and(as_tristate(&lower)?, as_tristate(&upper)?);
                Ok(negate_if(tristate_value(within), *negated))
            }

            LogicalExpr::Alias { expr, .. } => self.eval(expr),

            LogicalExpr::Wildcard => Err(QuarryError::execution(
                "wildcard cannot be evaluated as a scalar",
            )),

            LogicalExpr::Subquery(_)
            | LogicalExpr::Exists { .. }
            | LogicalExpr::InSubquery { .. } => Err(QuarryError::execution(format!(
                "cannot evaluate subquery expression {expr} against a single row"
            ))),
        }
    }

    fn eval_and(&self, left: &LogicalExpr, right: &LogicalExpr) -> QuarryResult<Value> {
        let l = as_tristate(&self.eval(left)?)?;
        if l == Some(false) {
            return Ok(Value::Bool(false));
        }
        let r = as_tristate(&self.eval(right)?)?;
        Ok(tristate_value(kleene_and(l, r)))
    }

    fn eval_or(&self, left: &LogicalExpr, right: &LogicalExpr) -> QuarryResult<Value> {
        let l = as_tristate(&self.eval(left)?)?;
        if l == Some(true) {
            return Ok(Value::Bool(true));
        }
        let r = as_tristate(&self.eval(right)?)?;
        Ok(tristate_value(kleene_or(l, r)))
    }

    fn eval_in_list(&self, needle: &Value, list: &[LogicalExpr]) -> QuarryResult<Value> {
        if needle.is_null() {
            return Ok(Value::Null);
        }
        let mut saw_null = false;
        for item in list {
            match self.eval_binary(needle.clone(), BinaryOp::Eq, self.eval(item)?)? {
                Value::Bool(true) => return Ok(Value::Bool(true)),
                Value::Null => saw_null = true,
                _ => {}
            }
        }
        Ok(if saw_null {
            Value::Null
        } else {
            Value::Bool(false)
        })
    }

    fn eval_binary(&self, left: Value, op: BinaryOp, right: Value) -> QuarryResult<Value> {
        match op {
            BinaryOp::IsDistinctFrom | BinaryOp::IsNotDistinctFrom => {
                let distinct = match (left.is_null(), right.is_null()) {
                    (true, true) => false,
                    (true, false) | (false, true) => true,
                    (false, false) => {
                        let (l, r) = self.coerce_pair(left, right)?;
                        l.compare(&r) != Some(Ordering::Equal)
                    }
                };
                Ok(Value::Bool(distinct == (op == BinaryOp::IsDistinctFrom)))
            }
            _ if left.is_null() || right.is_null() => Ok(Value::Null),
            op if op.is_comparison() => {
                let (l, r) = self.coerce_pair(left, right)?;
                if l.is_null() || r.is_null() {
                    return Ok(Value::Null);
                }
                let ordering = l.compare(&r).ok_or_else(|| {
                    QuarryError::type_error(format!(
                        "cannot compare {} with {}",
                        l.type_name(),
                        r.type_name()
                    ))
                })?;
                Ok(Value::Bool(comparison_holds(op, ordering)))
            }
            op if op.is_arithmetic() => eval_arithmetic(&left, op, &right),
            BinaryOp::Concat => {
                let l = left.cast_to(&DataType::String, self.time_zone)?;
                let r = right.cast_to(&DataType::String, self.time_zone)?;
                match (l, r) {
                    (Value::String(l), Value::String(r)) => Ok(Value::String(l + &r)),
                    _ => Err(QuarryError::internal("string cast produced a non-string")),
                }
            }
            op => Err(QuarryError::internal(format!(
                "operator {op} reached scalar evaluation"
            ))),
        }
    }

    /// Bring two non-null values to a comparable pair.
    ///
    /// A string that cannot be read as the other side's type becomes NULL.
    fn coerce_pair(&self, left: Value, right: Value) -> QuarryResult<(Value, Value)> {
        let (lt, rt) = (left.data_type(), right.data_type());
        if lt == rt || (lt.is_numeric() && rt.is_numeric()) {
            return Ok((left, right));
        }
        match (&left, &right) {
            (Value::String(_), _) => Ok((self.cast_or_null(&left, &rt), right)),
            (_, Value::String(_)) => Ok((left, self.cast_or_null(&right, &lt))),
            (Value::Date(_), Value::Timestamp(_)) => {
                Ok((left.cast_to(&DataType::Timestamp, self.time_zone)?, right))
            }
            (Value::Timestamp(_), Value::Date(_)) => {
                Ok((left, right.cast_to(&DataType::Timestamp, self.time_zone)?))
            }
            _ => Err(QuarryError::type_error(format!(
                "cannot compare {lt} with {rt}"
            ))),
        }
    }

    fn cast_or_null(&self, value: &Value, target: &DataType) -> Value {
        value
            .cast_to(target, self.time_zone)
            .unwrap_or(Value::Null)
    }

    fn eval_function(&self, func: &FuncExpr) -> QuarryResult<Value> {
        if !func.is_deterministic() {
            return Err(QuarryError::execution(format!(
                "non-deterministic function {} cannot be evaluated here",
                func.name
            )));
        }

        if func.name == builtin::COALESCE {
            for arg in &func.args {
                let value = self.eval(arg)?;
                if !value.is_null() {
                    return Ok(value);
                }
            }
            return Ok(Value::Null);
        }

        let [arg] = func.args.as_slice() else {
            return Err(QuarryError::invalid_parameter(format!(
                "{} expects 1 argument, got {}",
                func.name,
                func.args.len()
            )));
        };
        let value = self.eval(arg)?;
        if value.is_null() {
            return Ok(Value::Null);
        }
        let text = value.cast_to(&DataType::String, self.time_zone)?;
        let text = text.as_str().unwrap_or_default();

        match func.name.as_str() {
            builtin::LOWER => Ok(Value::String(text.to_lowercase())),
            builtin::UPPER => Ok(Value::String(text.to_uppercase())),
            builtin::LENGTH => i64::try_from(text.chars().count())
                .map(Value::Int64)
                .map_err(|_| QuarryError::value_error("string length overflows BIGINT")),
            other => Err(QuarryError::not_implemented(format!("function {other}"))),
        }
    }
}

fn eval_unary(op: UnaryOp, value: Value) -> QuarryResult<Value> {
    match (op, value) {
        (UnaryOp::IsNull, v) => Ok(Value::Bool(v.is_null())),
        (UnaryOp::IsNotNull, v) => Ok(Value::Bool(!v.is_null())),
        (_, Value::Null) => Ok(Value::Null),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Neg, Value::Int64(i)) => i
            .checked_neg()
            .map(Value::Int64)
            .ok_or_else(|| QuarryError::value_error("integer overflow in negation")),
        (UnaryOp::Neg, Value::Float64(f)) => Ok(Value::Float64(-f)),
        (op, v) => Err(QuarryError::type_error(format!(
            "cannot apply {op} to {}",
            v.type_name()
        ))),
    }
}

fn eval_arithmetic(left: &Value, op: BinaryOp, right: &Value) -> QuarryResult<Value> {
    match (left, right) {
        (Value::Int64(l), Value::Int64(r)) => {
            let result = match op {
                BinaryOp::Add => l.checked_add(*r),
                BinaryOp::Subtract => l.checked_sub(*r),
                BinaryOp::Multiply => l.checked_mul(*r),
                BinaryOp::Divide | BinaryOp::Modulo if *r == 0 => return Ok(Value::Null),
                BinaryOp::Divide => l.checked_div(*r),
                BinaryOp::Modulo => l.checked_rem(*r),
                _ => None,
            };
            result
                .map(Value::Int64)
                .ok_or_else(|| QuarryError::value_error(format!("integer overflow in {l} {op} {r}")))
        }
        (l, r) => match (l.as_float64(), r.as_float64()) {
            (Some(l), Some(r)) => Ok(match op {
                BinaryOp::Add => Value::Float64(l + r),
                BinaryOp::Subtract => Value::Float64(l - r),
                BinaryOp::Multiply => Value::Float64(l * r),
                BinaryOp::Divide | BinaryOp::Modulo if r == 0.0 => Value::Null,
                BinaryOp::Divide => Value::Float64(l / r),
                _ => Value::Float64(l % r),
            }),
            _ => Err(QuarryError::type_error(format!(
                "cannot apply {op} to {} and {}",
                l.type_name(),
                r.type_name()
            ))),
        },
    }
}

const fn comparison_holds(op: BinaryOp, ordering: Ordering) -> bool {
    match op {
        BinaryOp::Eq => ordering.is_eq(),
        BinaryOp::NotEq => ordering.is_ne(),
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::LtEq => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        _ => ordering.is_ge(),
    }
}

fn as_tristate(value: &Value) -> QuarryResult<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        other => Err(QuarryError::type_error(format!(
            "expected Bool, got {}",
            other.type_name()
        ))),
    }
}

const fn kleene_and(l: Option<bool>, r: Option<bool>) -> Option<bool> {
    match (l, r) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

const fn kleene_or(l: Option<bool>, r: Option<bool>) -> Option<bool> {
    match (l, r) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

fn tristate_value(value: Option<bool>) -> Value {
    value.map_or(Value::Null, Value::Bool)
}

fn negate_if(value: Value, negated: bool) -> Value {
    match value {
        Value::Bool(b) if negated => Value::Bool(!b),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{col, lit};

    fn utc() -> SessionTimeZone {
        SessionTimeZone::utc()
    }

    fn row() -> Row {
        Row::new()
            .with_value("year", 2020i64)
            .with_value("month", 3i64)
            .with_value("region", "eu")
            .with_value("day", Value::Null)
    }

    #[test]
    fn test_comparisons() {
        let r = row();
        let tz = utc();
        assert!(evaluate_predicate(&col("year").eq(lit(2020i64)), &r, &tz).unwrap());
        assert!(!evaluate_predicate(&col("year").gt(lit(2020i64)), &r, &tz).unwrap());
        assert!(evaluate_predicate(&col("MONTH").lt_eq(lit(3.5)), &r, &tz).unwrap());
    }

    #[test]
    fn test_null_rejects() {
        let r = row();
        let tz = utc();
        let expr = col("day").eq(lit(1i64));
        assert_eq!(evaluate(&expr, &r, &tz).unwrap(), Value::Null);
        assert!(!evaluate_predicate(&expr, &r, &tz).unwrap());
        assert!(!evaluate_predicate(&expr.clone().logical_not(), &r, &tz).unwrap());
        assert!(evaluate_predicate(&col("day").is_null(), &r, &tz).unwrap());
    }

    #[test]
    fn test_kleene_logic() {
        let r = row();
        let tz = utc();
        let unknown = col("day").eq(lit(1i64));
        let truth = col("year").eq(lit(2020i64));
        let falsity = col("year").eq(lit(1999i64));

        assert_eq!(
            evaluate(&unknown.clone().or(truth.clone()), &r, &tz).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            evaluate(&unknown.clone().and(falsity), &r, &tz).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(evaluate(&unknown.and(truth), &r, &tz).unwrap(), Value::Null);
    }

    #[test]
    fn test_in_list_and_between() {
        let r = row();
        let tz = utc();
        let in_list = col("month").in_list(vec![lit(1i64), lit(3i64)]);
        assert!(evaluate_predicate(&in_list, &r, &tz).unwrap());

        let not_in_with_null = col("month").not_in_list(vec![lit(1i64), lit(Value::Null)]);
        assert_eq!(evaluate(&not_in_with_null, &r, &tz).unwrap(), Value::Null);

        let between = col("month").between(lit(1i64), lit(6i64));
        assert!(evaluate_predicate(&between, &r, &tz).unwrap());
    }

    #[test]
    fn test_string_coerces_to_typed_side() {
        let r = row();
        let tz = utc();
        assert!(evaluate_predicate(&col("year").eq(lit("2020")), &r, &tz).unwrap());
        assert_eq!(
            evaluate(&col("year").eq(lit("not a year")), &r, &tz).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_timestamp_respects_time_zone() {
        let tz: SessionTimeZone = "+02:00".parse().unwrap();
        let ts = Value::parse_as("2020-01-01 02:00:00", &DataType::Timestamp, &tz).unwrap();
        let r = Row::new().with_value("hour", ts);

        let expr = col("hour").eq(lit("2020-01-01 02:00:00"));
        assert!(evaluate_predicate(&expr, &r, &tz).unwrap());
        assert!(!evaluate_predicate(&expr, &r, &utc()).unwrap());
    }

    #[test]
    fn test_arithmetic_and_functions() {
        let r = row();
        let tz = utc();
        let expr = col("year").add_expr(lit(1i64)).eq(lit(2021i64));
        assert!(evaluate_predicate(&expr, &r, &tz).unwrap());

        let div = LogicalExpr::binary(col("year"), BinaryOp::Divide, lit(0i64));
        assert_eq!(evaluate(&div, &r, &tz).unwrap(), Value::Null);

        let upper = LogicalExpr::function("upper", vec![col("region")]);
        assert_eq!(evaluate(&upper, &r, &tz).unwrap(), Value::String("EU".into()));

        let coalesce = LogicalExpr::function("coalesce", vec![col("day"), lit(7i64)]);
        assert_eq!(evaluate(&coalesce, &r, &tz).unwrap(), Value::Int64(7));
    }

    #[test]
    fn test_length_counts_chars() {
        let r = Row::new().with_value("city", "Zürich");
        let tz = utc();
        let length = LogicalExpr::function("length", vec![col("city")]);
        assert_eq!(evaluate(&length, &r, &tz).unwrap(), Value::Int64(6));

        let of_int = LogicalExpr::function("length", vec![lit(2020i64)]);
        assert_eq!(evaluate(&of_int, &r, &tz).unwrap(), Value::Int64(4));
    }

    #[test]
    fn test_errors() {
        let r = row();
        let tz = utc();
        assert!(matches!(
            evaluate(&col("missing"), &r, &tz),
            Err(QuarryError::ColumnNotFound(_))
        ));
        assert!(evaluate(&LogicalExpr::function("rand", vec![]), &r, &tz).is_err());
        assert!(evaluate_predicate(&col("year"), &r, &tz).is_err());
    }
}
