use serde_json::Value;

use super::ast::{BinOp, BoolOp, CompareOp, Expr};

/// Evaluate `expr` against a fixed scope of named top-level values. An
/// unresolvable name or an operation applied to the wrong value shape is
/// an `Err`, not a panic — the DSL evaluator above turns that into a
/// failing [`crate::context::EvaluationResult`] rather than crashing.
pub fn eval(expr: &Expr, scope: &std::collections::HashMap<&str, Value>) -> Result<Value, String> {
    match expr {
        Expr::Const(v) => Ok(v.clone()),
        Expr::Name(name) => scope.get(name.as_str()).cloned().ok_or_else(|| format!("unresolvable name '{name}'")),
        Expr::UnaryNot(inner) => Ok(Value::Bool(!truthy(&eval(inner, scope)?))),
        Expr::BoolOp(op, terms) => {
            let mut result = matches!(op, BoolOp::And);
            for term in terms {
                let v = truthy(&eval(term, scope)?);
                result = match op {
                    BoolOp::And => result && v,
                    BoolOp::Or => result || v,
                };
            }
            Ok(Value::Bool(result))
        }
        Expr::BinOp(op, left, right) => {
            let l = as_number(&eval(left, scope)?)?;
            let r = as_number(&eval(right, scope)?)?;
            let result = match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => {
                    if r == 0.0 {
                        return Err("division by zero".into());
                    }
                    l / r
                }
                BinOp::Mod => {
                    if r == 0.0 {
                        return Err("modulo by zero".into());
                    }
                    l % r
                }
            };
            Ok(serde_json::json!(result))
        }
        Expr::Compare(op, left, right) => {
            let l = eval(left, scope)?;
            let r = eval(right, scope)?;
            Ok(Value::Bool(compare(op, &l, &r)?))
        }
        Expr::Subscript(base, index) => {
            let base = eval(base, scope)?;
            let index = eval(index, scope)?;
            match (&base, &index) {
                (Value::Object(map), Value::String(key)) => Ok(map.get(key).cloned().unwrap_or(Value::Null)),
                (Value::Array(items), Value::Number(n)) => {
                    let i = n.as_i64().ok_or("non-integer array index")?;
                    let idx = if i < 0 { items.len() as i64 + i } else { i };
                    Ok(usize::try_from(idx).ok().and_then(|i| items.get(i)).cloned().unwrap_or(Value::Null))
                }
                _ => Err("subscript requires object[string] or array[int]".into()),
            }
        }
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn as_number(v: &Value) -> Result<f64, String> {
    v.as_f64().ok_or_else(|| format!("expected a number, found {v}"))
}

fn compare(op: &CompareOp, l: &Value, r: &Value) -> Result<bool, String> {
    Ok(match op {
        CompareOp::Eq => values_equal(l, r),
        CompareOp::NotEq => !values_equal(l, r),
        CompareOp::Gt => as_number(l)? > as_number(r)?,
        CompareOp::GtE => as_number(l)? >= as_number(r)?,
        CompareOp::Lt => as_number(l)? < as_number(r)?,
        CompareOp::LtE => as_number(l)? <= as_number(r)?,
        CompareOp::In => contains(r, l)?,
        CompareOp::NotIn => !contains(r, l)?,
    })
}

/// `serde_json::Value::eq` distinguishes a `Number`'s int/float
/// representation, so `2 == 2.0` would otherwise fail even though the
/// DSL has no such representational distinction of its own.
fn values_equal(l: &Value, r: &Value) -> bool {
    match (l.as_f64(), r.as_f64()) {
        (Some(lf), Some(rf)) => lf == rf,
        _ => l == r,
    }
}

fn contains(container: &Value, needle: &Value) -> Result<bool, String> {
    match container {
        Value::Array(items) => Ok(items.iter().any(|item| values_equal(item, needle))),
        Value::String(s) => match needle {
            Value::String(n) => Ok(s.contains(n.as_str())),
            _ => Err("'in' on a string requires a string needle".into()),
        },
        Value::Object(map) => match needle {
            Value::String(key) => Ok(map.contains_key(key)),
            _ => Err("'in' on an object requires a string key".into()),
        },
        _ => Err("'in' requires an array, string, or object".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::parser::parse;

    fn run(expr_src: &str, scope: &std::collections::HashMap<&str, Value>) -> Result<Value, String> {
        eval(&parse(expr_src).unwrap(), scope)
    }

    #[test]
    fn arithmetic_and_comparison_evaluate() {
        let scope = std::collections::HashMap::new();
        assert_eq!(run("1 + 2 * 3 == 7", &scope).unwrap(), Value::Bool(true));
    }

    #[test]
    fn name_lookup_and_subscript_resolve_against_scope() {
        let mut scope = std::collections::HashMap::new();
        scope.insert("task", serde_json::json!({"id": "t1"}));
        assert_eq!(run("task[\"id\"] == \"t1\"", &scope).unwrap(), Value::Bool(true));
        assert_eq!(run("task.id == \"t1\"", &scope).unwrap(), Value::Bool(true));
    }

    #[test]
    fn unresolvable_name_is_an_error_not_a_panic() {
        let scope = std::collections::HashMap::new();
        assert!(run("missing == 1", &scope).is_err());
    }

    #[test]
    fn in_operator_checks_substring_and_membership() {
        let mut scope = std::collections::HashMap::new();
        scope.insert("steps", serde_json::json!([1, 2, 3]));
        assert_eq!(run("2 in steps", &scope).unwrap(), Value::Bool(true));
        assert_eq!(run("\"lo\" in \"hello\"", &scope).unwrap(), Value::Bool(true));
    }
}
