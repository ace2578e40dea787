//! The built-in operator catalogue (spec §4.1).
//!
//! Every built-in is reconstructed on each call rather than memoized in a
//! global table: construction is a handful of allocations, and the
//! `OpKey` computed from `(name, types, src)` is what gives two built-ins
//! requested under the same name and types a shared dispatch-cache
//! identity, not pointer equality.

use std::sync::Arc;

use crate::{ElementTypeId, OpBinary, OpSelect, OpUnary, Value};

macro_rules! binary_arith {
    ($fn_name:ident, $op_name:expr, $src:expr, $apply:expr) => {
        pub fn $fn_name(ty: ElementTypeId) -> Arc<OpBinary> {
            let apply = $apply;
            Arc::new(OpBinary::new(
                $op_name,
                ty,
                ty,
                ty,
                $src,
                Arc::new(move |a: Value, b: Value| apply(ty, a, b)),
            ))
        }
    };
}

fn num_binary(ty: ElementTypeId, a: Value, b: Value, f: impl Fn(f64, f64) -> f64) -> Value {
    match ty {
        ElementTypeId::I32 => Value::I32(f(a.as_i32().unwrap() as f64, b.as_i32().unwrap() as f64) as i32),
        ElementTypeId::U32 => Value::U32(f(a.as_u32().unwrap() as f64, b.as_u32().unwrap() as f64) as u32),
        ElementTypeId::F32 => Value::F32(f(a.as_f32().unwrap() as f64, b.as_f32().unwrap() as f64) as f32),
    }
}

binary_arith!(plus, "PLUS", "a + b", |ty, a, b| num_binary(ty, a, b, |x, y| x + y));
binary_arith!(minus, "MINUS", "a - b", |ty, a, b| num_binary(ty, a, b, |x, y| x - y));
binary_arith!(mult, "MULT", "a * b", |ty, a, b| num_binary(ty, a, b, |x, y| x * y));
binary_arith!(div, "DIV", "a / b", |ty, a, b| num_binary(ty, a, b, |x, y| x / y));
binary_arith!(min, "MIN", "min(a, b)", |ty, a, b| num_binary(ty, a, b, f64::min));
binary_arith!(max, "MAX", "max(a, b)", |ty, a, b| num_binary(ty, a, b, f64::max));

pub fn first(ty: ElementTypeId) -> Arc<OpBinary> {
    Arc::new(OpBinary::new("FIRST", ty, ty, ty, "a", Arc::new(|a, _b| a)))
}

pub fn second(ty: ElementTypeId) -> Arc<OpBinary> {
    Arc::new(OpBinary::new("SECOND", ty, ty, ty, "b", Arc::new(|_a, b| b)))
}

pub fn one(ty: ElementTypeId) -> Arc<OpBinary> {
    let one_val = match ty {
        ElementTypeId::I32 => Value::I32(1),
        ElementTypeId::U32 => Value::U32(1),
        ElementTypeId::F32 => Value::F32(1.0),
    };
    Arc::new(OpBinary::new(
        "ONE",
        ty,
        ty,
        ty,
        "1",
        Arc::new(move |_a, _b| one_val),
    ))
}

macro_rules! binary_logical {
    ($fn_name:ident, $op_name:expr, $src:expr, $apply:expr) => {
        pub fn $fn_name(ty: ElementTypeId) -> Arc<OpBinary> {
            assert!(
                matches!(ty, ElementTypeId::I32 | ElementTypeId::U32),
                "logical operators are only defined on integer types"
            );
            let apply = $apply;
            Arc::new(OpBinary::new(
                $op_name,
                ty,
                ty,
                ty,
                $src,
                Arc::new(move |a: Value, b: Value| apply(ty, a, b)),
            ))
        }
    };
}

fn int_binary(ty: ElementTypeId, a: Value, b: Value, f: impl Fn(i64, i64) -> i64) -> Value {
    match ty {
        ElementTypeId::I32 => Value::I32(f(a.as_i32().unwrap() as i64, b.as_i32().unwrap() as i64) as i32),
        ElementTypeId::U32 => Value::U32(f(a.as_u32().unwrap() as i64, b.as_u32().unwrap() as i64) as u32),
        ElementTypeId::F32 => unreachable!("logical operators are only defined on integer types"),
    }
}

binary_logical!(bor, "BOR", "a | b", |ty, a, b| int_binary(ty, a, b, |x, y| x | y));
binary_logical!(band, "BAND", "a & b", |ty, a, b| int_binary(ty, a, b, |x, y| x & y));
binary_logical!(bxor, "BXOR", "a ^ b", |ty, a, b| int_binary(ty, a, b, |x, y| x ^ y));

fn as_f64(ty: ElementTypeId, v: Value) -> f64 {
    match (ty, v) {
        (ElementTypeId::I32, Value::I32(v)) => v as f64,
        (ElementTypeId::U32, Value::U32(v)) => v as f64,
        (ElementTypeId::F32, Value::F32(v)) => v as f64,
        _ => unreachable!("value type does not match operator type"),
    }
}

macro_rules! select_cmp {
    ($fn_name:ident, $op_name:expr, $src:expr, $cmp:expr) => {
        pub fn $fn_name(ty: ElementTypeId) -> Arc<OpSelect> {
            let cmp = $cmp;
            Arc::new(OpSelect::new(
                $op_name,
                ty,
                $src,
                Arc::new(move |v: Value| cmp(as_f64(ty, v))),
            ))
        }
    };
}

select_cmp!(eqzero, "EQZERO", "v == 0", |x: f64| x == 0.0);
select_cmp!(nqzero, "NQZERO", "v != 0", |x: f64| x != 0.0);
select_cmp!(gtzero, "GTZERO", "v > 0", |x: f64| x > 0.0);
select_cmp!(gezero, "GEZERO", "v >= 0", |x: f64| x >= 0.0);
select_cmp!(ltzero, "LTZERO", "v < 0", |x: f64| x < 0.0);
select_cmp!(lezero, "LEZERO", "v <= 0", |x: f64| x <= 0.0);

pub fn always(ty: ElementTypeId) -> Arc<OpSelect> {
    Arc::new(OpSelect::new("ALWAYS", ty, "true", Arc::new(|_v| true)))
}

pub fn never(ty: ElementTypeId) -> Arc<OpSelect> {
    Arc::new(OpSelect::new("NEVER", ty, "false", Arc::new(|_v| false)))
}

macro_rules! unary_fn {
    ($fn_name:ident, $op_name:expr, $src:expr, $apply:expr) => {
        pub fn $fn_name(ty: ElementTypeId) -> Arc<OpUnary> {
            let apply = $apply;
            Arc::new(OpUnary::new(
                $op_name,
                ty,
                ty,
                $src,
                Arc::new(move |v: Value| apply(ty, v)),
            ))
        }
    };
}

fn num_unary(ty: ElementTypeId, v: Value, f: impl Fn(f64) -> f64) -> Value {
    match ty {
        ElementTypeId::I32 => Value::I32(f(v.as_i32().unwrap() as f64) as i32),
        ElementTypeId::U32 => Value::U32(f(v.as_u32().unwrap() as f64) as u32),
        ElementTypeId::F32 => Value::F32(f(v.as_f32().unwrap() as f64) as f32),
    }
}

unary_fn!(identity, "IDENTITY", "v", |_ty, v: Value| v);
unary_fn!(ainv, "AINV", "-v", |ty, v| num_unary(ty, v, |x| -x));
unary_fn!(minv, "MINV", "1 / v", |ty, v| num_unary(ty, v, |x| 1.0 / x));
unary_fn!(abs, "ABS", "abs(v)", |ty, v| num_unary(ty, v, f64::abs));
unary_fn!(sqrt, "SQRT", "sqrt(v)", |ty, v| num_unary(ty, v, f64::sqrt));
unary_fn!(exp, "EXP", "exp(v)", |ty, v| num_unary(ty, v, f64::exp));
unary_fn!(log, "LOG", "log(v)", |ty, v| num_unary(ty, v, f64::ln));
unary_fn!(sin, "SIN", "sin(v)", |ty, v| num_unary(ty, v, f64::sin));
unary_fn!(cos, "COS", "cos(v)", |ty, v| num_unary(ty, v, f64::cos));
unary_fn!(tan, "TAN", "tan(v)", |ty, v| num_unary(ty, v, f64::tan));

pub fn bnot(ty: ElementTypeId) -> Arc<OpUnary> {
    assert!(
        matches!(ty, ElementTypeId::I32 | ElementTypeId::U32),
        "BNOT is only defined on integer types"
    );
    Arc::new(OpUnary::new(
        "BNOT",
        ty,
        ty,
        "~v",
        Arc::new(move |v: Value| match (ty, v) {
            (ElementTypeId::I32, Value::I32(v)) => Value::I32(!v),
            (ElementTypeId::U32, Value::U32(v)) => Value::U32(!v),
            _ => unreachable!(),
        }),
    ))
}

/// Namespace re-exporting the catalogue so call sites read as
/// `Builtins::plus(ElementTypeId::I32)`.
pub struct Builtins;

impl Builtins {
    pub fn plus(ty: ElementTypeId) -> Arc<OpBinary> {
        plus(ty)
    }
    pub fn minus(ty: ElementTypeId) -> Arc<OpBinary> {
        minus(ty)
    }
    pub fn mult(ty: ElementTypeId) -> Arc<OpBinary> {
        mult(ty)
    }
    pub fn div(ty: ElementTypeId) -> Arc<OpBinary> {
        div(ty)
    }
    pub fn min(ty: ElementTypeId) -> Arc<OpBinary> {
        min(ty)
    }
    pub fn max(ty: ElementTypeId) -> Arc<OpBinary> {
        max(ty)
    }
    pub fn first(ty: ElementTypeId) -> Arc<OpBinary> {
        first(ty)
    }
    pub fn second(ty: ElementTypeId) -> Arc<OpBinary> {
        second(ty)
    }
    pub fn one(ty: ElementTypeId) -> Arc<OpBinary> {
        one(ty)
    }
    pub fn bor(ty: ElementTypeId) -> Arc<OpBinary> {
        bor(ty)
    }
    pub fn band(ty: ElementTypeId) -> Arc<OpBinary> {
        band(ty)
    }
    pub fn bxor(ty: ElementTypeId) -> Arc<OpBinary> {
        bxor(ty)
    }
    pub fn eqzero(ty: ElementTypeId) -> Arc<OpSelect> {
        eqzero(ty)
    }
    pub fn nqzero(ty: ElementTypeId) -> Arc<OpSelect> {
        nqzero(ty)
    }
    pub fn gtzero(ty: ElementTypeId) -> Arc<OpSelect> {
        gtzero(ty)
    }
    pub fn gezero(ty: ElementTypeId) -> Arc<OpSelect> {
        gezero(ty)
    }
    pub fn ltzero(ty: ElementTypeId) -> Arc<OpSelect> {
        ltzero(ty)
    }
    pub fn lezero(ty: ElementTypeId) -> Arc<OpSelect> {
        lezero(ty)
    }
    pub fn always(ty: ElementTypeId) -> Arc<OpSelect> {
        always(ty)
    }
    pub fn never(ty: ElementTypeId) -> Arc<OpSelect> {
        never(ty)
    }
    pub fn identity(ty: ElementTypeId) -> Arc<OpUnary> {
        identity(ty)
    }
    pub fn ainv(ty: ElementTypeId) -> Arc<OpUnary> {
        ainv(ty)
    }
    pub fn minv(ty: ElementTypeId) -> Arc<OpUnary> {
        minv(ty)
    }
    pub fn abs(ty: ElementTypeId) -> Arc<OpUnary> {
        abs(ty)
    }
    pub fn bnot(ty: ElementTypeId) -> Arc<OpUnary> {
        bnot(ty)
    }
    pub fn sqrt(ty: ElementTypeId) -> Arc<OpUnary> {
        sqrt(ty)
    }
    pub fn exp(ty: ElementTypeId) -> Arc<OpUnary> {
        exp(ty)
    }
    pub fn log(ty: ElementTypeId) -> Arc<OpUnary> {
        log(ty)
    }
    pub fn sin(ty: ElementTypeId) -> Arc<OpUnary> {
        sin(ty)
    }
    pub fn cos(ty: ElementTypeId) -> Arc<OpUnary> {
        cos(ty)
    }
    pub fn tan(ty: ElementTypeId) -> Arc<OpUnary> {
        tan(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_and_type_share_a_key() {
        let a = Builtins::plus(ElementTypeId::I32);
        let b = Builtins::plus(ElementTypeId::I32);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn different_types_do_not_share_a_key() {
        let a = Builtins::plus(ElementTypeId::I32);
        let b = Builtins::plus(ElementTypeId::F32);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn plus_applies_correctly() {
        let plus = Builtins::plus(ElementTypeId::I32);
        assert_eq!(plus.apply(Value::I32(3), Value::I32(4)), Value::I32(7));
    }

    #[test]
    fn eqzero_select() {
        let sel = Builtins::eqzero(ElementTypeId::I32);
        assert!(sel.apply(Value::I32(0)));
        assert!(!sel.apply(Value::I32(5)));
    }
}
