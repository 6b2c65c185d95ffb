//! Compile-time constant folding.
//!
//! Slice bounds, multi-dimensional array bounds, and bitmap-literal
//! overflow checks all reduce to the same question: does this expression
//! fold to a known integer, and if so which one. One evaluator, several
//! callers, rather than three bespoke constant-propagation passes.

use crate::ast::{BinaryOp, Expr, UnaryOp};

/// Attempt to fold `expr` to a compile-time constant `i64`. Returns `None`
/// for anything that isn't a closed arithmetic expression over integer
/// literals (an identifier, a call, a float literal, a string) — callers
/// that need a hard error on non-constant input (slice bounds) turn `None`
/// into their own diagnostic; callers doing a best-effort check (bitmap
/// literal overflow) just skip the check when folding fails.
pub fn fold_const_i64(expr: &Expr) -> Option<i64> {
    match expr {
        Expr::IntLiteral(value, _) => Some(*value),
        Expr::BoolLiteral(b) => Some(i64::from(*b)),
        Expr::Unary(op, inner) => {
            let v = fold_const_i64(inner)?;
            match op {
                UnaryOp::Neg => v.checked_neg(),
                UnaryOp::BitNot => Some(!v),
                UnaryOp::Not => Some(if v == 0 { 1 } else { 0 }),
                UnaryOp::AddrOf => None,
            }
        }
        Expr::Binary(op, lhs, rhs) => {
            let l = fold_const_i64(lhs)?;
            let r = fold_const_i64(rhs)?;
            match op {
                BinaryOp::Add => l.checked_add(r),
                BinaryOp::Sub => l.checked_sub(r),
                BinaryOp::Mul => l.checked_mul(r),
                BinaryOp::Div => {
                    if r == 0 {
                        None
                    } else {
                        l.checked_div(r)
                    }
                }
                BinaryOp::Mod => {
                    if r == 0 {
                        None
                    } else {
                        l.checked_rem(r)
                    }
                }
                BinaryOp::BitAnd => Some(l & r),
                BinaryOp::BitOr => Some(l | r),
                BinaryOp::BitXor => Some(l ^ r),
                BinaryOp::Shl => r.try_into().ok().map(|shift: u32| l.wrapping_shl(shift)),
                BinaryOp::Shr => r.try_into().ok().map(|shift: u32| l.wrapping_shr(shift)),
                BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt
                | BinaryOp::Ge | BinaryOp::And | BinaryOp::Or => None,
            }
        }
        Expr::Postfix(base, ops) if ops.is_empty() => fold_const_i64(base),
        _ => None,
    }
}

/// Fold a `[start, width]` slice's two bounds, returning `None` if either
/// side isn't constant.
pub fn fold_slice_bounds(start: &Expr, width: &Expr) -> Option<(i64, i64)> {
    Some((fold_const_i64(start)?, fold_const_i64(width)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::IntSuffix;

    #[test]
    fn folds_simple_arithmetic() {
        let e = Expr::Binary(
            BinaryOp::Add,
            Box::new(Expr::IntLiteral(2, IntSuffix::None)),
            Box::new(Expr::IntLiteral(3, IntSuffix::None)),
        );
        assert_eq!(fold_const_i64(&e), Some(5));
    }

    #[test]
    fn refuses_to_fold_through_identifier() {
        let e = Expr::Binary(
            BinaryOp::Add,
            Box::new(Expr::Identifier("x".to_string())),
            Box::new(Expr::IntLiteral(3, IntSuffix::None)),
        );
        assert_eq!(fold_const_i64(&e), None);
    }

    #[test]
    fn division_by_zero_does_not_fold() {
        let e = Expr::Binary(
            BinaryOp::Div,
            Box::new(Expr::IntLiteral(4, IntSuffix::None)),
            Box::new(Expr::IntLiteral(0, IntSuffix::None)),
        );
        assert_eq!(fold_const_i64(&e), None);
    }

    #[test]
    fn slice_bounds_fold_both_sides() {
        let start = Expr::IntLiteral(4, IntSuffix::None);
        let width = Expr::IntLiteral(8, IntSuffix::None);
        assert_eq!(fold_slice_bounds(&start, &width), Some((4, 8)));
    }
}
