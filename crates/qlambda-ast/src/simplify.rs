//! Tree simplification applied before compilation.
//!
//! Two rewrites, applied innermost-first:
//! - member access on a simple constant is resolved once (`Const(v).a` → `Const(v.a)`);
//! - chained member access is merged into one dotted path (`t.a.b` → `GetAttr("a.b", t)`).
//!
//! Folding resolves the member eagerly, so a missing member on a constant is
//! reported here rather than at call time.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::ast::{Ast, Kwargs};
use crate::error::EvalError;
use crate::operand::Operand;

/// Toggles for the individual rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyOptions {
    /// Resolve member access on simple constants.
    pub fold_constants: bool,
    /// Merge chained member access into a dotted path.
    pub merge_attributes: bool,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            fold_constants: true,
            merge_attributes: true,
        }
    }
}

/// Simplify with every rewrite enabled.
pub fn simplify<V: Operand>(ast: &Ast<V>) -> Result<Ast<V>, EvalError> {
    simplify_with(ast, &SimplifyOptions::default())
}

/// Simplify with the given rewrites enabled.
pub fn simplify_with<V: Operand>(
    ast: &Ast<V>,
    options: &SimplifyOptions,
) -> Result<Ast<V>, EvalError> {
    match ast {
        Ast::Var | Ast::Const(_) => Ok(ast.clone()),
        Ast::UnaryOp(op, inner) => Ok(Ast::unary(*op, simplify_with(inner, options)?)),
        Ast::BinOp(op, lhs, rhs) => Ok(Ast::binary(
            *op,
            simplify_with(lhs, options)?,
            simplify_with(rhs, options)?,
        )),
        Ast::Call {
            callee,
            args,
            kwargs,
        } => {
            let callee = simplify_with(callee, options)?;
            let args = args
                .iter()
                .map(|a| simplify_with(a, options))
                .collect::<Result<Vec<_>, _>>()?;
            let kwargs: Kwargs<Ast<V>> = kwargs
                .iter()
                .map(|(k, v)| Ok((k.clone(), simplify_with(v, options)?)))
                .collect::<Result<_, EvalError>>()?;
            Ok(Ast::call(callee, args, kwargs))
        }
        Ast::GetAttr(name, target) => match simplify_with(target, options)? {
            Ast::Const(value) if options.fold_constants && value.is_simple() => {
                let folded = value.get_attr_path(name)?;
                trace!(attr = %name, "folded member access on constant");
                Ok(Ast::Const(folded))
            }
            Ast::GetAttr(inner_name, inner) if options.merge_attributes => {
                trace!(outer = %name, inner = %inner_name, "merged chained member access");
                Ok(Ast::GetAttr(format!("{inner_name}.{name}"), inner))
            }
            target => Ok(Ast::attr(name.clone(), target)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{BinOp, UnOp};

    /// Integers with `real`/`imag`/`doubled` members; `Big` is never simple.
    #[derive(Debug, Clone, PartialEq)]
    enum Num {
        Small(i64),
        Big(i64),
    }

    impl Operand for Num {
        fn is_simple(&self) -> bool {
            matches!(self, Num::Small(_))
        }

        fn get_attr(&self, name: &str) -> Result<Self, EvalError> {
            let (Num::Small(n) | Num::Big(n)) = *self;
            match name {
                "real" => Ok(self.clone()),
                "imag" => Ok(Num::Small(0)),
                "doubled" => Ok(Num::Big(n * 2)),
                _ => Err(EvalError::attribute_not_found("num", name)),
            }
        }

        fn call(&self, _args: &[Self], _kwargs: &Kwargs<Self>) -> Result<Self, EvalError> {
            Err(EvalError::NotCallable {
                type_name: "num".into(),
            })
        }

        fn unary(&self, op: UnOp) -> Result<Self, EvalError> {
            Err(EvalError::mismatch(op.symbol(), "'num'"))
        }

        fn binary(&self, op: BinOp, _rhs: &Self) -> Result<Self, EvalError> {
            Err(EvalError::mismatch(op.symbol(), "'num' and 'num'"))
        }
    }

    fn small(n: i64) -> Ast<Num> {
        Ast::Const(Num::Small(n))
    }

    #[test]
    fn test_fold_simple_constant() {
        let tree = Ast::attr("imag", Ast::attr("real", small(3)));
        assert_eq!(simplify(&tree).unwrap(), small(0));
    }

    #[test]
    fn test_non_simple_constant_not_folded() {
        let tree = Ast::attr("real", Ast::Const(Num::Big(3)));
        assert_eq!(simplify(&tree).unwrap(), tree);
    }

    #[test]
    fn test_fold_stops_at_non_simple_result() {
        // `doubled` yields a non-simple value, so `.real` stays a runtime lookup.
        let tree = Ast::attr("real", Ast::attr("doubled", small(3)));
        assert_eq!(
            simplify(&tree).unwrap(),
            Ast::attr("real", Ast::Const(Num::Big(6)))
        );
    }

    #[test]
    fn test_merge_chained_attributes() {
        let tree = Ast::attr("c", Ast::attr("b", Ast::attr("a", Ast::<Num>::Var)));
        assert_eq!(simplify(&tree).unwrap(), Ast::attr("a.b.c", Ast::Var));
    }

    #[test]
    fn test_recurses_into_operators_and_calls() {
        let chained = Ast::attr("b", Ast::attr("a", Ast::<Num>::Var));
        let merged = Ast::attr("a.b", Ast::<Num>::Var);
        let mut kwargs = Kwargs::new();
        kwargs.insert("k".to_string(), chained.clone());
        let tree = Ast::call(
            Ast::unary(UnOp::Neg, chained.clone()),
            vec![Ast::binary(BinOp::Add, chained.clone(), small(1))],
            kwargs,
        );
        let mut expected_kwargs = Kwargs::new();
        expected_kwargs.insert("k".to_string(), merged.clone());
        let expected = Ast::call(
            Ast::unary(UnOp::Neg, merged.clone()),
            vec![Ast::binary(BinOp::Add, merged, small(1))],
            expected_kwargs,
        );
        assert_eq!(simplify(&tree).unwrap(), expected);
    }

    #[test]
    fn test_missing_member_surfaces_at_simplify_time() {
        let tree = Ast::attr("upper", small(42));
        assert_eq!(
            simplify(&tree),
            Err(EvalError::attribute_not_found("num", "upper"))
        );
    }

    #[test]
    fn test_idempotent() {
        let trees = vec![
            Ast::attr("imag", Ast::attr("real", small(3))),
            Ast::attr("c", Ast::attr("b", Ast::attr("a", Ast::<Num>::Var))),
            Ast::attr("real", Ast::attr("doubled", small(3))),
            Ast::binary(
                BinOp::Mul,
                Ast::binary(BinOp::Add, Ast::Var, small(1)),
                small(2),
            ),
        ];
        for tree in trees {
            let once = simplify(&tree).unwrap();
            assert_eq!(simplify(&once).unwrap(), once);
        }
    }

    #[test]
    fn test_options_disable_rewrites() {
        let options = SimplifyOptions {
            fold_constants: false,
            merge_attributes: false,
        };
        let folded = Ast::attr("real", small(3));
        assert_eq!(simplify_with(&folded, &options).unwrap(), folded);
        let chained = Ast::attr("b", Ast::attr("a", Ast::<Num>::Var));
        assert_eq!(simplify_with(&chained, &options).unwrap(), chained);
    }

    #[test]
    fn test_options_from_partial_json() {
        let options: SimplifyOptions =
            serde_json::from_str(r#"{"merge_attributes": false}"#).unwrap();
        assert!(options.fold_constants);
        assert!(!options.merge_attributes);
    }
}
