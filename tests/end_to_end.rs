//! End-to-end scenarios: build with the placeholders, compile, evaluate.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use quick_lambda::{
    Ast, BinOp, Error, ErrorKind, EvalError, Expr, Kwargs, Options, Term, Value, X, Y, fcall,
    fcall_kw, pipeline, placeholder, render, simplify,
};

fn int(n: i64) -> Value {
    Value::Int(n)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

#[test]
fn arithmetic_round_trip() {
    init_tracing();
    let f = (X + 1) * 2;
    assert_eq!(f.eval(&int(10)), Ok(int(22)));
    assert_eq!(f.eval(&int(0)), Ok(int(2)));
    assert_eq!(f.to_string(), "(_ + 1) * 2");
    assert_eq!(format!("{f:?}"), "Expr((_ + 1) * 2)");
}

#[test]
fn rendering_distinguishes_grouping() {
    let left = (X + 1) * 2;
    let right = X + Expr::constant(1) * 2;
    assert_eq!(right.to_string(), "_ + (1 * 2)");
    assert_ne!(left.to_string(), right.to_string());
    assert_ne!(left, right);
}

#[test]
fn method_call_on_argument() {
    let upper = X.attr("upper").call([]).unwrap();
    assert_eq!(upper.to_string(), "_.upper()");
    assert_eq!(upper.eval(&Value::from("abc")), Ok(Value::from("abc".to_uppercase())));

    let err = upper.eval(&int(42)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AttributeNotFound);
    assert_eq!(err.to_string(), "'int' object has no attribute 'upper'");
}

#[test]
fn keyword_arguments_reach_the_callee() {
    let split = X
        .attr("split")
        .call_kw([], [("sep", Term::from(","))])
        .unwrap();
    assert_eq!(split.to_string(), "_.split(sep=\",\")");
    assert_eq!(
        split.eval(&Value::from("a,b,c")),
        Ok(Value::tuple(vec!["a".into(), "b".into(), "c".into()]))
    );
}

#[test]
fn constant_member_access_folds() {
    let z = Value::complex(3.0, 4.0);
    let e = Expr::constant(z).attr("real").attr("imag");
    let compiled = e.compile_with(&Options::default()).unwrap();
    assert_eq!(compiled.call(&Value::None), Ok(Value::float(0.0)));

    let folded = simplify(e.ast()).unwrap();
    assert_eq!(folded, Ast::Const(Value::float(0.0)));
    assert_eq!(render(&folded), "0.0");
}

#[test]
fn chained_member_access_on_argument() {
    let e = X.attr("real").attr("imag");
    assert_eq!(e.to_string(), "_.real.imag");
    assert_eq!(e.eval(&Value::complex(1.0, 2.0)), Ok(Value::float(0.0)));
    assert_eq!(
        simplify(e.ast()).unwrap(),
        Ast::attr("real.imag", Ast::Var)
    );
}

#[test]
fn arity_follows_placeholders() {
    assert_eq!((X + X).arity(), 1);
    assert_eq!((X + X).eval(&int(4)), Ok(int(8)));
    assert_eq!((X + Y).arity(), 2);
    assert_eq!((X + Y).eval(&int(4), &int(5)), Ok(int(9)));
    assert_eq!((Y - X).eval(&int(4), &int(5)), Ok(int(1)));
    assert_eq!((Y * Y).eval(&int(4), &int(5)), Ok(int(25)));
    assert_eq!((2 * Y).eval(&int(4), &int(5)), Ok(int(10)));
    assert_eq!((-Y).eval(&int(4), &int(5)), Ok(int(-5)));
}

#[test]
fn second_placeholder_in_one_argument_tree_fails_at_build_time() {
    let err = ((X + 1) * Y).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedArity);

    let err = X.attr("split").call([Y.into()]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedArity);

    let f = Value::function("id", |args, _| Ok(args[0].clone()));
    let err = fcall(f, [Y.into()]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedArity);
}

#[test]
fn second_placeholder_member_access_returns_second_argument() {
    // The name is kept for display; no member is looked up on either argument.
    let real = Y.attr("real");
    assert_eq!(real.arity(), 2);
    assert_eq!(real.to_string(), "Y.real");
    let z = Value::complex(2.0, 1.0);
    assert_eq!(real.eval(&Value::from("ignored"), &z), Ok(z));
    assert_eq!(Y.attr("upper").eval(&int(1), &int(2)), Ok(int(2)));
}

#[test]
fn projections() {
    assert_eq!(X.eval(&int(7)), int(7));
    assert_eq!(Y.eval(&int(7), &int(8)), int(8));
    assert_eq!(placeholder().eval(&int(7)), Ok(int(7)));
}

#[test]
fn building_never_calls_user_functions() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let f = Value::function("count", move |args, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(args.first().cloned().unwrap_or(Value::None))
    });

    let e = fcall(f.clone(), [(X + 1).into()]).unwrap();
    let e = e * 2;
    let _ = fcall_kw(f, [Term::from(X)], [("k", Term::from(1))]).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert_eq!(e.eval(&int(1)), Ok(int(4)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(e.eval(&int(2)), Ok(int(6)));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn callee_errors_propagate_unchanged() {
    let failing = Value::function("boom", |_, _| {
        Err(EvalError::call_failed("boom", "no thanks"))
    });
    let e = fcall(failing, [X.into()]).unwrap();
    let err = e.eval(&int(1)).unwrap_err();
    assert_eq!(err, EvalError::call_failed("boom", "no thanks"));
    assert_eq!(err.kind(), ErrorKind::CallFailed);
}

#[test]
fn operator_type_errors_surface() {
    let e = X + 1;
    let err = e.eval(&Value::from("a")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperatorTypeMismatch);
    assert_eq!(err.to_string(), "unsupported operand type(s) for +: 'str' and 'int'");
}

#[test]
fn composition() {
    let composed = (X + 1).then(X * 2);
    assert_eq!(composed, (X + 1) * 2);
    assert_eq!(composed.eval(&int(10)), Ok(int(22)));

    let chained = pipeline([X + 1, X * 2, X.pow(2)]);
    assert_eq!(chained.to_string(), "((_ + 1) * 2) ** 2");
    assert_eq!(chained.eval(&int(1)), Ok(int(16)));
}

#[test]
fn options_can_disable_rewrites() {
    let e = Expr::constant(Value::complex(1.0, 2.0)).attr("real");
    let unoptimized = e.compile_with(&Options::unoptimized()).unwrap();
    let optimized = e.compile_with(&Options::default()).unwrap();
    assert_eq!(unoptimized.call(&Value::None), optimized.call(&Value::None));

    // A missing member on a constant is reported at simplify time only when folding.
    let bad = Expr::constant(42).attr("upper");
    assert!(bad.compile_with(&Options::default()).is_err());
    let deferred = bad.compile_with(&Options::unoptimized()).unwrap();
    assert_eq!(
        deferred.call(&Value::None).unwrap_err().kind(),
        ErrorKind::AttributeNotFound
    );
}

#[test]
fn umbrella_error_collects_both_stages() {
    fn build_and_run(input: Value) -> quick_lambda::Result<Value> {
        let e = X.attr("strip").call([])?;
        Ok(e.eval(&input)?)
    }
    assert_eq!(build_and_run(" a ".into()), Ok(Value::from("a")));
    let err = build_and_run(int(1)).unwrap_err();
    assert!(matches!(err, Error::Eval(_)));
    assert_eq!(err.kind(), ErrorKind::AttributeNotFound);

    fn build_only() -> quick_lambda::Result<Expr> {
        Ok(X.attr("split").call([Y.into()])?)
    }
    assert!(matches!(build_only(), Err(Error::Build(_))));
}

#[test]
fn comparisons_and_indexing() {
    assert_eq!(X.lt(3).eval(&int(2)), Ok(Value::Bool(true)));
    assert_eq!(X.equals(1.0).eval(&int(1)), Ok(Value::Bool(true)));
    assert_eq!(
        X.get_item(-1).eval(&Value::from("xyz")),
        Ok(Value::from("z"))
    );
    assert_eq!((X % 3).eval(&int(-7)), Ok(int(2)));
    assert_eq!(X.floordiv(2).eval(&int(-7)), Ok(int(-4)));
    assert_eq!((!X).eval(&Value::Bool(true)), Ok(int(-2)));
    assert_eq!(X.logical_not().eval(&int(0)), Ok(Value::Bool(true)));
    assert_eq!(X.len().eval(&Value::from("abc")), Ok(int(3)));
}

#[test]
fn compiled_expressions_are_shareable_across_threads() {
    init_tracing();
    let e = Arc::new(X * X + 1);
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let e = e.clone();
            std::thread::spawn(move || e.eval(&Value::Int(i)))
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![Ok(int(1)), Ok(int(2)), Ok(int(5)), Ok(int(10))]);
}

#[test]
fn serialized_tree_shape() {
    let e = (X + 1) * 2;
    let json = serde_json::to_value(e.ast()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"BinOp": ["Mul", {"BinOp": ["Add", "Var", {"Const": 1}]}, {"Const": 2}]})
    );
}

#[test]
fn hand_built_tree_matches_builder() {
    let mut kwargs = Kwargs::new();
    kwargs.insert("sep".to_string(), Ast::Const(Value::from(",")));
    let tree = Ast::call(Ast::attr("split", Ast::Var), vec![], kwargs);
    let built = X.attr("split").call_kw([], [("sep", ",".into())]).unwrap();
    assert_eq!(Expr::from_ast(tree), built);
    assert_eq!(
        Expr::from_ast(Ast::binary(BinOp::Add, Ast::Var, Ast::Const(int(1)))),
        X + 1
    );
}
