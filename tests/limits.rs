//! Resource limits: recursion depth, arena accounting, and allocation
//! failure tolerance.

mod support;

use jsexpr::{eval, Arena, Env, Error, Value};

fn parens(depth: usize) -> String {
    let mut expr = String::from("1 + ");
    for _ in 0..depth {
        expr.push('(');
    }
    expr.push('1');
    for _ in 0..depth {
        expr.push(')');
    }
    expr
}

#[test]
fn depth_limit_default_is_100() {
    let arena = Arena::new();
    let ok = parens(100);
    assert_eq!(
        eval(&arena, &ok, &Env::default()).unwrap(),
        Value::Float(2.0)
    );
    let too_deep = parens(101);
    assert_eq!(
        eval(&arena, &too_deep, &Env::default()),
        Err(Error::Message("MaxDepthError"))
    );
}

#[test]
fn reset_returns_all_counters_to_zero() {
    let mut arena = Arena::new();
    // Enough string concatenation to spill past the slab.
    let expr = "'hello' + 'world' + 'hello' + 'world' + 'hello' + 'world'";
    for _ in 0..100 {
        let v = eval(&arena, expr, &Env::default()).unwrap();
        assert_eq!(v.to_string(), "helloworldhelloworldhelloworld");
    }
    let stats = arena.stats();
    assert!(stats.slab_used > 0);
    assert!(stats.heap_allocs > 0);
    arena.reset();
    let stats = arena.stats();
    assert_eq!(stats.slab_used, 0);
    assert_eq!(stats.slab_allocs, 0);
    assert_eq!(stats.heap_allocs, 0);
    assert_eq!(stats.heap_bytes, 0);
}

#[test]
fn custom_slab_size() {
    let arena = Arena::with_slab_size(16);
    assert_eq!(arena.stats().slab_size, 16);
    // A concatenation bigger than the slab goes to the overflow counters.
    let v = eval(
        &arena,
        "'0123456789012345678901234567890123456789' + 'x\\n'",
        &Env::default(),
    )
    .unwrap();
    assert_eq!(v.to_string().len(), 42);
    assert!(arena.stats().heap_allocs > 0);
}

// The expressions exercised under a failing allocator, with their expected
// results from a healthy run.
const CHAOS_CASES: &[(&str, &str)] = &[
    ("'hello' + ' ' + 'world'", "hello world"),
    ("[1,2,(3,4,'a','b'),3,1==2,3.5+4.5]", "1,2,b,3,false,8"),
    ("\"hel\\nlo\" + \"\\u{1f516}\"", "hel\nlo\u{1f516}"),
    ("json.name.first", "Janet"),
    ("json.enc", "Big\nBot"),
    ("1 + [2] + 3", "123"),
    ("howdy.myfn2(1,2,3) == 6", "true"),
    ("8888888899999999999999999 + '!'", "8.8888889e+24!"),
];

/// Every k-th allocation fails: each evaluation must either produce the
/// healthy result or report out-of-memory, and never panic.
#[test]
fn allocation_failure_sweep() {
    for k in 2..=20 {
        for &(expr, expected) in CHAOS_CASES {
            let mut arena = Arena::new();
            arena.fail_every_nth(k);
            let env = Env {
                ref_fn: Some(&support_resolve),
                ..Env::default()
            };
            match eval(&arena, expr, &env) {
                Ok(v) => assert_eq!(v.to_string(), expected, "k={k} expression: {expr}"),
                Err(e) => assert!(e.is_oom(), "k={k} expression: {expr} error: {e}"),
            }
            arena.reset();
            let stats = arena.stats();
            assert_eq!(stats.slab_used, 0);
            assert_eq!(stats.heap_allocs, 0);
            assert_eq!(stats.heap_bytes, 0);
        }
    }
}

fn support_resolve<'a>(
    arena: &'a Arena,
    this: Value<'a>,
    ident: Value<'a>,
) -> Result<Value<'a>, Error<'a>> {
    if this.is_global() {
        if ident.equals_str("json") {
            return Value::json(arena, support::JSON_DOC);
        }
        if ident.equals_str("howdy") {
            return Ok(Value::str("hiya"));
        }
    } else if ident.equals_str("myfn2") {
        return Ok(Value::function(&myfn2));
    }
    Ok(Value::Undefined)
}

fn myfn2<'a>(_arena: &'a Arena, _recv: Value<'a>, args: Value<'a>) -> Result<Value<'a>, Error<'a>> {
    let mut sum = 0.0;
    for i in 0..args.array_len() {
        sum += args.array_at(i).to_f64();
    }
    Ok(Value::Float(sum))
}

#[test]
fn values_are_plain_data() {
    let arena = Arena::new();
    let v = eval(&arena, "'copy' + 'able'", &Env::default()).unwrap();
    let w = v; // bitwise copy
    assert_eq!(v, w);
    assert_eq!(w.to_string(), "copyable");
}

#[test]
fn stringify_round_trips_through_numbers() {
    // to_f64(to_str(x)) == to_f64(x) for finite values.
    let arena = Arena::new();
    for expr in ["1.5", "0.1", "123456789", "1e20", "-42", "1u64", "-7i64"] {
        let v = eval(&arena, expr, &Env::default()).unwrap();
        let rendered = v.to_string();
        let reparsed = Value::str(&rendered).to_f64();
        assert_eq!(reparsed, v.to_f64(), "expression: {expr}");
    }
}
