//! JSON document projection.

mod support;

#[test]
fn member_access() {
    assert_eval!("json.name.first", "Janet");
    assert_eval!("json.name.last", "Anderson");
    assert_eval!("json.name", "{\"first\": \"Janet\", \"last\": \"Anderson\"}");
    assert_eval!("json.enc", "Big\nBot");
    assert_eval!("json.age", "37");
}

#[test]
fn array_indexing() {
    assert_eval!("json.data[0]", "1");
    assert_eval!("json.data[1] == true", "true");
    assert_eval!("json.data[2] == false", "true");
    assert_eval!("json.data[3] == null", "true");
    assert_eval!("json.data[4].a", "1");
    assert_eval!("json.data[4].b", "undefined");
    assert_eval!("json.data[-1]", "undefined");
    assert_eval!("json.data['123']", "undefined");
    assert_eval!("(json.data[0]+4)*10", "50");
    // Dot syntax never parses a numeric member.
    assert_eval!("json.data.0", "SyntaxError");
    assert_eval!("json.data[0", "SyntaxError");
    // A comma key evaluates to its last value.
    assert_eval!("json.data[0+1,0+2]", "false");
    assert_eval!("json.data[0+1,0+]", "SyntaxError");
}

#[test]
fn numeric_coercion() {
    assert_eval!("json.empty * 2", "0");
    assert_eval!("json.one * 2", "30");
    assert_eval!("json.data * 2", "NaN");
    assert_eval!("json.name * 2", "NaN");
    assert_eval!("user1 * 2", "NaN");
}

#[test]
fn optional_chaining_on_json() {
    assert_eval!("json?.data[0]", "1");
    assert_eval!("json?.data[0]?", "SyntaxError");
    assert_eval!("json?.data[0]?.", "SyntaxError");
    assert_eval!("json?^data[0]", "SyntaxError");
}

#[test]
fn degenerate_documents() {
    // A bare quote classifies as an empty string.
    assert_eval!("badj", "");
    // Blank JSON is undefined, so the root lookup fails.
    assert_eval!("noj", "ReferenceError: Can't find variable: 'noj'");
}

#[test]
fn raw_fragments_concatenate() {
    assert_eval!(
        "bigjson + bigjson",
        "{\"a\":123456789012345678901234567890}{\"a\":123456789012345678901234567890}"
    );
}

#[test]
fn documents_are_borrowed_not_copied() {
    use jsexpr::{eval, Arena, Env, Value};

    let arena = Arena::new();
    let doc = r#"{"outer": {"inner": [10, 20, 30]}}"#;
    let resolve: &jsexpr::RefFn = &|arena, this, ident| {
        if this.is_global() && ident.equals_str("doc") {
            return Value::json(arena, doc);
        }
        Ok(Value::Undefined)
    };
    let env = Env {
        ref_fn: Some(&resolve),
        ..Env::default()
    };
    let v = eval(&arena, "doc.outer.inner[1]", &env).unwrap();
    assert_eq!(v, Value::Float(20.0));
    // The projected fragment points into the original document.
    let inner = eval(&arena, "doc.outer.inner", &env).unwrap();
    match inner {
        Value::Json(raw) => {
            assert_eq!(raw, "[10, 20, 30]");
            let doc_range = doc.as_ptr() as usize..doc.as_ptr() as usize + doc.len();
            assert!(doc_range.contains(&(raw.as_ptr() as usize)));
        }
        other => panic!("expected a raw fragment, got {other:?}"),
    }
}
