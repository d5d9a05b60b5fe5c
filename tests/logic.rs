//! Logical operators, nullish coalescing, and short-circuit behavior.

mod support;

#[test]
fn logical_and_or() {
    assert_eval!("true && false", "false");
    assert_eval!("true || false", "true");
    assert_eval!("\"1\" || false", "true");
    assert_eval!("1 || false", "true");
    assert_eval!("0 || false", "false");
    assert_eval!("1 > 2 || 3 > 2", "true");
    assert_eval!("3 > 2 || (2 > 3 && 1 < 2)", "true");
    assert_eval!("(1 || (2 > 5)) && (4 < 5 || 5 < 4)", "true");
    assert_eval!("10u64 || 0", "true");
    assert_eval!("10u64 || 0u64", "true");
    assert_eval!("10u64 || 0i64", "true");
    assert_eval!("10i64 || 0i64", "true");
    assert_eval!("'1' || '0'", "true");
    assert_eval!("(1) && ", "SyntaxError");
    assert_eval!(" && (1)", "SyntaxError");
    assert_eval!("1 < (}2) < (1)", "SyntaxError");
}

#[test]
fn nullish_coalescing() {
    assert_eval!("null??1", "1");
    assert_eval!("null??0", "0");
    assert_eval!("undefined??1+1", "2");
    assert_eval!("undefined??0+1", "1");
    assert_eval!("false??1+1", "false");
    assert_eval!("true??1+1", "true");
    assert_eval!("(false??1)+1", "1");
    assert_eval!("(true??1)+1", "2");
    assert_eval!("(cust(1)??cust(2))+1", "2");
}

#[test]
fn ternary_with_strings() {
    assert_eval!("'1' ? '2' : '3'", "2");
    assert_eval!("[1] ? '2' : '3'", "2");
}

#[test]
fn trailing_and_malformed_operators() {
    assert_eval!("'1' | (bad)", "ReferenceError: Can't find variable: 'bad'");
    assert_eval!("'1' | ", "SyntaxError");
    assert_eval!("'1' | \t | 3", "SyntaxError");
    assert_eval!("'1' | (123) | (123 ", "SyntaxError");
}
