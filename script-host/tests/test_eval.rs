// Copyright (c) 2023 script-host contributors. Zlib license.

use script_host::JsValue;
use util::expect_error;

mod util;

#[test]
fn console_log() {
	let result: JsValue = script_host::eval_json("console.log(\"Hello World\")")
		.expect("Valid expression can be evaluated");

	assert_eq!(result, JsValue::Null);
}

#[test]
fn expression() {
	let result: JsValue = script_host::eval_json("({a: 43, b: 12}).b - 2")
		.expect("Valid expression can be evaluated");

	let exp_result = JsValue::from(10);

	assert_eq!(result, exp_result);
}

#[test]
fn object_literal_expression() {
	let result = script_host::eval_json("{a: 43}").expect("Braces are parsed as an object literal");

	assert_eq!(result, serde_json::json!({"a": 43}));
}

#[test]
fn statements() {
	script_host::eval("var a = 1; a += 1;").expect("Statements run");
}

#[test]
fn syntax_error() {
	let result_opt = script_host::eval_json("({a: 43, b: 12})..b - 2");

	expect_error(result_opt, "Syntax error");
}
