// Copyright (c) 2023 script-host contributors. Zlib license.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use script_host::{Engine, EngineManager, JsValue, OutputBuffer, ResourcePath, ScriptError, ScriptResult};
use util::{expect_error, expect_unsupported};

mod util;

#[derive(Serialize, Debug)]
struct JsArgs {
	text: String,
	num: i32,
}

#[derive(Deserialize, Debug, PartialEq)]
struct JsResult {
	new_text: String,
	new_num: i32,
}

#[derive(Deserialize, Debug, PartialEq)]
struct Contract {
	name: String,
	#[serde(rename = "phoneNumber")]
	phone_number: String,
}

fn sample_engine() -> Engine {
	let path = ResourcePath::new([ResourcePath::bundled_root()]);
	let mut engine = Engine::new().expect("Initialization succeeds");
	engine
		.eval_file(path.locate("sample_script.js").unwrap())
		.expect("Sample script loads");
	engine
}

#[test]
fn eval_inline_expression() {
	let mut engine = EngineManager::new()
		.engine_by_name("JavaScript")
		.expect("V8 is registered");

	assert_eq!(engine.eval("Math.min(2, 3)").unwrap(), JsValue::from(2));
}

#[test]
fn eval_completion_values() {
	let mut engine = Engine::new().unwrap();

	assert_eq!(engine.eval("var x = 1;").unwrap(), JsValue::Null);
	assert_eq!(engine.eval("x + 0.5").unwrap(), JsValue::from(1.5));
	assert_eq!(engine.eval("'a' + 'b'").unwrap(), JsValue::from("ab"));
	assert_eq!(
		engine.eval("({a: [1, 2], b: null})").unwrap(),
		serde_json::json!({"a": [1, 2], "b": null})
	);
}

#[test]
fn eval_function_yields_source() {
	let mut engine = Engine::new().unwrap();
	let result = engine.eval("(function triple(a) { return 3 * a; })").unwrap();

	assert_eq!(result, JsValue::from("function triple(a) { return 3 * a; }"));
}

#[test]
fn state_persists_between_evals() {
	let mut engine = Engine::new().unwrap();
	engine.eval("var total = '';").unwrap();
	engine.eval("total += 'hello';").unwrap();
	engine.eval("total += ' world';").unwrap();

	assert_eq!(engine.get("total").unwrap(), "hello world");
}

#[test]
fn call() {
	let src = r#"
	function triple(a) { return 3 * a; }

	function extract(obj) {
		return {
			new_text: obj.text + ".",
			new_num: triple(obj.num)
		};
	}"#;

	let mut engine = Engine::new().unwrap();
	engine.eval(src).expect("Initialization succeeds");

	let args = JsArgs {
		text: "hi".to_string(),
		num: 4,
	};
	let exp_result = JsResult {
		new_text: "hi.".to_string(),
		new_num: 12,
	};

	let result: JsResult = engine.call("extract", (args,)).unwrap();
	assert_eq!(result, exp_result);
}

#[test]
fn call_multi_args() {
	let mut engine = Engine::new().unwrap();
	engine.eval("function div(a, b) { return a / b; }").unwrap();

	let result: f32 = engine.call("div", (15, 4)).unwrap();
	assert_eq!(result, 3.75);
}

#[test]
fn call_hashmap_to_hashmap() {
	let src = r#"
	function fillMap(map) {
		map.cats = 2;
		return map;
	}"#;

	let mut engine = Engine::new().unwrap();
	engine.eval(src).unwrap();

	let map = HashMap::from([("dogs", 3)]);
	let result: HashMap<String, i32> = engine.call("fillMap", (map,)).unwrap();

	assert_eq!(
		result,
		HashMap::from([("dogs".to_string(), 3), ("cats".to_string(), 2)])
	);
}

#[test]
fn call_void() -> ScriptResult<()> {
	let mut engine = Engine::new()?;
	engine.eval("function log(expr) { console.log(expr); }")?;

	let _result: () = engine.call("log", ("some text",))?;

	Ok(())
}

#[test]
fn call_sample_accumulator() {
	let mut engine = sample_engine();

	let sum: i32 = engine.call("accumulator", (1, 2)).unwrap();
	assert_eq!(sum, 3);

	let sum: f64 = engine.call("accumulator", (0.5, 2)).unwrap();
	assert_eq!(sum, 2.5);
}

#[test]
fn call_sample_make_contract() {
	let mut engine = sample_engine();

	let contract: Contract = engine
		.call("makeContract", ("madplay", "010-1234-1234"))
		.unwrap();

	assert_eq!(
		contract,
		Contract {
			name: "madplay".to_string(),
			phone_number: "010-1234-1234".to_string(),
		}
	);
}

#[test]
fn returned_object_entries() {
	let mut engine = sample_engine();
	let contract = engine
		.invoke_function("makeContract", ("madplay", "010-1234-1234"))
		.unwrap();

	let entries: Vec<(String, String)> = engine
		.entries(&contract)
		.unwrap()
		.into_iter()
		.map(|(key, value)| (key, engine.display(&value).unwrap()))
		.collect();

	assert_eq!(entries.len(), 3);
	assert_eq!(entries[0], ("name".to_string(), "madplay".to_string()));
	assert_eq!(
		entries[1],
		("phoneNumber".to_string(), "010-1234-1234".to_string())
	);
	assert_eq!(entries[2].0, "print");
	assert!(entries[2].1.starts_with("function"));

	let print = engine.member(&contract, "print").unwrap();
	assert!(engine.is_callable(&print).unwrap());
	assert!(engine.has_member(&contract, "name").unwrap());
	assert!(!engine.has_member(&contract, "address").unwrap());
}

#[test]
fn invoke_method_binds_this() {
	let mut engine = sample_engine();
	let contract = engine
		.invoke_function("makeContract", ("madplay", "010-1234-1234"))
		.unwrap();

	let name = engine.invoke_method(&contract, "print", ()).unwrap();
	assert_eq!(engine.to_json(&name).unwrap(), "madplay");
}

#[test]
fn handles_are_engine_specific() {
	let mut first = sample_engine();
	let contract = first
		.invoke_function("makeContract", ("madplay", "010-1234-1234"))
		.unwrap();

	let mut second = Engine::new().unwrap();
	let reason = expect_unsupported(second.display(&contract));
	assert!(reason.contains("belongs to engine"));
}

#[test]
fn eval_error_syntax() {
	let mut engine = Engine::new().unwrap();
	let result = engine.eval("function triple(a) { return 3 *. a; }");

	let err = expect_error(result, "Syntax error");
	assert!(err.exception_message.contains("SyntaxError"));
}

#[test]
fn call_error_inexistent_function() {
	let mut engine = Engine::new().unwrap();
	engine.eval("function triple(a) { return 3 * a; }").unwrap();

	let result: ScriptResult<i32> = engine.call("tripel", (7,));

	let err = expect_error(result, "Inexistent function");
	assert!(err.exception_message.contains("tripel is not a function"));
}

#[test]
fn call_error_exception() {
	let mut engine = Engine::new().unwrap();
	engine.eval("function triple(a) { throw new Error('string_error'); }").unwrap();

	let result: ScriptResult<i32> = engine.call("triple", (7,));

	let err = expect_error(result, "Runtime exception");
	assert!(err.exception_message.contains("string_error"));
}

#[test]
fn engine_survives_errors() {
	let mut engine = Engine::new().unwrap();
	engine.eval("var kept = 42;").unwrap();

	assert!(engine.eval("throw new TypeError('boom')").is_err());
	assert_eq!(engine.eval("kept").unwrap(), 42);
}

#[test]
fn call_error_wrong_return_type() {
	let mut engine = Engine::new().unwrap();
	engine.eval("function text() { return 'not a number'; }").unwrap();

	let result: ScriptResult<i32> = engine.call("text", ());
	assert!(matches!(result, Err(ScriptError::Json(_))));
}

#[test]
fn call_error_timeout() {
	let timeout = Duration::from_millis(200);
	let expected_stop_time = Duration::from_millis(150);

	let mut engine = Engine::new()
		.expect("Initialization succeeds")
		.with_timeout(timeout);
	engine.eval("function run_forever() { for(;;){} }").unwrap();

	let start = Instant::now();
	let result: ScriptResult<String> = engine.call("run_forever", ());
	let duration = start.elapsed();

	assert!(matches!(result, Err(ScriptError::Terminated)));
	assert!(
		duration >= timeout,
		"Terminates before the specified timeout (at {}ms)",
		duration.as_millis()
	);
	assert!(
		duration < timeout + expected_stop_time,
		"Took longer than {}ms to terminate (stopped at {}ms)",
		expected_stop_time.as_millis(),
		duration.as_millis()
	);

	// isolate is usable again, and a fast call is not cut short
	assert_eq!(engine.eval("1 + 1").unwrap(), 2);
}

#[test]
fn timeout_flushes_output_of_its_own_call() {
	let mut engine = Engine::new()
		.expect("Initialization succeeds")
		.with_timeout(Duration::from_millis(200));
	let buffer = OutputBuffer::new();
	engine.set_writer(buffer.clone());
	engine.eval("function spin() { print('started'); for(;;){} }").unwrap();

	let result: ScriptResult<()> = engine.call("spin", ());

	assert!(matches!(result, Err(ScriptError::Terminated)));
	assert_eq!(buffer.contents(), "started\n");

	buffer.clear();
	engine.eval("print('second')").unwrap();
	assert_eq!(buffer.contents(), "second\n");
}

#[test]
fn engine_by_extension() {
	let manager = EngineManager::new();

	let mut engine = manager.engine_by_extension("js").unwrap();
	assert_eq!(engine.eval("typeof print").unwrap(), "function");
	drop(engine);

	let engine = manager.engine_by_extension(".mjs").unwrap();
	assert_eq!(engine.factory().engine_name, "V8 (deno_core)");
	drop(engine);

	let err = manager.engine_by_extension(".py").unwrap_err();
	assert!(matches!(err, ScriptError::EngineNotFound(q) if q == "py"));
}

#[test]
fn engine_by_mime_type() {
	let manager = EngineManager::new();

	for mime_type in ["application/javascript", "text/ecmascript"] {
		let mut engine = manager.engine_by_mime_type(mime_type).unwrap();
		assert_eq!(engine.eval("Math.max(2, 3)").unwrap(), 3);
	}
}
