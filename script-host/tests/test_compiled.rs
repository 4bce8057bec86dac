// Copyright (c) 2023 script-host contributors. Zlib license.

use script_host::{Engine, ResourcePath};
use util::{expect_error, expect_unsupported};

mod util;

#[test]
fn compiled_script_runs_repeatedly() {
	let mut engine = Engine::new().unwrap();
	engine.eval("var counter = 0;").unwrap();

	let compiled = engine.compile("++counter").unwrap();

	assert_eq!(engine.eval_compiled(&compiled).unwrap(), 1);
	assert_eq!(engine.eval_compiled(&compiled).unwrap(), 2);
	assert_eq!(engine.get("counter").unwrap(), 2);
}

#[test]
fn compile_reports_syntax_errors() {
	let mut engine = Engine::new().unwrap();

	expect_error(engine.compile("function (a) {"), "Syntax error");
}

#[test]
fn compiled_script_follows_engine_scope() {
	let mut engine = Engine::new().unwrap();
	let compiled = engine.compile("myName.toUpperCase()").unwrap();

	let mut bindings = engine.create_bindings();
	bindings.put("myName", "madplay").unwrap();
	engine.set_bindings(&bindings).unwrap();
	assert_eq!(engine.eval_compiled(&compiled).unwrap(), "MADPLAY");

	bindings.put("myName", "kimtaeng").unwrap();
	engine.set_bindings(&bindings).unwrap();
	assert_eq!(engine.eval_compiled(&compiled).unwrap(), "KIMTAENG");
}

#[test]
fn compiled_script_is_engine_specific() {
	let mut first = Engine::new().unwrap();
	let compiled = first.compile("1").unwrap();

	let mut second = Engine::new().unwrap();
	expect_unsupported(second.eval_compiled(&compiled));
}

#[test]
fn compare_sample_script() {
	let script = ResourcePath::new([ResourcePath::bundled_root()])
		.read_to_string("sample_script.js")
		.unwrap();
	let mut engine = Engine::new().unwrap();

	let throughput = script_host::compare(&mut engine, &script, 50).unwrap();

	assert_eq!(throughput.iterations, 50);
	let report = throughput.to_string();
	assert!(report.starts_with("script: "));
	assert!(report.contains("\ncompiled script: "));

	// the functions defined by the script are in place afterwards
	let sum: i32 = engine.call("accumulator", (1, 2)).unwrap();
	assert_eq!(sum, 3);
}
