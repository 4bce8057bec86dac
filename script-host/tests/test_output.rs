// Copyright (c) 2023 script-host contributors. Zlib license.

use script_host::{Engine, OutputBuffer};

#[test]
fn print_goes_to_writer() {
	let mut engine = Engine::new().unwrap();
	let buffer = OutputBuffer::new();
	engine.set_writer(buffer.clone());

	engine.eval("print ('hello! madplay :) ');").unwrap();

	assert_eq!(buffer.contents(), "hello! madplay :) \n");
}

#[test]
fn console_streams_are_split() {
	let mut engine = Engine::new().unwrap();
	let out = OutputBuffer::new();
	let err = OutputBuffer::new();
	engine.set_writer(out.clone());
	engine.set_error_writer(err.clone());

	engine
		.eval("console.log('a', 1); console.info({}); console.warn('careful'); console.error('bad');")
		.unwrap();

	assert_eq!(out.contents(), "a 1\n[object Object]\n");
	assert_eq!(err.contents(), "careful\nbad\n");
}

#[test]
fn output_is_flushed_per_call() {
	let mut engine = Engine::new().unwrap();
	let buffer = OutputBuffer::new();
	engine.set_writer(buffer.clone());
	engine.eval("function greet(name) { print('hi ' + name); }").unwrap();

	let _: () = engine.call("greet", ("madplay",)).unwrap();
	assert_eq!(buffer.contents(), "hi madplay\n");

	buffer.clear();
	let _: () = engine.call("greet", ("kimtaeng",)).unwrap();
	assert_eq!(buffer.contents(), "hi kimtaeng\n");
}

#[test]
fn output_survives_failure() {
	let mut engine = Engine::new().unwrap();
	let buffer = OutputBuffer::new();
	engine.set_writer(buffer.clone());

	let result = engine.eval("print('before'); throw new Error('after');");

	assert!(result.is_err());
	assert_eq!(buffer.contents(), "before\n");
}

#[test]
fn eval_with_prints_to_engine_writer() {
	let mut engine = Engine::new().unwrap();
	let buffer = OutputBuffer::new();
	engine.set_writer(buffer.clone());

	let mut bindings = engine.create_bindings();
	bindings.put("who", "madplay").unwrap();
	engine.eval_with("print('hello ' + who)", &mut bindings).unwrap();

	assert_eq!(buffer.contents(), "hello madplay\n");
}
