// Copyright (c) 2023 script-host contributors. Zlib license.

use serde::Deserialize;

use script_host::{script_interface, Engine, EngineManager, OutputBuffer, Parameter, ScriptResult};

use crate::config::DemoConfig;

const SAMPLE_SCRIPT: &str = "sample_script.js";

const CHOOSE_NAME: &str = "var yourName = ''; \
	if (myName === 'madplay') yourName = 'kimtaeng'; \
	else yourName = 'madplay';";

fn javascript_engine() -> ScriptResult<Engine> {
	EngineManager::new().engine_by_name("JavaScript")
}

/// Prints the metadata of every registered engine factory.
pub fn print_all_engines(_config: &DemoConfig) -> ScriptResult<()> {
	let manager = EngineManager::new();

	for factory in manager.factories() {
		println!("engine name: {}", factory.engine_name);
		println!("engine version: {}", factory.engine_version);
		println!("extensions: {}", factory.extensions.join(", "));
		println!("language name: {}", factory.language_name);
		println!("language version: {}", factory.language_version);
		println!("mimeTypes: {}", factory.mime_types.join(", "));
		println!("shortNames: {}", factory.names.join(", "));

		for parameter in Parameter::ALL {
			let value = factory.parameter(parameter).unwrap_or_default();
			println!("parameter '{parameter}': {value}");
		}
		println!("---------------");
	}

	Ok(())
}

pub fn inline_script(_config: &DemoConfig) -> ScriptResult<()> {
	let mut engine = javascript_engine()?;

	let result = engine.eval("Math.min(2, 3)")?;
	if result.is_i64() {
		println!("{result}");
	}

	Ok(())
}

pub fn script_with_variable(_config: &DemoConfig) -> ScriptResult<()> {
	let mut engine = javascript_engine()?;

	engine.put("myName", "madplay")?;
	engine.eval("var yourName = ''; if (myName === 'madplay') yourName = 'kimtaeng'")?;
	println!("Your name: {}", display(&engine.get("yourName")?));

	Ok(())
}

/// Loads the bundled sample script, inspects the object returned by `makeContract` and calls `accumulator`.
pub fn external_file(config: &DemoConfig) -> ScriptResult<()> {
	let mut engine = javascript_engine()?;
	engine.eval_file(config.resources.locate(SAMPLE_SCRIPT)?)?;

	let contract = engine.invoke_function("makeContract", ("madplay", "010-1234-1234"))?;
	for (key, value) in engine.entries(&contract)? {
		println!("{key}: {}", engine.display(&value)?);
	}

	println!("----------");
	engine.invoke_method(&contract, "print", ())?;
	println!("----------");

	let result: f64 = engine.call("accumulator", (1, 2))?;
	println!("accumulator: {result:?}");

	Ok(())
}

pub fn change_binding_scope(_config: &DemoConfig) -> ScriptResult<()> {
	let mut engine = javascript_engine()?;

	engine.put("myName", "madplay")?;
	engine.eval(CHOOSE_NAME)?;
	println!("Your name: {}", display(&engine.get("yourName")?));
	println!("----------");

	let mut new_bindings = engine.create_bindings();
	new_bindings.put("myName", "kimtaeng")?;
	engine.set_bindings(&new_bindings)?;

	engine.eval(CHOOSE_NAME)?;
	println!("Your name: {}", display(&engine.get("yourName")?));

	Ok(())
}

pub fn explicit_bindings(_config: &DemoConfig) -> ScriptResult<()> {
	let mut engine = javascript_engine()?;

	let mut new_bindings = engine.create_bindings();
	new_bindings.put("myName", "madplay")?;

	engine.eval_with(CHOOSE_NAME, &mut new_bindings)?;

	let from_bindings = new_bindings.get("yourName").cloned().unwrap_or_default();
	println!("Your name: {}", display(&from_bindings));
	println!("Your name(engine): {}", display(&engine.get("yourName")?));

	Ok(())
}

pub fn change_writer(_config: &DemoConfig) -> ScriptResult<()> {
	let mut engine = javascript_engine()?;
	let buffer = OutputBuffer::new();

	// without this line the text goes straight to stdout and the buffer stays empty
	engine.set_writer(buffer.clone());

	engine.eval("print ('hello! madplay :) ');")?;
	println!("StringBuffer: {}", buffer.contents());

	Ok(())
}

pub fn faster_execution(config: &DemoConfig) -> ScriptResult<()> {
	let mut engine = javascript_engine()?;
	let script = config.resources.read_to_string(SAMPLE_SCRIPT)?;

	let throughput = script_host::compare(&mut engine, &script, config.bench_loops)?;
	println!("{throughput}");

	Ok(())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Contract {
	name: String,
	phone_number: String,
}

#[script_interface]
trait SampleScript {
	fn accumulator(&mut self, a: i32, b: i32) -> ScriptResult<i32>;

	#[script_name = "makeContract"]
	fn make_contract(&mut self, name: &str, phone_number: &str) -> ScriptResult<Contract>;
}

/// Calls script functions through a typed Rust facade.
pub fn typed_interface(config: &DemoConfig) -> ScriptResult<()> {
	let mut engine = javascript_engine()?;
	engine.eval_file(config.resources.locate(SAMPLE_SCRIPT)?)?;

	let mut sample: SampleScript = engine.bind_interface()?;
	println!("accumulator (typed): {}", sample.accumulator(1, 2)?);

	let contract = sample.make_contract("madplay", "010-1234-1234")?;
	println!("contract (typed): {} / {}", contract.name, contract.phone_number);

	Ok(())
}

// Strings without quotes, like a host would print them.
fn display(value: &script_host::JsValue) -> String {
	match value {
		script_host::JsValue::String(s) => s.clone(),
		other => other.to_string(),
	}
}
