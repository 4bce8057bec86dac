// Copyright (c) 2023 script-host contributors. Zlib license.

use script_host::polyglot::{Context, Source};
use script_host::{EngineManager, ScriptResult};

use crate::config::DemoConfig;

fn sample_source(config: &DemoConfig) -> ScriptResult<Source> {
	Source::from_file("js", config.resources.locate("sample_script.js")?)
}

/// Looks the engine up by its short name, the way a host picks it before switching to contexts.
pub fn simple(_config: &DemoConfig) -> ScriptResult<()> {
	let mut engine = EngineManager::new().engine_by_name("v8")?;
	println!("engine name: {}", engine.factory().engine_name);

	engine.eval("print( Math.min(2, 3) )")?;

	Ok(())
}

pub fn simple_polyglot(_config: &DemoConfig) -> ScriptResult<()> {
	let context = Context::create("js")?;
	context.eval("js", "print( Math.min(2, 3) )")?;

	Ok(())
}

pub fn call_function(config: &DemoConfig) -> ScriptResult<()> {
	let context = Context::create("js")?;
	context.eval_source(&sample_source(config)?)?;

	let accumulator = context.bindings("js")?.member("accumulator")?;
	let result = accumulator.execute((1, 2))?.as_i32()?;
	println!("result: {result}");

	Ok(())
}

pub fn access_object(config: &DemoConfig) -> ScriptResult<()> {
	let context = Context::create("js")?;
	context.eval_source(&sample_source(config)?)?;

	let make_contract = context.bindings("js")?.member("makeContract")?;
	let contract = make_contract.execute(("madplay", "010-1234-1234"))?;

	for key in contract.member_keys()? {
		println!("{key}: {}", contract.member(&key)?);
	}

	Ok(())
}
