// Copyright (c) 2023 script-host contributors. Zlib license.

use crate::{Engine, JsValue, ScriptResult};

/// Evaluates a standalone Javascript expression, and returns the result as a JSON value.
///
/// If there is an error, Err will be returned.
/// This function is primarily useful for small standalone experiments. Usually, you would want to use the [`Engine`](struct.Engine.html) struct
/// for more sophisticated Rust->JS interaction.
pub fn eval_json(js_expr: &str) -> ScriptResult<JsValue> {
	let mut engine = Engine::new()?;
	engine.eval(&format!("({js_expr})"))
}

/// Runs JavaScript statements in a throwaway engine, discarding the completion value.
pub fn eval(js_code: &str) -> ScriptResult<()> {
	let mut engine = Engine::new()?;
	engine.eval(js_code)?;

	Ok(())
}
