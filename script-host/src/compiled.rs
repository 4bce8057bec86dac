// Copyright (c) 2023 script-host contributors. Zlib license.

use std::fmt;

use deno_core::v8;
use tracing::debug;

use crate::{value, Engine, JsValue, ScriptResult};

/// A script parsed once, which can be run repeatedly without re-parsing the source.
///
/// The compiled form is not tied to a particular engine scope: running it after
/// [`Engine::set_bindings`](crate::Engine::set_bindings) executes against the new bindings.
pub struct CompiledScript {
	pub(crate) engine_id: u64,
	pub(crate) script: v8::Global<v8::UnboundScript>,
	source_len: usize,
}

impl fmt::Debug for CompiledScript {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("CompiledScript")
			.field("engine_id", &self.engine_id)
			.field("source_len", &self.source_len)
			.finish()
	}
}

impl Engine {
	/// Parses `js_code` without running it.
	///
	/// Syntax errors are reported here rather than on execution.
	pub fn compile(&mut self, js_code: &str) -> ScriptResult<CompiledScript> {
		debug!(engine = self.id(), bytes = js_code.len(), "compiling script");

		let context = self.scope_context();
		let script = self.enter(&context, |scope| {
			let script = value::compile(scope, js_code)?;
			let unbound = script.get_unbound_script(scope);
			Some(v8::Global::new(scope, unbound))
		})?;

		Ok(CompiledScript {
			engine_id: self.id(),
			script,
			source_len: js_code.len(),
		})
	}

	/// Runs a previously compiled script in the current engine scope and returns its completion value.
	pub fn eval_compiled(&mut self, compiled: &CompiledScript) -> ScriptResult<JsValue> {
		self.check_owner(compiled.engine_id, "compiled script")?;

		let context = self.scope_context();
		let text = self.enter(&context, |scope| {
			let unbound = v8::Local::new(scope, &compiled.script);
			let script = unbound.bind_to_current_context(scope);
			let result = script.run(scope)?;
			value::to_json_text(scope, result)
		})?;

		Ok(serde_json::from_str(&text)?)
	}
}
