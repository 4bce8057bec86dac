// Copyright (c) 2023 script-host contributors. Zlib license.

use std::fmt;

use deno_core::v8;

/// Opaque handle to a value living inside an engine.
///
/// Unlike the JSON values returned by [`Engine::eval`](crate::Engine::eval), a handle keeps functions, methods and
/// object identity intact. Inspect it through the engine that produced it, e.g. with
/// [`Engine::entries`](crate::Engine::entries) or [`Engine::invoke_method`](crate::Engine::invoke_method).
#[derive(Clone)]
pub struct ScriptObject {
	pub(crate) engine_id: u64,
	pub(crate) context: v8::Global<v8::Context>,
	pub(crate) value: v8::Global<v8::Value>,
}

impl fmt::Debug for ScriptObject {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("ScriptObject")
			.field("engine_id", &self.engine_id)
			.finish_non_exhaustive()
	}
}
