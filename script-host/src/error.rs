// Copyright (c) 2023 script-host contributors. Zlib license.

use std::path::PathBuf;

use crate::AnyError;

/// Represents an error occurring while driving the embedded engine.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
	/// A value could not be transported between Rust and JS.
	#[error("{0}")]
	Json(#[from] serde_json::Error),

	/// Syntax error, uncaught exception or other failure reported by the engine.
	///
	/// Script exceptions carry a [`deno_core::error::JsError`] which can be recovered with `downcast_ref`.
	#[error("{0}")]
	Runtime(AnyError),

	/// Execution was aborted by the watchdog set through [`Engine::with_timeout`](crate::Engine::with_timeout).
	#[error("Uncaught Error: execution terminated")]
	Terminated,

	#[error("{0}")]
	Io(#[from] std::io::Error),

	/// The requested capability is not offered by this engine.
	#[error("unsupported: {0}")]
	Unsupported(String),

	#[error("no script engine registered for '{0}'")]
	EngineNotFound(String),

	#[error("script resource '{name}' not found in {roots:?}")]
	ResourceNotFound { name: String, roots: Vec<PathBuf> },
}

impl ScriptError {
	/// Returns the engine exception behind this error, if the script threw one.
	pub fn js_error(&self) -> Option<&deno_core::error::JsError> {
		match self {
			ScriptError::Runtime(e) => e.downcast_ref(),
			_ => None,
		}
	}
}

impl From<AnyError> for ScriptError {
	fn from(e: AnyError) -> ScriptError {
		ScriptError::Runtime(e)
	}
}
