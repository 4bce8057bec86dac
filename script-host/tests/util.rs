// Copyright (c) 2023 script-host contributors. Zlib license.

#![allow(dead_code)]

use deno_core::error::JsError;

use script_host::{ScriptError, ScriptResult};

pub fn expect_error<T>(result: ScriptResult<T>, error_type: &str) -> JsError {
	let err = match result {
		Ok(_) => panic!("Call with {} must not succeed", error_type),
		Err(e) => e,
	};

	let err = err
		.js_error()
		.unwrap_or_else(|| panic!("{} must lead to JsError type, got: {:?}", error_type, err))
		.clone();

	println!("Expected error occurred:\n{}", err.exception_message);
	err
}

pub fn expect_unsupported<T>(result: ScriptResult<T>) -> String {
	match result {
		Err(ScriptError::Unsupported(reason)) => reason,
		Err(other) => panic!("expected unsupported error, got: {other}"),
		Ok(_) => panic!("call must not succeed"),
	}
}
