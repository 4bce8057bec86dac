// Copyright (c) 2023 script-host contributors. Zlib license.

// Low-level helpers operating inside an entered context. Every function returns `None` when V8 left an
// exception pending, which the caller turns into a `ScriptError` through its `TryCatch`.

use deno_core::v8;

use crate::JsValue;

/// Compiles `code` in the current context.
pub(crate) fn compile<'s>(
	scope: &mut v8::HandleScope<'s>,
	code: &str,
) -> Option<v8::Local<'s, v8::Script>> {
	let source = v8::String::new(scope, code)?;
	v8::Script::compile(scope, source, None)
}

/// Compiles and runs `code`, yielding the completion value.
pub(crate) fn run<'s>(
	scope: &mut v8::HandleScope<'s>,
	code: &str,
) -> Option<v8::Local<'s, v8::Value>> {
	let script = compile(scope, code)?;
	script.run(scope)
}

/// Serializes a script value to JSON text.
///
/// `undefined` becomes `null`; functions and symbols are represented by their string form, mirroring what a
/// host would print for them.
pub(crate) fn to_json_text<'s>(
	scope: &mut v8::HandleScope<'s>,
	value: v8::Local<'s, v8::Value>,
) -> Option<String> {
	if value.is_null_or_undefined() {
		return Some(JsValue::Null.to_string());
	}
	if value.is_function() || value.is_symbol() {
		return Some(JsValue::String(display(scope, value)).to_string());
	}

	let text = v8::json::stringify(scope, value)?;
	Some(text.to_rust_string_lossy(scope))
}

/// Converts a host value into a script value by way of `JSON.parse`.
pub(crate) fn from_json<'s>(
	scope: &mut v8::HandleScope<'s>,
	value: &JsValue,
) -> Option<v8::Local<'s, v8::Value>> {
	let text = v8::String::new(scope, &value.to_string())?;
	v8::json::parse(scope, text)
}

/// Equivalent of `String(value)` in JS.
pub(crate) fn display<'s>(scope: &mut v8::HandleScope<'s>, value: v8::Local<'s, v8::Value>) -> String {
	// ToString throws on symbols
	if value.is_symbol() {
		return value
			.to_detail_string(scope)
			.map(|s| s.to_rust_string_lossy(scope))
			.unwrap_or_default();
	}
	value.to_rust_string_lossy(scope)
}

pub(crate) fn global_get<'s>(
	scope: &mut v8::HandleScope<'s>,
	key: &str,
) -> Option<v8::Local<'s, v8::Value>> {
	let global = scope.get_current_context().global(scope);
	get(scope, global.into(), key)
}

pub(crate) fn global_set(scope: &mut v8::HandleScope, key: &str, value: &JsValue) -> Option<()> {
	let global = scope.get_current_context().global(scope);
	let key = v8::String::new(scope, key)?;
	let value = from_json(scope, value)?;
	global.set(scope, key.into(), value)?;
	Some(())
}

/// Property access that also works on primitives (`"abc".length`).
pub(crate) fn get<'s>(
	scope: &mut v8::HandleScope<'s>,
	target: v8::Local<'s, v8::Value>,
	key: &str,
) -> Option<v8::Local<'s, v8::Value>> {
	let object = target.to_object(scope)?;
	let key = v8::String::new(scope, key)?;
	object.get(scope, key.into())
}

/// Calls `function` with `receiver` as `this`; throws a `TypeError` into the scope if it is not callable.
pub(crate) fn call<'s>(
	scope: &mut v8::HandleScope<'s>,
	function: v8::Local<'s, v8::Value>,
	receiver: v8::Local<'s, v8::Value>,
	args: &[v8::Local<'s, v8::Value>],
	name: &str,
) -> Option<v8::Local<'s, v8::Value>> {
	match v8::Local::<v8::Function>::try_from(function) {
		Ok(function) => function.call(scope, receiver, args),
		Err(_) => {
			throw_type_error(scope, &format!("{name} is not a function"));
			None
		}
	}
}

pub(crate) fn json_args<'s>(
	scope: &mut v8::HandleScope<'s>,
	args: &[JsValue],
) -> Option<Vec<v8::Local<'s, v8::Value>>> {
	args.iter().map(|arg| from_json(scope, arg)).collect()
}

/// Invokes one of the prelude helpers installed on the global object.
pub(crate) fn call_hook<'s>(
	scope: &mut v8::HandleScope<'s>,
	hook: &str,
	args: &[v8::Local<'s, v8::Value>],
) -> Option<v8::Local<'s, v8::Value>> {
	let function = global_get(scope, hook)?;
	let receiver = v8::undefined(scope).into();
	call(scope, function, receiver, args, hook)
}

fn throw_type_error(scope: &mut v8::HandleScope, message: &str) {
	if let Some(message) = v8::String::new(scope, message) {
		let exception = v8::Exception::type_error(scope, message);
		scope.throw_exception(exception);
	}
}
