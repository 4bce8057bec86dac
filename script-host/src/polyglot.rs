// Copyright (c) 2023 script-host contributors. Zlib license.

//! Context-style host API.
//!
//! Where [`Engine`] exposes the engine directly, a [`Context`] hands out [`Value`]s that borrow their context,
//! so members can be read and functions executed without going back through the engine:
//!
//! ```rust
//! use script_host::polyglot::{Context, Source};
//! use script_host::ScriptResult;
//!
//! fn main() -> ScriptResult<()> {
//! 	let context = Context::create("js")?;
//! 	context.eval_source(&Source::new("js", "add.js", "function add(a, b) { return a + b; }"))?;
//!
//! 	let add = context.bindings("js")?.member("add")?;
//! 	assert_eq!(add.execute((1, 2))?.as_i32()?, 3);
//! 	Ok(())
//! }
//! ```

use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::ops::Range;
use std::path::Path;

use crate::{CallArgs, Engine, EngineManager, JsValue, ScriptError, ScriptObject, ScriptResult};

const I64_RANGE: Range<f64> = i64::MIN as f64..i64::MAX as f64;

/// Script text tagged with its language and a name for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
	language: String,
	name: String,
	code: String,
}

impl Source {
	pub fn new(language: impl Into<String>, name: impl Into<String>, code: impl Into<String>) -> Self {
		Self {
			language: language.into(),
			name: name.into(),
			code: code.into(),
		}
	}

	/// Reads the source from a file; its file name becomes the source name.
	pub fn from_file(language: impl Into<String>, file: impl AsRef<Path>) -> ScriptResult<Self> {
		let file = file.as_ref();
		let name = file
			.file_name()
			.and_then(|s| s.to_str())
			.unwrap_or("source.js")
			.to_owned();
		let code = std::fs::read_to_string(file)?;

		Ok(Self::new(language, name, code))
	}

	pub fn language(&self) -> &str {
		&self.language
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn code(&self) -> &str {
		&self.code
	}
}

/// An isolated execution context for one language.
///
/// # Panics
///
/// Every context owns a V8 isolate, and isolates must be dropped in the reverse order of their creation (this
/// includes isolates owned by an [`Engine`]). Dropping an older context while a newer one is alive panics.
/// Values cannot outlive their context, so keeping contexts in nested scopes is enough.
pub struct Context {
	language: String,
	engine: RefCell<Engine>,
}

impl Context {
	/// Creates a context for `language`, which must name a registered engine.
	pub fn create(language: &str) -> ScriptResult<Self> {
		let engine = match EngineManager::new().engine_by_name(language) {
			Ok(engine) => engine,
			Err(ScriptError::EngineNotFound(_)) => {
				return Err(ScriptError::Unsupported(format!(
					"language '{language}' is not available"
				)))
			}
			Err(e) => return Err(e),
		};

		Ok(Self {
			language: language.to_string(),
			engine: RefCell::new(engine),
		})
	}

	pub fn language(&self) -> &str {
		&self.language
	}

	/// Evaluates `code`, which must be written in this context's language.
	pub fn eval(&self, language: &str, code: &str) -> ScriptResult<Value<'_>> {
		self.check_language(language)?;
		let handle = self.engine.borrow_mut().eval_object(code)?;
		Ok(self.value(handle))
	}

	pub fn eval_source(&self, source: &Source) -> ScriptResult<Value<'_>> {
		tracing::debug!(source = source.name(), "evaluating source");
		self.eval(source.language(), source.code())
	}

	/// The top-level bindings of `language`, i.e. its global object.
	pub fn bindings(&self, language: &str) -> ScriptResult<Value<'_>> {
		self.check_language(language)?;
		let handle = self.engine.borrow_mut().global_object()?;
		Ok(self.value(handle))
	}

	/// Redirects `print()` and `console.log()` output of this context.
	pub fn set_output(&self, writer: impl Write + 'static) {
		self.engine.borrow_mut().set_writer(writer);
	}

	fn check_language(&self, language: &str) -> ScriptResult<()> {
		let engine = self.engine.borrow();
		if engine.factory().names.iter().any(|n| *n == language) {
			Ok(())
		} else {
			Err(ScriptError::Unsupported(format!(
				"context for '{}' cannot evaluate '{language}'",
				self.language
			)))
		}
	}

	fn value(&self, handle: ScriptObject) -> Value<'_> {
		Value {
			context: self,
			handle,
		}
	}
}

impl fmt::Debug for Context {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("Context")
			.field("language", &self.language)
			.finish_non_exhaustive()
	}
}

/// A script value bound to the context it came from.
///
/// The borrow keeps the context, and with it the isolate, alive for as long as the value is:
///
/// ```rust,compile_fail
/// use script_host::polyglot::Context;
///
/// let value = {
/// 	let context = Context::create("js").unwrap();
/// 	context.eval("js", "42").unwrap()
/// };
/// println!("{value}");
/// ```
#[derive(Clone)]
pub struct Value<'c> {
	context: &'c Context,
	handle: ScriptObject,
}

impl<'c> Value<'c> {
	pub fn member(&self, key: &str) -> ScriptResult<Value<'c>> {
		let handle = self.engine().borrow_mut().member(&self.handle, key)?;
		Ok(self.wrap(handle))
	}

	pub fn has_member(&self, key: &str) -> ScriptResult<bool> {
		self.engine().borrow_mut().has_member(&self.handle, key)
	}

	pub fn member_keys(&self) -> ScriptResult<Vec<String>> {
		self.engine().borrow_mut().member_keys(&self.handle)
	}

	pub fn can_execute(&self) -> ScriptResult<bool> {
		self.engine().borrow_mut().is_callable(&self.handle)
	}

	/// Calls this value as a function.
	pub fn execute<A>(&self, args_tuple: A) -> ScriptResult<Value<'c>>
	where
		A: CallArgs,
	{
		let handle = self.engine().borrow_mut().call_object(&self.handle, args_tuple)?;
		Ok(self.wrap(handle))
	}

	/// Calls the method `name` of this value.
	pub fn invoke_member<A>(&self, name: &str, args_tuple: A) -> ScriptResult<Value<'c>>
	where
		A: CallArgs,
	{
		let handle = self
			.engine()
			.borrow_mut()
			.invoke_method(&self.handle, name, args_tuple)?;
		Ok(self.wrap(handle))
	}

	pub fn is_null(&self) -> ScriptResult<bool> {
		self.engine().borrow_mut().is_null(&self.handle)
	}

	pub fn to_json(&self) -> ScriptResult<JsValue> {
		self.engine().borrow_mut().to_json(&self.handle)
	}

	pub fn as_i32(&self) -> ScriptResult<i32> {
		let number = self.as_i64()?;
		i32::try_from(number).map_err(|_| self.mismatch("i32"))
	}

	pub fn as_i64(&self) -> ScriptResult<i64> {
		let json = self.to_json()?;
		match json.as_i64() {
			Some(number) => Ok(number),
			// integral doubles such as 3.0, unless the cast would saturate
			None => match json.as_f64() {
				Some(number) if number.fract() == 0.0 && I64_RANGE.contains(&number) => Ok(number as i64),
				_ => Err(self.mismatch("i64")),
			},
		}
	}

	pub fn as_f64(&self) -> ScriptResult<f64> {
		self.to_json()?.as_f64().ok_or_else(|| self.mismatch("f64"))
	}

	pub fn as_bool(&self) -> ScriptResult<bool> {
		self.to_json()?.as_bool().ok_or_else(|| self.mismatch("bool"))
	}

	pub fn as_string(&self) -> ScriptResult<String> {
		match self.to_json()? {
			JsValue::String(s) => Ok(s),
			_ => Err(self.mismatch("string")),
		}
	}

	/// The handle behind this value, for use with [`Engine`] methods.
	pub fn handle(&self) -> &ScriptObject {
		&self.handle
	}

	fn engine(&self) -> &'c RefCell<Engine> {
		&self.context.engine
	}

	fn wrap(&self, handle: ScriptObject) -> Value<'c> {
		Value {
			context: self.context,
			handle,
		}
	}

	fn mismatch(&self, expected: &str) -> ScriptError {
		ScriptError::Unsupported(format!("value '{self}' cannot be converted to {expected}"))
	}
}

impl fmt::Display for Value<'_> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self.engine().borrow_mut().display(&self.handle) {
			Ok(text) => f.write_str(&text),
			Err(_) => f.write_str("<unprintable value>"),
		}
	}
}

impl fmt::Debug for Value<'_> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_tuple("Value").field(&self.handle).finish()
	}
}
