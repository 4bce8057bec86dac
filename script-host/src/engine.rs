// Copyright (c) 2023 script-host contributors. Zlib license.

use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use deno_core::error::{generic_error, JsError};
use deno_core::{v8, JsRuntime, RuntimeOptions};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::call_args::CallArgs;
use crate::output::{Captured, DRAIN_HOOK, KEYS_HOOK, PRELUDE, SNAPSHOT_HOOK};
use crate::{value, Bindings, EngineFactory, JsValue, ScriptError, ScriptObject, ScriptResult};

static NEXT_ENGINE_ID: AtomicU64 = AtomicU64::new(1);

/// Implemented by the facades generated with [`script_interface`](crate::script_interface).
pub trait ScriptInterface<'a>: Sized {
	/// Names of the global script functions the facade calls.
	const FUNCTIONS: &'static [&'static str];

	fn from_engine(engine: &'a mut Engine) -> Self;
}

/// A JavaScript engine instance: one V8 isolate plus the context that acts as its engine scope.
///
/// The engine scope holds the global bindings that [`eval()`](Self::eval), [`put()`](Self::put) and
/// [`get()`](Self::get) operate on. It can be swapped wholesale with [`set_bindings()`](Self::set_bindings).
///
/// # Panics
///
/// V8 enters an isolate on creation and exits it on drop, so engines living on the same thread must be
/// dropped in the reverse order of their creation. Dropping an older engine while a newer one is alive
/// panics:
///
/// ```rust,no_run
/// use script_host::Engine;
///
/// let first = Engine::new().unwrap();
/// let second = Engine::new().unwrap();
/// drop(first); // panics
/// # drop(second);
/// ```
pub struct Engine {
	id: u64,
	factory: EngineFactory,
	scope: v8::Global<v8::Context>,
	writer: Box<dyn Write>,
	error_writer: Box<dyn Write>,
	timeout: Option<Duration>,
	runtime: JsRuntime,
}

impl Engine {
	// ----------------------------------------------------------------------------------------------------------------------------------------------
	// Constructors and builders

	/// Creates a V8 engine with an empty engine scope, printing to stdout/stderr.
	pub fn new() -> ScriptResult<Self> {
		Self::with_factory(EngineFactory::v8())
	}

	pub(crate) fn with_factory(factory: EngineFactory) -> ScriptResult<Self> {
		let runtime = JsRuntime::new(RuntimeOptions::default());
		let scope = runtime.main_context();

		let mut engine = Engine {
			id: NEXT_ENGINE_ID.fetch_add(1, Ordering::Relaxed),
			factory,
			scope,
			writer: Box::new(io::stdout()),
			error_writer: Box::new(io::stderr()),
			timeout: None,
			runtime,
		};

		let context = engine.scope_context();
		engine.install_prelude(&context)?;
		debug!(engine = engine.id, name = engine.factory.engine_name, "engine created");

		Ok(engine)
	}

	/// Equips this engine with a timeout, meaning that any evaluation or function call is aborted after the specified duration.
	///
	/// Each call is watched by a separate thread, which pulls the plug if the script does not return in time.
	/// Use this for untrusted 3rd-party code, not if you know that your functions always return.
	///
	/// Panics with a zero timeout.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		assert!(timeout > Duration::ZERO);

		self.timeout = Some(timeout);
		self
	}

	/// Redirects `print()` and `console.log()` output.
	pub fn set_writer(&mut self, writer: impl Write + 'static) {
		self.writer = Box::new(writer);
	}

	/// Redirects `console.warn()` and `console.error()` output.
	pub fn set_error_writer(&mut self, writer: impl Write + 'static) {
		self.error_writer = Box::new(writer);
	}

	pub fn factory(&self) -> &EngineFactory {
		&self.factory
	}

	// ----------------------------------------------------------------------------------------------------------------------------------------------
	// Evaluation

	/// Evaluates script text in the engine scope and returns its completion value as JSON.
	///
	/// `undefined` is returned as `null`; functions come back as their source text.
	pub fn eval(&mut self, js_code: &str) -> ScriptResult<JsValue> {
		let context = self.scope_context();
		self.eval_in(&context, js_code)
	}

	/// Loads a .js file and evaluates it in the engine scope.
	pub fn eval_file(&mut self, file: impl AsRef<Path>) -> ScriptResult<JsValue> {
		let file = file.as_ref();
		debug!(engine = self.id, file = %file.display(), "loading script file");

		let js_code = std::fs::read_to_string(file)?;
		self.eval(&js_code)
	}

	/// Like [`eval()`](Self::eval), but keeps the result inside the engine.
	pub fn eval_object(&mut self, js_code: &str) -> ScriptResult<ScriptObject> {
		debug!(engine = self.id, bytes = js_code.len(), "evaluating script");

		let context = self.scope_context();
		let value = self.enter(&context, |scope| {
			let result = value::run(scope, js_code)?;
			Some(v8::Global::new(scope, result))
		})?;

		Ok(self.object(context, value))
	}

	/// Evaluates script text against `bindings` instead of the engine scope.
	///
	/// The code runs in a fresh context seeded with the bindings. Globals it defines are written back into
	/// `bindings`; the engine scope is left untouched.
	pub fn eval_with(&mut self, js_code: &str, bindings: &mut Bindings) -> ScriptResult<JsValue> {
		let context = self.new_context(bindings)?;
		let result = self.eval_in(&context, js_code);

		let snapshot = self.snapshot(&context)?;
		bindings.absorb(snapshot);

		result
	}

	fn eval_in(&mut self, context: &v8::Global<v8::Context>, js_code: &str) -> ScriptResult<JsValue> {
		debug!(engine = self.id, bytes = js_code.len(), "evaluating script");

		let text = self.enter(context, |scope| {
			let result = value::run(scope, js_code)?;
			value::to_json_text(scope, result)
		})?;

		Ok(serde_json::from_str(&text)?)
	}

	// ----------------------------------------------------------------------------------------------------------------------------------------------
	// Bindings

	/// Sets a global variable in the engine scope.
	pub fn put<V>(&mut self, key: &str, value: V) -> ScriptResult<()>
	where
		V: Serialize,
	{
		let value = serde_json::to_value(value)?;
		let context = self.scope_context();
		self.enter(&context, |scope| value::global_set(scope, key, &value))
	}

	/// Reads a global variable from the engine scope; `null` if it does not exist.
	pub fn get(&mut self, key: &str) -> ScriptResult<JsValue> {
		let context = self.scope_context();
		let text = self.enter(&context, |scope| {
			let value = value::global_get(scope, key)?;
			value::to_json_text(scope, value)
		})?;

		Ok(serde_json::from_str(&text)?)
	}

	/// Returns an empty binding table, to be used with [`set_bindings()`](Self::set_bindings) or [`eval_with()`](Self::eval_with).
	pub fn create_bindings(&self) -> Bindings {
		Bindings::new()
	}

	/// Takes a snapshot of the globals defined by the host or by scripts in the engine scope.
	///
	/// Functions are not part of the snapshot. Changing the returned table has no effect until it is passed to
	/// [`set_bindings()`](Self::set_bindings).
	pub fn get_bindings(&mut self) -> ScriptResult<Bindings> {
		let context = self.scope_context();
		Ok(Bindings::from(self.snapshot(&context)?))
	}

	/// Replaces the engine scope by a fresh one holding exactly `bindings`.
	///
	/// Functions and variables defined by earlier evaluations are no longer visible afterwards. Handles obtained
	/// before remain usable.
	pub fn set_bindings(&mut self, bindings: &Bindings) -> ScriptResult<()> {
		self.scope = self.new_context(bindings)?;
		Ok(())
	}

	fn snapshot(
		&mut self,
		context: &v8::Global<v8::Context>,
	) -> ScriptResult<serde_json::Map<String, JsValue>> {
		let text = self.enter(context, |scope| {
			let snapshot = value::call_hook(scope, SNAPSHOT_HOOK, &[])?;
			Some(value::display(scope, snapshot))
		})?;

		Ok(serde_json::from_str(&text)?)
	}

	// ----------------------------------------------------------------------------------------------------------------------------------------------
	// Call API

	/// Invokes a global JavaScript function.
	///
	/// `args_tuple` needs to be a tuple.
	///
	/// Each tuple element is converted to JSON (using serde_json) and passed as a distinct argument to the JS function.
	pub fn call<A, R>(&mut self, fn_name: &str, args_tuple: A) -> ScriptResult<R>
	where
		A: CallArgs,
		R: DeserializeOwned,
	{
		let args = args_tuple.into_arg_values()?;
		let context = self.scope_context();
		let text = self.enter(&context, |scope| {
			let function = value::global_get(scope, fn_name)?;
			let receiver = v8::undefined(scope).into();
			let args = value::json_args(scope, &args)?;
			let result = value::call(scope, function, receiver, &args, fn_name)?;
			value::to_json_text(scope, result)
		})?;

		Ok(serde_json::from_str(&text)?)
	}

	/// Invokes a global JavaScript function and returns its result as a handle.
	pub fn invoke_function<A>(&mut self, fn_name: &str, args_tuple: A) -> ScriptResult<ScriptObject>
	where
		A: CallArgs,
	{
		let args = args_tuple.into_arg_values()?;
		let context = self.scope_context();
		let result = self.enter(&context, |scope| {
			let function = value::global_get(scope, fn_name)?;
			let receiver = v8::undefined(scope).into();
			let args = value::json_args(scope, &args)?;
			let result = value::call(scope, function, receiver, &args, fn_name)?;
			Some(v8::Global::new(scope, result))
		})?;

		Ok(self.object(context, result))
	}

	/// Invokes the method `method_name` on `target`, with `target` bound to `this`.
	pub fn invoke_method<A>(
		&mut self,
		target: &ScriptObject,
		method_name: &str,
		args_tuple: A,
	) -> ScriptResult<ScriptObject>
	where
		A: CallArgs,
	{
		self.check_owner(target.engine_id, "script object")?;
		let args = args_tuple.into_arg_values()?;
		let result = self.enter(&target.context, |scope| {
			let receiver = v8::Local::new(scope, &target.value);
			let method = value::get(scope, receiver, method_name)?;
			let args = value::json_args(scope, &args)?;
			let result = value::call(scope, method, receiver, &args, method_name)?;
			Some(v8::Global::new(scope, result))
		})?;

		Ok(self.object(target.context.clone(), result))
	}

	/// Calls a function handle with `this` set to `undefined`.
	pub fn call_object<A>(&mut self, function: &ScriptObject, args_tuple: A) -> ScriptResult<ScriptObject>
	where
		A: CallArgs,
	{
		self.check_owner(function.engine_id, "script object")?;
		let args = args_tuple.into_arg_values()?;
		let result = self.enter(&function.context, |scope| {
			let callee = v8::Local::new(scope, &function.value);
			let receiver = v8::undefined(scope).into();
			let args = value::json_args(scope, &args)?;
			let result = value::call(scope, callee, receiver, &args, "value")?;
			Some(v8::Global::new(scope, result))
		})?;

		Ok(self.object(function.context.clone(), result))
	}

	/// Binds a facade generated with [`script_interface`](crate::script_interface) to this engine.
	///
	/// Every function the facade declares must already be defined as a global function in the engine scope;
	/// otherwise binding fails with [`ScriptError::Unsupported`] naming the first missing one.
	pub fn bind_interface<'a, I>(&'a mut self) -> ScriptResult<I>
	where
		I: ScriptInterface<'a>,
	{
		let context = self.scope_context();
		for &fn_name in I::FUNCTIONS {
			let callable = self.enter(&context, |scope| {
				Some(value::global_get(scope, fn_name)?.is_function())
			})?;

			if !callable {
				return Err(ScriptError::Unsupported(format!(
					"script does not define a function '{fn_name}'"
				)));
			}
		}

		Ok(I::from_engine(self))
	}

	// ----------------------------------------------------------------------------------------------------------------------------------------------
	// Handle inspection

	/// The global object of the engine scope.
	pub fn global_object(&mut self) -> ScriptResult<ScriptObject> {
		let context = self.scope_context();
		let global = self.enter(&context, |scope| {
			let global: v8::Local<v8::Value> = scope.get_current_context().global(scope).into();
			Some(v8::Global::new(scope, global))
		})?;

		Ok(self.object(context, global))
	}

	/// Reads property `key` of `target`; a missing property yields a handle to `undefined`.
	pub fn member(&mut self, target: &ScriptObject, key: &str) -> ScriptResult<ScriptObject> {
		self.check_owner(target.engine_id, "script object")?;
		let member = self.enter(&target.context, |scope| {
			let target = v8::Local::new(scope, &target.value);
			let member = value::get(scope, target, key)?;
			Some(v8::Global::new(scope, member))
		})?;

		Ok(self.object(target.context.clone(), member))
	}

	pub fn has_member(&mut self, target: &ScriptObject, key: &str) -> ScriptResult<bool> {
		self.check_owner(target.engine_id, "script object")?;
		self.enter(&target.context, |scope| {
			let target = v8::Local::new(scope, &target.value);
			if target.is_null_or_undefined() {
				return Some(false);
			}
			let object = target.to_object(scope)?;
			let key = v8::String::new(scope, key)?;
			object.has(scope, key.into())
		})
	}

	/// Own enumerable property names of `target`, in property order.
	pub fn member_keys(&mut self, target: &ScriptObject) -> ScriptResult<Vec<String>> {
		self.check_owner(target.engine_id, "script object")?;
		let text = self.enter(&target.context, |scope| {
			let target = v8::Local::new(scope, &target.value);
			let keys = value::call_hook(scope, KEYS_HOOK, &[target])?;
			value::to_json_text(scope, keys)
		})?;

		Ok(serde_json::from_str(&text)?)
	}

	/// Key/value pairs of `target`, with the values kept as handles.
	pub fn entries(&mut self, target: &ScriptObject) -> ScriptResult<Vec<(String, ScriptObject)>> {
		self.member_keys(target)?
			.into_iter()
			.map(|key| {
				let member = self.member(target, &key)?;
				Ok((key, member))
			})
			.collect()
	}

	/// Converts the value behind a handle into JSON.
	pub fn to_json(&mut self, target: &ScriptObject) -> ScriptResult<JsValue> {
		self.check_owner(target.engine_id, "script object")?;
		let text = self.enter(&target.context, |scope| {
			let target = v8::Local::new(scope, &target.value);
			value::to_json_text(scope, target)
		})?;

		Ok(serde_json::from_str(&text)?)
	}

	/// Deserializes the value behind a handle.
	pub fn to_value<R>(&mut self, target: &ScriptObject) -> ScriptResult<R>
	where
		R: DeserializeOwned,
	{
		let json = self.to_json(target)?;
		Ok(serde_json::from_value(json)?)
	}

	/// The string a script would get from `String(value)`.
	pub fn display(&mut self, target: &ScriptObject) -> ScriptResult<String> {
		self.check_owner(target.engine_id, "script object")?;
		self.enter(&target.context, |scope| {
			let target = v8::Local::new(scope, &target.value);
			Some(value::display(scope, target))
		})
	}

	pub fn is_callable(&mut self, target: &ScriptObject) -> ScriptResult<bool> {
		self.check_owner(target.engine_id, "script object")?;
		self.enter(&target.context, |scope| {
			Some(v8::Local::new(scope, &target.value).is_function())
		})
	}

	pub fn is_null(&mut self, target: &ScriptObject) -> ScriptResult<bool> {
		self.check_owner(target.engine_id, "script object")?;
		self.enter(&target.context, |scope| {
			Some(v8::Local::new(scope, &target.value).is_null_or_undefined())
		})
	}

	// ----------------------------------------------------------------------------------------------------------------------------------------------
	// Internals

	pub(crate) fn id(&self) -> u64 {
		self.id
	}

	pub(crate) fn scope_context(&self) -> v8::Global<v8::Context> {
		self.scope.clone()
	}

	pub(crate) fn check_owner(&self, engine_id: u64, what: &str) -> ScriptResult<()> {
		if engine_id == self.id {
			Ok(())
		} else {
			Err(ScriptError::Unsupported(format!(
				"{what} belongs to engine #{engine_id}, not #{}",
				self.id
			)))
		}
	}

	fn object(&self, context: v8::Global<v8::Context>, value: v8::Global<v8::Value>) -> ScriptObject {
		ScriptObject {
			engine_id: self.id,
			context,
			value,
		}
	}

	fn install_prelude(&mut self, context: &v8::Global<v8::Context>) -> ScriptResult<()> {
		self.enter(context, |scope| value::run(scope, PRELUDE).map(|_| ()))
	}

	fn new_context(&mut self, bindings: &Bindings) -> ScriptResult<v8::Global<v8::Context>> {
		let context = {
			let scope = &mut self.runtime.handle_scope();
			let context = v8::Context::new(scope);
			v8::Global::new(scope, context)
		};
		debug!(engine = self.id, bindings = bindings.len(), "creating binding scope");

		self.install_prelude(&context)?;
		self.enter(&context, |scope| {
			for (key, value) in bindings.iter() {
				value::global_set(scope, key, value)?;
			}
			Some(())
		})?;

		Ok(context)
	}

	/// Runs `f` inside `context`, translating a pending exception into an error.
	///
	/// `f` returns `None` exactly when V8 reported a failure. Script output produced meanwhile is forwarded to
	/// the writers, whether or not `f` succeeded.
	pub(crate) fn enter<T>(
		&mut self,
		context: &v8::Global<v8::Context>,
		f: impl FnOnce(&mut v8::HandleScope) -> Option<T>,
	) -> ScriptResult<T> {
		let engine_id = self.id;
		let isolate = self.runtime.v8_isolate().thread_safe_handle();
		let watchdog = self
			.timeout
			.map(|timeout| Watchdog::start(isolate.clone(), timeout));

		let (outcome, captured) = {
			let scope = &mut self.runtime.handle_scope();
			let context = v8::Local::new(scope, context);
			let scope = &mut v8::ContextScope::new(scope, context);
			let tc = &mut v8::TryCatch::new(scope);

			let outcome = match f(tc) {
				Some(value) => Ok(value),
				None if tc.has_terminated() => Err(Failure::Terminated),
				None => Err(Failure::Exception(
					tc.exception().map(|exception| v8::Global::new(tc, exception)),
				)),
			};

			// The drain hook is JS and cannot run while termination is pending.
			if let Some(watchdog) = watchdog {
				if watchdog.stop() {
					warn!(engine = engine_id, "script execution terminated by timeout");
					isolate.cancel_terminate_execution();
				}
			}

			(outcome, drain(tc))
		};

		self.flush(captured)?;

		match outcome {
			Ok(value) => Ok(value),
			Err(Failure::Terminated) => Err(ScriptError::Terminated),
			Err(Failure::Exception(Some(exception))) => Err(self.js_error(exception)),
			Err(Failure::Exception(None)) => Err(ScriptError::Runtime(generic_error(
				"script execution failed without an exception",
			))),
		}
	}

	// Built in the main context, which carries the runtime state deno_core needs to format errors.
	fn js_error(&mut self, exception: v8::Global<v8::Value>) -> ScriptError {
		let scope = &mut self.runtime.handle_scope();
		let exception = v8::Local::new(scope, exception);
		ScriptError::Runtime(JsError::from_v8_exception(scope, exception).into())
	}

	fn flush(&mut self, captured: Captured) -> ScriptResult<()> {
		if captured.is_empty() {
			return Ok(());
		}
		if !captured.out.is_empty() {
			self.writer.write_all(captured.out.as_bytes())?;
			self.writer.flush()?;
		}
		if !captured.err.is_empty() {
			self.error_writer.write_all(captured.err.as_bytes())?;
			self.error_writer.flush()?;
		}
		Ok(())
	}
}

impl fmt::Debug for Engine {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("Engine")
			.field("id", &self.id)
			.field("engine", &self.factory.engine_name)
			.field("timeout", &self.timeout)
			.finish_non_exhaustive()
	}
}

enum Failure {
	Terminated,
	Exception(Option<v8::Global<v8::Value>>),
}

/// Collects the output buffered by `print()`/`console` since the last call.
fn drain(scope: &mut v8::HandleScope) -> Captured {
	let text = value::call_hook(scope, DRAIN_HOOK, &[]).and_then(|v| value::to_json_text(scope, v));

	match text.map(|text| serde_json::from_str::<(String, String)>(&text)) {
		Some(Ok((out, err))) => Captured { out, err },
		_ => Captured::default(),
	}
}

/// Terminates the isolate unless stopped within the timeout.
struct Watchdog {
	stop: mpsc::Sender<()>,
	thread: thread::JoinHandle<bool>,
}

impl Watchdog {
	fn start(handle: v8::IsolateHandle, timeout: Duration) -> Self {
		let (stop, stopped) = mpsc::channel();
		let thread = thread::spawn(move || match stopped.recv_timeout(timeout) {
			Err(mpsc::RecvTimeoutError::Timeout) => handle.terminate_execution(),
			_ => false,
		});

		Self { stop, thread }
	}

	/// Returns whether the isolate was terminated.
	fn stop(self) -> bool {
		let _ = self.stop.send(());
		self.thread.join().unwrap_or(false)
	}
}
