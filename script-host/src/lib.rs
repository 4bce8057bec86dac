// Copyright (c) 2023 script-host contributors. Zlib license.

//! `script-host` is a thin host API over an embedded JavaScript engine. It runs scripts on V8 through [deno_core]
//! and uses [serde_json] to move values between Rust and JavaScript.
//!
//! The library does not add a scripting model of its own. It exposes what an embedding host usually needs:
//! looking up an engine, evaluating script text or files, sharing variables through bindings, calling script
//! functions, inspecting returned objects, redirecting `print()` output and running pre-compiled scripts.
//! Two styles are offered: the engine-centric [`Engine`], and the context/value style in [`polyglot`].
//!
//! # Examples
//!
//! ## Evaluate an expression
//!
//! ```rust
//! use script_host::{Engine, EngineManager, ScriptResult};
//!
//! fn main() -> ScriptResult<()> {
//! 	let mut engine: Engine = EngineManager::new().engine_by_name("JavaScript")?;
//! 	let result = engine.eval("Math.min(2, 3)")?;
//!
//! 	assert_eq!(result, 2);
//! 	Ok(())
//! }
//! ```
//!
//! ## Share variables through bindings
//!
//! Values put into the engine are visible as globals; globals defined by the script can be read back:
//!
//! ```rust
//! use script_host::{Engine, ScriptResult};
//!
//! fn main() -> ScriptResult<()> {
//! 	let mut engine = Engine::new()?;
//!
//! 	engine.put("myName", "madplay")?;
//! 	engine.eval("var yourName = ''; if (myName === 'madplay') yourName = 'kimtaeng';")?;
//!
//! 	assert_eq!(engine.get("yourName")?, "kimtaeng");
//! 	Ok(())
//! }
//! ```
//!
//! ## Call a JS function
//!
//! Arguments and return values are serialized via JSON:
//!
//! ```rust
//! use script_host::{Engine, ScriptResult};
//!
//! fn main() -> ScriptResult<()> {
//! 	let mut engine = Engine::new()?;
//! 	engine.eval("function accumulator(a, b) { return a + b; }")?;
//!
//! 	let result: f64 = engine.call("accumulator", (1, 2))?;
//!
//! 	assert_eq!(result, 3.0);
//! 	Ok(())
//! }
//! ```
//!
//! ## Inspect a returned object
//!
//! [`Engine::invoke_function()`] keeps the result inside the engine, so its methods remain callable:
//!
//! ```rust
//! use script_host::{Engine, ScriptResult};
//!
//! fn main() -> ScriptResult<()> {
//! 	let mut engine = Engine::new()?;
//! 	engine.eval("function make(name) { return { name, greet() { return 'hi ' + this.name; } }; }")?;
//!
//! 	let object = engine.invoke_function("make", ("Roger",))?;
//! 	assert_eq!(engine.member_keys(&object)?, vec!["name", "greet"]);
//!
//! 	let greeting = engine.invoke_method(&object, "greet", ())?;
//! 	assert_eq!(engine.display(&greeting)?, "hi Roger");
//! 	Ok(())
//! }
//! ```
//!
//! ## Capture output
//!
//! ```rust
//! use script_host::{Engine, OutputBuffer, ScriptResult};
//!
//! fn main() -> ScriptResult<()> {
//! 	let mut engine = Engine::new()?;
//! 	let buffer = OutputBuffer::new();
//! 	engine.set_writer(buffer.clone());
//!
//! 	engine.eval("print('hello! madplay :)')")?;
//!
//! 	assert_eq!(buffer.contents(), "hello! madplay :)\n");
//! 	Ok(())
//! }
//! ```
//!
//! ## Call a script with timeout
//!
//! The JS code may contain long- or forever-running loops that block Rust code. It is possible to set
//! a timeout, after which JavaScript execution is aborted.
//!
//! ```rust
//! use script_host::{Engine, ScriptError, ScriptResult};
//!
//! fn main() -> ScriptResult<()> {
//! 	use std::time::Duration;
//! 	let mut engine = Engine::new()?.with_timeout(Duration::from_millis(200));
//! 	engine.eval("function run_forever() { for(;;) {} }")?;
//!
//! 	let result: ScriptResult<String> = engine.call("run_forever", ());
//!
//! 	assert!(matches!(result, Err(ScriptError::Terminated)));
//! 	Ok(())
//! }
//! ```
//!
//! [deno_core]: https://docs.rs/deno_core
//! [serde_json]: https://docs.serde.rs/serde_json

pub use bench::{compare, Throughput};
pub use bindings::Bindings;
pub use call_args::CallArgs;
pub use compiled::CompiledScript;
pub use engine::{Engine, ScriptInterface};
pub use factory::{EngineFactory, EngineManager, Parameter};
pub use object::ScriptObject;
pub use output::OutputBuffer;
pub use resource::{ResourcePath, SCRIPT_PATH_VAR};
pub use script_host_macros::script_interface;
pub use util::{eval, eval_json};

/// Represents a value passed to or from JavaScript.
///
/// Currently aliased as serde_json's Value type.
pub type JsValue = serde_json::Value;

/// Error occurring while driving the engine
pub use error::ScriptError;

/// Polymorphic error type able to represent different error domains.
///
/// Reuses [anyhow::Error](../anyhow/enum.Error.html) through deno_core, to make sure the same version of the anyhow crate is used.
pub type AnyError = deno_core::error::AnyError;

/// Wrapper type representing a result that can fail while driving the engine
pub type ScriptResult<T> = Result<T, ScriptError>;

pub mod polyglot;

mod bench;
mod bindings;
mod call_args;
mod compiled;
mod engine;
mod error;
mod factory;
mod object;
mod output;
mod resource;
mod util;
mod value;
