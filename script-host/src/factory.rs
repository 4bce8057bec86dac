// Copyright (c) 2023 script-host contributors. Zlib license.

use std::fmt;

use crate::{Engine, ScriptError, ScriptResult};

/// Keys of the metadata every factory exposes through [`EngineFactory::parameter()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
	Name,
	Engine,
	EngineVersion,
	Language,
	LanguageVersion,
}

impl Parameter {
	pub const ALL: [Parameter; 5] = [
		Parameter::Name,
		Parameter::Engine,
		Parameter::EngineVersion,
		Parameter::Language,
		Parameter::LanguageVersion,
	];

	pub fn key(self) -> &'static str {
		match self {
			Parameter::Name => "script.name",
			Parameter::Engine => "script.engine",
			Parameter::EngineVersion => "script.engine_version",
			Parameter::Language => "script.language",
			Parameter::LanguageVersion => "script.language_version",
		}
	}
}

impl fmt::Display for Parameter {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.key())
	}
}

/// Describes an engine implementation and creates engines of that kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFactory {
	pub engine_name: &'static str,
	pub engine_version: &'static str,
	pub extensions: &'static [&'static str],
	pub language_name: &'static str,
	pub language_version: &'static str,
	pub mime_types: &'static [&'static str],
	pub names: &'static [&'static str],
}

impl EngineFactory {
	/// The V8 engine linked through `deno_core`.
	pub fn v8() -> Self {
		Self {
			engine_name: "V8 (deno_core)",
			engine_version: deno_core::v8_version(),
			extensions: &["js", "mjs", "cjs"],
			language_name: "ECMAScript",
			language_version: "ECMA-262",
			mime_types: &[
				"application/javascript",
				"application/ecmascript",
				"text/javascript",
				"text/ecmascript",
			],
			names: &[
				"v8",
				"V8",
				"js",
				"JS",
				"JavaScript",
				"javascript",
				"ECMAScript",
				"ecmascript",
			],
		}
	}

	/// Looks up a metadata value; `Name` is the first short name.
	pub fn parameter(&self, parameter: Parameter) -> Option<String> {
		let value = match parameter {
			Parameter::Name => self.names.first().copied()?,
			Parameter::Engine => self.engine_name,
			Parameter::EngineVersion => self.engine_version,
			Parameter::Language => self.language_name,
			Parameter::LanguageVersion => self.language_version,
		};
		Some(value.to_string())
	}

	pub fn get_engine(&self) -> ScriptResult<Engine> {
		Engine::with_factory(self.clone())
	}
}

/// Registry of engine factories, queried by name, file extension or MIME type.
#[derive(Debug, Clone)]
pub struct EngineManager {
	factories: Vec<EngineFactory>,
}

impl EngineManager {
	pub fn new() -> Self {
		Self {
			factories: vec![EngineFactory::v8()],
		}
	}

	/// Adds a factory; it takes precedence over earlier registrations with overlapping names.
	pub fn register(&mut self, factory: EngineFactory) {
		self.factories.insert(0, factory);
	}

	pub fn factories(&self) -> &[EngineFactory] {
		&self.factories
	}

	pub fn factory_by_name(&self, name: &str) -> Option<&EngineFactory> {
		self.factories.iter().find(|f| f.names.iter().any(|n| *n == name))
	}

	pub fn engine_by_name(&self, name: &str) -> ScriptResult<Engine> {
		self.create(self.factory_by_name(name), name)
	}

	/// Matches with or without the leading dot (`"js"` and `".js"`).
	pub fn factory_by_extension(&self, extension: &str) -> Option<&EngineFactory> {
		let extension = extension.trim_start_matches('.');
		self.factories
			.iter()
			.find(|f| f.extensions.iter().any(|e| *e == extension))
	}

	pub fn factory_by_mime_type(&self, mime_type: &str) -> Option<&EngineFactory> {
		self.factories
			.iter()
			.find(|f| f.mime_types.iter().any(|m| *m == mime_type))
	}

	pub fn engine_by_extension(&self, extension: &str) -> ScriptResult<Engine> {
		let query = extension.trim_start_matches('.');
		self.create(self.factory_by_extension(extension), query)
	}

	pub fn engine_by_mime_type(&self, mime_type: &str) -> ScriptResult<Engine> {
		self.create(self.factory_by_mime_type(mime_type), mime_type)
	}

	fn create(&self, factory: Option<&EngineFactory>, query: &str) -> ScriptResult<Engine> {
		match factory {
			Some(factory) => factory.get_engine(),
			None => Err(ScriptError::EngineNotFound(query.to_string())),
		}
	}
}

impl Default for EngineManager {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn v8_parameters() {
		let factory = EngineFactory::v8();

		assert_eq!(factory.parameter(Parameter::Name).as_deref(), Some("v8"));
		assert_eq!(
			factory.parameter(Parameter::Language).as_deref(),
			Some("ECMAScript")
		);
		assert!(!factory.parameter(Parameter::EngineVersion).unwrap().is_empty());
	}

	#[test]
	fn lookup_by_any_short_name() {
		let manager = EngineManager::new();

		for name in ["JavaScript", "js", "v8"] {
			let factory = manager.factory_by_name(name).expect("registered");
			assert_eq!(factory.engine_name, "V8 (deno_core)");
		}
		assert!(manager.factory_by_name("python").is_none());
	}

	#[test]
	fn lookup_by_extension_ignores_leading_dot() {
		let manager = EngineManager::new();

		for extension in ["js", ".js", "mjs", ".cjs"] {
			let factory = manager.factory_by_extension(extension).expect("registered");
			assert_eq!(factory.language_name, "ECMAScript");
		}
		assert!(manager.factory_by_extension(".py").is_none());
		assert!(manager.factory_by_extension("").is_none());
	}

	#[test]
	fn lookup_by_mime_type() {
		let manager = EngineManager::new();

		assert!(manager.factory_by_mime_type("application/javascript").is_some());
		assert!(manager.factory_by_mime_type("text/ecmascript").is_some());
		assert!(manager.factory_by_mime_type("application/json").is_none());
	}

	#[test]
	fn unknown_mime_type_is_not_found() {
		let manager = EngineManager::new();
		let err = manager.engine_by_mime_type("text/x-python").unwrap_err();

		assert!(matches!(err, ScriptError::EngineNotFound(q) if q == "text/x-python"));
	}

	#[test]
	fn registered_factory_wins() {
		let mut manager = EngineManager::new();
		let custom = EngineFactory {
			engine_name: "custom",
			names: &["js"],
			..EngineFactory::v8()
		};
		manager.register(custom);

		assert_eq!(manager.factories().len(), 2);
		assert_eq!(manager.factory_by_name("js").unwrap().engine_name, "custom");
		assert_eq!(
			manager.factory_by_name("JavaScript").unwrap().engine_name,
			"V8 (deno_core)"
		);
	}
}
