// Copyright (c) 2023 script-host contributors. Zlib license.

use serde::Serialize;

use crate::{JsValue, ScriptError};

/// A table of named values shared between host and script.
///
/// Bindings live on the host side. They are installed as globals when an engine scope is created from them
/// ([`Engine::set_bindings`](crate::Engine::set_bindings)) or when code is evaluated against them
/// ([`Engine::eval_with`](crate::Engine::eval_with)); in the latter case the globals the script leaves behind
/// are written back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
	values: serde_json::Map<String, JsValue>,
}

impl Bindings {
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores `value` under `key`, returning the previous value.
	pub fn put<V>(&mut self, key: impl Into<String>, value: V) -> Result<Option<JsValue>, ScriptError>
	where
		V: Serialize,
	{
		let value = serde_json::to_value(value)?;
		Ok(self.values.insert(key.into(), value))
	}

	pub fn get(&self, key: &str) -> Option<&JsValue> {
		self.values.get(key)
	}

	pub fn remove(&mut self, key: &str) -> Option<JsValue> {
		self.values.remove(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.values.contains_key(key)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.values.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &JsValue)> {
		self.values.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Merges a snapshot taken from a context, keeping host-only entries that the script did not touch.
	pub(crate) fn absorb(&mut self, snapshot: serde_json::Map<String, JsValue>) {
		self.values.extend(snapshot);
	}
}

impl From<serde_json::Map<String, JsValue>> for Bindings {
	fn from(values: serde_json::Map<String, JsValue>) -> Self {
		Self { values }
	}
}

impl<'a> IntoIterator for &'a Bindings {
	type Item = (&'a String, &'a JsValue);
	type IntoIter = serde_json::map::Iter<'a>;

	fn into_iter(self) -> Self::IntoIter {
		self.values.iter()
	}
}
