// Copyright (c) 2023 script-host contributors. Zlib license.

use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{ScriptError, ScriptResult};

/// Environment variable holding extra script roots, in the platform's path-list syntax.
pub const SCRIPT_PATH_VAR: &str = "SCRIPT_HOST_PATH";

/// Ordered list of directories searched for script resources, first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcePath {
	roots: Vec<PathBuf>,
}

impl ResourcePath {
	pub fn new<I, P>(roots: I) -> Self
	where
		I: IntoIterator<Item = P>,
		P: Into<PathBuf>,
	{
		Self {
			roots: roots.into_iter().map(Into::into).collect(),
		}
	}

	/// Roots from `SCRIPT_HOST_PATH`, followed by the scripts bundled with this crate.
	pub fn from_env() -> Self {
		let mut path = match env::var_os(SCRIPT_PATH_VAR) {
			Some(value) => Self::new(env::split_paths(&value)),
			None => Self::default(),
		};
		path.push(Self::bundled_root());
		path
	}

	/// Directory of the scripts shipped with this crate.
	pub fn bundled_root() -> PathBuf {
		Path::new(env!("CARGO_MANIFEST_DIR")).join("resources")
	}

	pub fn push(&mut self, root: impl Into<PathBuf>) {
		self.roots.push(root.into());
	}

	pub fn roots(&self) -> &[PathBuf] {
		&self.roots
	}

	/// Resolves `name` (a relative path such as `sample_script.js`) against the roots.
	pub fn locate(&self, name: &str) -> ScriptResult<PathBuf> {
		let found = self
			.roots
			.iter()
			.map(|root| root.join(name))
			.find(|candidate| candidate.is_file());

		match found {
			Some(path) => {
				debug!(resource = name, path = %path.display(), "resolved script resource");
				Ok(path)
			}
			None => Err(ScriptError::ResourceNotFound {
				name: name.to_string(),
				roots: self.roots.clone(),
			}),
		}
	}

	pub fn read_to_string(&self, name: &str) -> ScriptResult<String> {
		let path = self.locate(name)?;
		Ok(std::fs::read_to_string(path)?)
	}
}
