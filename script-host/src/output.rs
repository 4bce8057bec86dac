// Copyright (c) 2023 script-host contributors. Zlib license.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

/// Bootstrap code installed into every context the engine creates.
///
/// `print()` and `console` only append to buffers on the global object; the host drains them after each call
/// and forwards the text to its writers. All helpers are non-enumerable so that they never show up in binding
/// snapshots.
pub(crate) const PRELUDE: &str = r#"
(function (global) {
	const define = (name, value) => {
		try {
			Object.defineProperty(global, name, {
				value, writable: true, configurable: true, enumerable: false,
			});
		} catch (_) {
			// non-configurable builtin
			global[name] = value;
		}
	};
	const format = (args) => args.map((arg) => String(arg)).join(' ') + '\n';

	define('__hostOut', []);
	define('__hostErr', []);
	define('__hostBaseline', new Set(Object.keys(global)));

	const out = (...args) => { global.__hostOut.push(format(args)); };
	const err = (...args) => { global.__hostErr.push(format(args)); };
	define('print', out);
	define('console', { log: out, info: out, debug: out, warn: err, error: err });

	define('__hostDrain', () => {
		const drained = [global.__hostOut.join(''), global.__hostErr.join('')];
		global.__hostOut = [];
		global.__hostErr = [];
		return drained;
	});
	define('__hostKeys', (obj) => Object.keys(Object(obj)));
	define('__hostSnapshot', () => {
		const snapshot = {};
		for (const key of Object.keys(global)) {
			if (global.__hostBaseline.has(key)) {
				continue;
			}
			const value = global[key];
			if (typeof value === 'function' || typeof value === 'symbol') {
				continue;
			}
			snapshot[key] = value === undefined ? null : value;
		}
		return JSON.stringify(snapshot);
	});
})(globalThis);
"#;

pub(crate) const DRAIN_HOOK: &str = "__hostDrain";
pub(crate) const KEYS_HOOK: &str = "__hostKeys";
pub(crate) const SNAPSHOT_HOOK: &str = "__hostSnapshot";

/// Text printed by a script during one call, split by destination stream.
#[derive(Debug, Default)]
pub(crate) struct Captured {
	pub out: String,
	pub err: String,
}

impl Captured {
	pub fn is_empty(&self) -> bool {
		self.out.is_empty() && self.err.is_empty()
	}
}

/// In-memory writer that can be handed to an engine and read back afterwards.
///
/// Clones share the same buffer, so keep one clone and pass the other to
/// [`Engine::set_writer`](crate::Engine::set_writer).
#[derive(Clone, Default)]
pub struct OutputBuffer {
	bytes: Rc<RefCell<Vec<u8>>>,
}

impl OutputBuffer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Everything written so far, decoded lossily as UTF-8.
	pub fn contents(&self) -> String {
		String::from_utf8_lossy(&self.bytes.borrow()).into_owned()
	}

	pub fn clear(&self) {
		self.bytes.borrow_mut().clear();
	}

	pub fn is_empty(&self) -> bool {
		self.bytes.borrow().is_empty()
	}
}

impl Write for OutputBuffer {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.bytes.borrow_mut().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

impl fmt::Debug for OutputBuffer {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("OutputBuffer")
			.field("contents", &self.contents())
			.finish()
	}
}
