// Copyright (c) 2023 script-host contributors. Zlib license.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::{Engine, ScriptResult};

/// Wall-clock time spent running the same script repeatedly, parsed each time versus compiled once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throughput {
	pub iterations: u32,
	pub naive: Duration,
	pub compiled: Duration,
}

impl Throughput {
	/// How many times faster the compiled loop was; `None` if it took no measurable time.
	pub fn speedup(&self) -> Option<f64> {
		if self.compiled.is_zero() {
			None
		} else {
			Some(self.naive.as_secs_f64() / self.compiled.as_secs_f64())
		}
	}
}

impl fmt::Display for Throughput {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		writeln!(f, "script: {} ms", self.naive.as_millis())?;
		write!(f, "compiled script: {} ms", self.compiled.as_millis())
	}
}

/// Runs `js_code` `iterations` times with [`Engine::eval`], then as many times with [`Engine::eval_compiled`].
pub fn compare(engine: &mut Engine, js_code: &str, iterations: u32) -> ScriptResult<Throughput> {
	let start = Instant::now();
	for _ in 0..iterations {
		engine.eval(js_code)?;
	}
	let naive = start.elapsed();

	let compiled_script = engine.compile(js_code)?;
	let start = Instant::now();
	for _ in 0..iterations {
		engine.eval_compiled(&compiled_script)?;
	}
	let compiled = start.elapsed();

	debug!(iterations, ?naive, ?compiled, "throughput measured");

	Ok(Throughput {
		iterations,
		naive,
		compiled,
	})
}
