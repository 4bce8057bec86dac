// Copyright (c) 2023 script-host contributors. Zlib license.

use std::env;

use script_host::ResourcePath;

pub const BENCH_LOOPS_VAR: &str = "SCRIPT_HOST_BENCH_LOOPS";
const DEFAULT_BENCH_LOOPS: u32 = 100_000;

/// Settings of a demo run, taken from the environment.
#[derive(Debug, Clone)]
pub struct DemoConfig {
	pub resources: ResourcePath,
	pub bench_loops: u32,
}

impl DemoConfig {
	pub fn from_env() -> Self {
		let bench_loops = match env::var(BENCH_LOOPS_VAR) {
			Ok(value) => value.parse().unwrap_or_else(|_| {
				tracing::warn!(value = %value, "invalid {BENCH_LOOPS_VAR}, using {DEFAULT_BENCH_LOOPS}");
				DEFAULT_BENCH_LOOPS
			}),
			Err(_) => DEFAULT_BENCH_LOOPS,
		};

		Self {
			resources: ResourcePath::from_env(),
			bench_loops,
		}
	}
}
