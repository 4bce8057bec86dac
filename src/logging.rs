// Copyright (c) 2023 script-host contributors. Zlib license.

use std::io;

use tracing_subscriber::EnvFilter;

/// Console logging on stderr, so that stdout carries only the demo output.
///
/// The filter comes from `RUST_LOG` and defaults to `warn`.
pub fn init_logging() {
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(io::stderr)
		.with_target(true)
		.init();
}
