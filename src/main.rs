// Copyright (c) 2023 script-host contributors. Zlib license.

//! Runs every embedding demonstration in sequence. A failing demonstration reports its error on stderr and
//! the next one still runs.

mod config;
mod engine_demos;
mod logging;
mod polyglot_demos;

use script_host::ScriptResult;

use crate::config::DemoConfig;

type Demo = fn(&DemoConfig) -> ScriptResult<()>;

const DEMOS: &[(&str, Demo)] = &[
	("print_all_engines", engine_demos::print_all_engines),
	("inline_script", engine_demos::inline_script),
	("script_with_variable", engine_demos::script_with_variable),
	("external_file", engine_demos::external_file),
	("change_binding_scope", engine_demos::change_binding_scope),
	("explicit_bindings", engine_demos::explicit_bindings),
	("change_writer", engine_demos::change_writer),
	("faster_execution", engine_demos::faster_execution),
	("typed_interface", engine_demos::typed_interface),
	("polyglot_simple", polyglot_demos::simple),
	("polyglot_simple_context", polyglot_demos::simple_polyglot),
	("polyglot_call_function", polyglot_demos::call_function),
	("polyglot_access_object", polyglot_demos::access_object),
];

fn main() {
	logging::init_logging();
	let config = DemoConfig::from_env();
	tracing::debug!(?config, "starting demos");

	for (name, demo) in DEMOS {
		tracing::info!(demo = name, "running");
		if let Err(err) = demo(&config) {
			tracing::error!(demo = name, "demo failed");
			eprintln!("{err}");
		}
	}
}
