// Copyright (c) 2023 script-host contributors. Zlib license.

use serde::Serialize;

use crate::{JsValue, ScriptError};

/// Sealing token
mod private {
	pub trait Sealed {}
}

/// Trait that is implemented for types that can be passed as arguments to a script function.
///
/// This is currently only implemented for tuples of size 0..=5, i.e. JS functions with 0 to 5 arguments.
/// Use structs or arrays inside a one-element tuple if you need more flexibility.
pub trait CallArgs: private::Sealed {
	fn into_arg_values(self) -> Result<Vec<JsValue>, ScriptError>;
}

impl private::Sealed for () {}
impl CallArgs for () {
	fn into_arg_values(self) -> Result<Vec<JsValue>, ScriptError> {
		Ok(Vec::new())
	}
}

impl private::Sealed for Vec<JsValue> {}
impl CallArgs for Vec<JsValue> {
	fn into_arg_values(self) -> Result<Vec<JsValue>, ScriptError> {
		Ok(self)
	}
}

macro_rules! impl_call_args {
	($($param:ident),+) => {
		#[allow(non_snake_case)]
		impl<$($param),+> private::Sealed for ($($param),+,) {}

		#[allow(non_snake_case)] // use generic params as variable names
		impl<$($param),+> CallArgs for ($($param),+,)
			where $($param : Serialize),+
		{
			fn into_arg_values(self) -> Result<Vec<JsValue>, ScriptError> {
				let ($($param),+,) = self;
				Ok(vec![
					$(
						serde_json::to_value($param)?
					),+
				])
			}
		}
	}
}

impl_call_args!(P0);
impl_call_args!(P0, P1);
impl_call_args!(P0, P1, P2);
impl_call_args!(P0, P1, P2, P3);
impl_call_args!(P0, P1, P2, P3, P4);

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[derive(Serialize)]
	struct Contact {
		name: &'static str,
		phone: &'static str,
	}

	#[test]
	fn empty_tuple_has_no_args() {
		assert!(().into_arg_values().unwrap().is_empty());
	}

	#[test]
	fn mixed_tuple_keeps_order() {
		let args = ("madplay", 2, true).into_arg_values().unwrap();
		assert_eq!(args, vec![json!("madplay"), json!(2), json!(true)]);
	}

	#[test]
	fn struct_becomes_object() {
		let contact = Contact {
			name: "madplay",
			phone: "010-1234-1234",
		};
		let args = (&contact,).into_arg_values().unwrap();
		assert_eq!(
			args,
			vec![json!({"name": "madplay", "phone": "010-1234-1234"})]
		);
	}
}
