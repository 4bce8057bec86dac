// Copyright (c) 2023 script-host contributors. Zlib license.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::spanned::Spanned as _;

const MAX_PARAMS: usize = 5;
const RENAME_ATTR: &str = "script_name";

/// Turns a trait declaration into a struct whose methods call global script functions.
///
/// Each method takes `&mut self` plus up to five serializable parameters and returns `ScriptResult<T>`,
/// where `T` is deserialized from the function's return value. The script function has the same name as the
/// method unless the method carries `#[script_name = "..."]`.
///
/// The struct is obtained with `Engine::bind_interface()`, which fails if the engine scope lacks any of the
/// functions.
#[proc_macro_attribute]
pub fn script_interface(_attr: TokenStream, input: TokenStream) -> TokenStream {
	let item = syn::parse_macro_input!(input as syn::ItemTrait);

	let output = parse_interface(&item).map(|functions| expand_interface(&item, &functions));
	match output {
		Ok(stream) => stream.into(),
		Err(err) => err.to_compile_error().into(),
	}
}

/// One trait method and the script function behind it.
struct ScriptFn {
	attrs: Vec<syn::Attribute>,
	method: syn::Ident,
	script_name: syn::LitStr,
	params: Vec<(syn::Ident, syn::Type)>,
	output: syn::Type,
}

fn parse_interface(item: &syn::ItemTrait) -> syn::Result<Vec<ScriptFn>> {
	if !item.generics.params.is_empty() {
		return Err(error(item.generics.span(), "script interfaces cannot be generic"));
	}

	item.items
		.iter()
		.map(|entry| match entry {
			syn::TraitItem::Fn(method) => parse_method(method),
			other => Err(error(other.span(), "script interfaces may only declare methods")),
		})
		.collect()
}

fn parse_method(method: &syn::TraitItemFn) -> syn::Result<ScriptFn> {
	let sig = &method.sig;
	if let Some(default) = &method.default {
		return Err(error(default.span(), "the script provides the body; remove it"));
	}
	if sig.constness.is_some() || sig.asyncness.is_some() || sig.unsafety.is_some() {
		return Err(error(sig.span(), "script functions are plain synchronous methods"));
	}
	if !sig.generics.params.is_empty() {
		return Err(error(sig.generics.span(), "script functions cannot be generic"));
	}

	match sig.receiver() {
		Some(receiver) if receiver.reference.is_some() && receiver.mutability.is_some() => {}
		Some(receiver) => return Err(error(receiver.span(), "expected `&mut self`")),
		None => return Err(error(sig.ident.span(), "missing `&mut self` receiver")),
	}

	let params = sig
		.inputs
		.iter()
		.filter_map(|input| match input {
			syn::FnArg::Typed(typed) => Some(parse_param(typed)),
			syn::FnArg::Receiver(_) => None,
		})
		.collect::<syn::Result<Vec<_>>>()?;

	if params.len() > MAX_PARAMS {
		return Err(error(
			sig.inputs.span(),
			&format!("script functions take at most {MAX_PARAMS} parameters"),
		));
	}

	let (script_name, attrs) = split_attrs(method)?;

	Ok(ScriptFn {
		attrs,
		method: sig.ident.clone(),
		script_name,
		params,
		output: parse_output(&sig.output)?,
	})
}

fn parse_param(typed: &syn::PatType) -> syn::Result<(syn::Ident, syn::Type)> {
	match typed.pat.as_ref() {
		syn::Pat::Ident(pat) if pat.by_ref.is_none() && pat.mutability.is_none() && pat.subpat.is_none() => {
			Ok((pat.ident.clone(), (*typed.ty).clone()))
		}
		other => Err(error(other.span(), "parameters must be plain names")),
	}
}

// Separates `#[script_name = "..."]` from the attributes forwarded to the generated method.
fn split_attrs(method: &syn::TraitItemFn) -> syn::Result<(syn::LitStr, Vec<syn::Attribute>)> {
	let ident = &method.sig.ident;
	let mut script_name = syn::LitStr::new(&ident.to_string(), ident.span());
	let mut attrs = Vec::new();

	for attr in &method.attrs {
		if !attr.path().is_ident(RENAME_ATTR) {
			attrs.push(attr.clone());
			continue;
		}

		let value = &attr.meta.require_name_value()?.value;
		match value {
			syn::Expr::Lit(syn::ExprLit {
				lit: syn::Lit::Str(name),
				..
			}) if !name.value().is_empty() => script_name = name.clone(),
			other => return Err(error(other.span(), "expected a non-empty string literal")),
		}
	}

	Ok((script_name, attrs))
}

// Only `ScriptResult<T>` is accepted: every call may fail on the script side.
fn parse_output(output: &syn::ReturnType) -> syn::Result<syn::Type> {
	let expected = "return type must be `ScriptResult<T>`";

	let ty = match output {
		syn::ReturnType::Type(_, ty) => ty,
		syn::ReturnType::Default => return Err(error(output.span(), expected)),
	};
	let segment = match ty.as_ref() {
		syn::Type::Path(path) if path.qself.is_none() => path.path.segments.last(),
		_ => None,
	};

	match segment {
		Some(segment) if segment.ident == "ScriptResult" => match &segment.arguments {
			syn::PathArguments::AngleBracketed(args) if args.args.len() == 1 => match args.args.first() {
				Some(syn::GenericArgument::Type(inner)) => Ok(inner.clone()),
				_ => Err(error(args.span(), expected)),
			},
			_ => Err(error(segment.span(), expected)),
		},
		_ => Err(error(ty.span(), expected)),
	}
}

fn expand_interface(item: &syn::ItemTrait, functions: &[ScriptFn]) -> TokenStream2 {
	let attrs = &item.attrs;
	let vis = &item.vis;
	let name = &item.ident;
	let script_names = functions.iter().map(|f| &f.script_name);
	let methods = functions.iter().map(expand_method);

	quote! {
		#(#attrs)*
		#vis struct #name<'a> {
			engine: &'a mut script_host::Engine,
		}

		impl<'a> #name<'a> {
			#(#methods)*
		}

		impl<'a> script_host::ScriptInterface<'a> for #name<'a> {
			const FUNCTIONS: &'static [&'static str] = &[#(#script_names),*];

			fn from_engine(engine: &'a mut script_host::Engine) -> Self {
				Self { engine }
			}
		}
	}
}

fn expand_method(function: &ScriptFn) -> TokenStream2 {
	let ScriptFn {
		attrs,
		method,
		script_name,
		params,
		output,
	} = function;
	let names: Vec<_> = params.iter().map(|(name, _)| name).collect();
	let types = params.iter().map(|(_, ty)| ty);

	quote! {
		#(#attrs)*
		pub fn #method(&mut self, #(#names: #types),*) -> script_host::ScriptResult<#output> {
			self.engine.call(#script_name, (#(#names,)*))
		}
	}
}

fn error(span: Span, message: &str) -> syn::Error {
	syn::Error::new(span, message)
}
