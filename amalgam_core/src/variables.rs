//! Variable substitution for `${NAME}` references.
//!
//! Substitution is a single tokenising pass over a file's text. Each
//! `${NAME}` token whose name is present in the [`VariableMap`] is replaced by
//! its value. Unknown names are left exactly as written.

use std::collections::HashMap;

use derive_more::Deref;
use logos::Logos;
use serde::Deserialize;

use crate::AmalgamError;
use crate::AmalgamResult;

/// Raw tokens produced by logos for the substitution pass. Every byte of the
/// input belongs to exactly one token, so the input can be rebuilt from the
/// token slices.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	#[regex(r"\$\{[A-Za-z0-9_]+\}")]
	Reference,
	#[token("$")]
	Dollar,
	#[regex(r"[^$]+")]
	Text,
}

/// Mapping from variable name to replacement text.
///
/// Built once before a run and only read during resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, Deserialize)]
#[serde(transparent)]
pub struct VariableMap(HashMap<String, String>);

impl VariableMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a variable, returning the value it replaced.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
		self.0.insert(name.into(), value.into())
	}

	/// Look up the replacement for `name`.
	pub fn value(&self, name: &str) -> Option<&str> {
		self.0.get(name).map(String::as_str)
	}

	/// Parse a `KEY=VALUE` assignment as passed on the command line. The value
	/// may be empty and may itself contain `=`.
	pub fn parse_assignment(assignment: &str) -> AmalgamResult<(String, String)> {
		let Some((name, value)) = assignment.split_once('=') else {
			return Err(AmalgamError::InvalidVariable(assignment.to_string()));
		};

		if !is_variable_name(name) {
			return Err(AmalgamError::InvalidVariable(assignment.to_string()));
		}

		Ok((name.to_string(), value.to_string()))
	}

	/// Returns the names in sorted order.
	pub fn sorted_names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.0.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariableMap {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(
			iter.into_iter()
				.map(|(name, value)| (name.into(), value.into()))
				.collect(),
		)
	}
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for VariableMap {
	fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
		for (name, value) in iter {
			self.insert(name, value);
		}
	}
}

/// Returns `true` when `name` is usable inside a `${NAME}` reference.
pub fn is_variable_name(name: &str) -> bool {
	!name.is_empty()
		&& name
			.bytes()
			.all(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
}

/// Replace every known `${NAME}` reference in `text`.
pub fn substitute(text: &str, variables: &VariableMap) -> String {
	if variables.is_empty() || !text.contains("${") {
		return text.to_string();
	}

	let mut output = String::with_capacity(text.len());

	for (token, span) in RawToken::lexer(text).spanned() {
		let slice = &text[span];
		match token {
			Ok(RawToken::Reference) => {
				let name = reference_name(slice);
				match variables.value(name) {
					Some(value) => {
						tracing::trace!(name, "substituted variable");
						output.push_str(value);
					}
					None => output.push_str(slice),
				}
			}
			_ => output.push_str(slice),
		}
	}

	output
}

/// Collect the names of all `${NAME}` references in `text`, in order of
/// appearance and with duplicates preserved.
pub fn variable_references(text: &str) -> Vec<&str> {
	if !text.contains("${") {
		return Vec::new();
	}

	RawToken::lexer(text)
		.spanned()
		.filter(|(token, _)| matches!(token, Ok(RawToken::Reference)))
		.map(|(_, span)| reference_name(&text[span]))
		.collect()
}

/// Names referenced in `text` that have no value in `variables`. Sorted and
/// deduplicated.
pub fn find_unresolved_variables(text: &str, variables: &VariableMap) -> Vec<String> {
	let mut unresolved: Vec<String> = variable_references(text)
		.into_iter()
		.filter(|name| !variables.contains_key(*name))
		.map(ToString::to_string)
		.collect();

	unresolved.sort();
	unresolved.dedup();
	unresolved
}

/// Strip the `${` and `}` delimiters from a reference token.
fn reference_name(reference: &str) -> &str {
	&reference[2..reference.len() - 1]
}
