//! Line scanner for `#include "path"` directives.

use std::ops::Range;

/// The keyword following `#` in an inclusion directive.
pub const DIRECTIVE_KEYWORD: &str = "include";

/// An inclusion directive found in a line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'a> {
	/// The quoted relative path, without the quotes.
	pub target: &'a str,
	/// Byte range within the scanned text covering the leading whitespace
	/// through the closing quote. This is the part replaced by the included
	/// content; the rest of the line is kept.
	pub span: Range<usize>,
	/// 1-indexed line number of the directive.
	pub line: usize,
}

/// Recognise a directive at the start of `line`.
///
/// Accepts optional leading spaces or tabs, then `#`, optional whitespace,
/// `include`, optional whitespace and a double-quoted, non-empty path. Returns
/// the target and the byte length of the matched prefix.
pub fn match_directive(line: &str) -> Option<(&str, usize)> {
	let rest = line.trim_start_matches([' ', '\t']);
	let rest = rest.strip_prefix('#')?;
	let rest = rest.trim_start_matches([' ', '\t']);
	let rest = rest.strip_prefix(DIRECTIVE_KEYWORD)?;
	let rest = rest.trim_start_matches([' ', '\t']);
	let rest = rest.strip_prefix('"')?;
	let end = rest.find(['"', '\n'])?;

	if end == 0 || !rest[end..].starts_with('"') {
		return None;
	}

	let target = &rest[..end];
	let consumed = line.len() - rest.len() + end + 1;

	Some((target, consumed))
}

/// Scan `text` line by line and return every directive in order.
pub fn scan_directives(text: &str) -> Vec<Directive<'_>> {
	let mut directives = Vec::new();
	let mut offset = 0;

	for (index, line) in text.split_inclusive('\n').enumerate() {
		if let Some((target, consumed)) = match_directive(line) {
			directives.push(Directive {
				target,
				span: offset..offset + consumed,
				line: index + 1,
			});
		}
		offset += line.len();
	}

	directives
}
