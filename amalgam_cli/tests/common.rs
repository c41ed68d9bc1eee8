#![allow(dead_code)]

use std::path::Path;

use amalgam_core::AnyEmptyResult;
use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn amalgam_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("amalgam"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}

pub fn write_file(root: &Path, relative: &str, content: &str) -> AnyEmptyResult {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)?;

	Ok(())
}

/// A small project with a config, metadata and a two-level include tree.
pub fn header_project(root: &Path) -> AnyEmptyResult {
	write_file(
		root,
		"amalgam.toml",
		"input = \"src/lib.h\"\noutput = \"include/lib.h\"\nmetadata = \"package.json\"\n",
	)?;
	write_file(
		root,
		"package.json",
		r#"{ "name": "lib", "version": "1.2.3", "description": "A tiny library" }"#,
	)?;
	write_file(
		root,
		"src/lib.h",
		"/* ${NAME} v${VERSION} */\n#include \"detail/api.h\"\n",
	)?;
	write_file(root, "src/detail/api.h", "#include \"types.h\"\nint lib_run(void);\n")?;
	write_file(root, "src/detail/types.h", "typedef int lib_t;\n")?;
	std::fs::create_dir_all(root.join("include"))?;

	Ok(())
}

pub const HEADER_OUTPUT: &str = "/* lib v1.2.3 */\ntypedef int lib_t;\n\nint lib_run(void);\n\n";
