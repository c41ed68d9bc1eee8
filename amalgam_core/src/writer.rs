use std::path::Path;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use crate::AmalgamError;
use crate::AmalgamResult;

/// Write `text` to `destination`, replacing any existing file.
///
/// The content is written to a temporary sibling file first and then renamed
/// over the destination, so a failed write never leaves a truncated output.
/// The parent directory must already exist.
pub fn write_output(destination: &Path, text: &str) -> AmalgamResult<()> {
	let temp_path = temporary_sibling(destination);
	let to_write_error = |source| {
		AmalgamError::Write {
			path: destination.to_path_buf(),
			source,
		}
	};

	let written =
		std::fs::write(&temp_path, text).and_then(|()| std::fs::rename(&temp_path, destination));

	if let Err(error) = written {
		let _ = std::fs::remove_file(&temp_path);
		return Err(to_write_error(error));
	}

	tracing::info!(path = %destination.display(), bytes = text.len(), "wrote amalgamation");

	Ok(())
}

/// Returns true when `destination` already holds exactly `text`. A missing or
/// unreadable destination counts as out of date.
pub fn is_up_to_date(destination: &Path, text: &str) -> bool {
	std::fs::read_to_string(destination).is_ok_and(|current| current == text)
}

/// Returns true when `path` is `destination` itself or one of the temporary
/// files [`write_output`] creates next to it.
pub fn is_output_artifact(path: &Path, destination: &Path) -> bool {
	if path == destination {
		return true;
	}

	path.parent() == destination.parent()
		&& path
			.file_name()
			.is_some_and(|name| name.to_string_lossy().starts_with(&temporary_prefix(destination)))
}

/// Longest part of the destination file name kept in temporary file names.
/// Leaves room for the pid and timestamp suffix under the usual 255 byte limit.
const TEMPORARY_NAME_BYTES: usize = 64;

fn temporary_prefix(destination: &Path) -> String {
	let file_name = destination
		.file_name()
		.map_or_else(|| "amalgam".into(), |name| name.to_string_lossy());
	let mut end = file_name.len().min(TEMPORARY_NAME_BYTES);
	while !file_name.is_char_boundary(end) {
		end -= 1;
	}

	format!(".{}.tmp-", &file_name[..end])
}

fn temporary_sibling(destination: &Path) -> PathBuf {
	destination.with_file_name(format!(
		"{}{}-{}",
		temporary_prefix(destination),
		std::process::id(),
		std::time::SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map_or(0, |duration| duration.as_nanos())
	))
}
