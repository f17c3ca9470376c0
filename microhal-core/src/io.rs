use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Extension of snapshot files.
pub(crate) const SNAPSHOT_EXTENSION: &str = "bin";

/// Reads a text file and returns all its non-blank lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents
		.lines()
		.filter(|line| !line.trim().is_empty())
		.map(str::to_owned)
		.collect())
}

/// Builds the snapshot path of an instance.
///
/// Example:
/// `data` + `"hal"` → `data/hal.bin`
pub(crate) fn snapshot_path<P: AsRef<Path>>(folder: P, name: &str) -> io::Result<PathBuf> {
	if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
		return Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("Invalid instance name: {name:?}"),
		));
	}

	let mut output = normalize_folder(folder.as_ref());
	output.push(format!("{name}.{SNAPSHOT_EXTENSION}"));
	Ok(output)
}

/// Writes `bytes` next to `path` then renames over it.
///
/// A crash mid-write leaves the previous snapshot intact.
pub(crate) fn write_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> io::Result<()> {
	let path = path.as_ref();
	if let Some(parent) = path.parent() {
		if !parent.as_os_str().is_empty() {
			fs::create_dir_all(parent)?;
		}
	}

	let mut temporary = path.as_os_str().to_owned();
	temporary.push(".tmp");
	fs::write(&temporary, bytes)?;
	fs::rename(&temporary, path)
}

/// Normalize a folder path.
///
/// - `""`, `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub(crate) fn normalize_folder(input: &Path) -> PathBuf {
	let as_str = input.to_str();
	if matches!(as_str, Some("") | Some(".") | Some("./")) {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		input.to_path_buf()
	}
}
