use std::env;
use std::path::{Path, PathBuf};

/// Find absolute path to executable
///
/// A path-like name (`./run.sh`, `bin/zeek`) is taken relative to `in_dir`.
/// A bare name is first looked for in `in_dir`, then in PATH.
pub fn find_executable_path<P>(binary_name: &str, in_dir: P) -> Result<PathBuf, which::Error>
where
    P: AsRef<Path>,
{
    let in_dir = in_dir.as_ref();
    let binary_path = Path::new(binary_name);

    if binary_path.is_absolute() {
        return which::which(binary_path);
    }

    if binary_path.components().count() > 1 {
        return which::which(in_dir.join(binary_path)).map(make_absolute);
    }

    // Search local directory; hits already include `in_dir`
    let mut local_executables = which::which_in_global(binary_name, Some(in_dir.as_os_str()))?;
    if let Some(path) = local_executables.next() {
        return Ok(make_absolute(path));
    }

    // Search PATH
    which::which(binary_name).map(make_absolute)
}

/// Join a relative `path` onto `base`; absolute paths are returned unchanged
pub fn resolve_in<P, B>(path: P, base: B) -> PathBuf
where
    P: AsRef<Path>,
    B: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.as_ref().join(path)
    }
}

// Symlinks are not resolved: multi-call binaries dispatch on argv[0]
fn make_absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }

    match env::current_dir() {
        Ok(current_dir) => current_dir.join(path),
        Err(_) => path,
    }
}
