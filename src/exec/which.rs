use std::path::{Path, PathBuf};

/// Locate an executable named `name`.
///
/// A name containing a path separator is checked as-is. Otherwise each
/// directory of `search_path` is tried in order, or of `PATH` when no
/// explicit search path is given.
pub fn find_executable(name: &str, search_path: Option<&[PathBuf]>) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    if name.contains('/') {
        let candidate = PathBuf::from(name);
        return is_executable(&candidate).then_some(candidate);
    }

    match search_path {
        Some(dirs) => dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable(candidate)),
        None => {
            let path_var = std::env::var_os("PATH")?;
            std::env::split_paths(&path_var)
                .map(|dir| dir.join(name))
                .find(|candidate| is_executable(candidate))
        }
    }
}

#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}
