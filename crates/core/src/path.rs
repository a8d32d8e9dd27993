//! Output key construction.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

const EXTENDED_LENGTH_PREFIX: &str = r"\\?\";

/// Convert backslash separators to forward slashes: `foo\bar` -> `foo/bar`.
///
/// Extended-length paths (`\\?\C:\...`) and paths containing non-ASCII
/// characters are returned untouched.
pub fn normalize(path: &str) -> Cow<'_, str> {
    if path.starts_with(EXTENDED_LENGTH_PREFIX) || !path.is_ascii() || !path.contains('\\') {
        return Cow::Borrowed(path);
    }
    Cow::Owned(path.replace('\\', "/"))
}

/// Registry key for a file at `relative` inside the asset directory of
/// `namespace`: `normalize(output_base/namespace/relative)`.
///
/// The parts are joined and folded the way a path join would: empty
/// segments and `.` are dropped, `..` removes the preceding segment.
pub fn output_key(output_base: &str, namespace: &str, relative: &Path) -> String {
    let joined = Path::new(output_base).join(namespace).join(relative);
    normalize(&lexical(&joined).to_string_lossy()).into_owned()
}

/// Drop `.` and fold `..` without touching the filesystem.
///
/// `..` at the root is dropped; leading `..` of a relative path is kept.
pub(crate) fn lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}
