use std::path::{Component, Path, PathBuf};

/// Lexically resolves `.` and `..` without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut components = path.components().peekable();
    let mut ret = if let Some(c @ Component::Prefix(..)) = components.peek() {
        let buf = PathBuf::from(c.as_os_str());
        components.next();
        buf
    } else {
        PathBuf::new()
    };

    for component in components {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(ret.components().next_back(), Some(Component::Normal(_))) {
                    ret.pop();
                } else if !ret.has_root() {
                    ret.push("..");
                }
            }
            Component::Normal(c) => ret.push(c),
            Component::RootDir => ret.push(component.as_os_str()),
            Component::Prefix(_) => {}
        }
    }
    ret
}

/// Path from `base` to `target`. Both must be absolute and normalised.
pub fn relative_to(target: &Path, base: &Path) -> PathBuf {
    let target: Vec<_> = target.components().collect();
    let base: Vec<_> = base.components().collect();

    let shared = target
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in shared..base.len() {
        rel.push("..");
    }
    for component in &target[shared..] {
        rel.push(component.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    rel
}

/// Slash-separated rendering used as the identity of an indexed file.
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// First segment past any leading `.` or `..` segments.
pub fn affinity_segment(path: &str) -> Option<&str> {
    path.split('/')
        .find(|seg| !seg.is_empty() && *seg != "." && *seg != "..")
}
