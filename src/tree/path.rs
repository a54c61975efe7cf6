//! Path splitting and joining.

use crate::error::NamespaceError;

pub const SEPARATOR: char = '/';

/// Split an absolute path into byte components.
///
/// The root contributes a leading empty component, so `/` is `[""]` and
/// `/a/b` is `["", "a", "b"]`. Repeated and trailing separators are ignored.
pub fn get_path_components(path: &str) -> Result<Vec<Vec<u8>>, NamespaceError> {
    if !path.starts_with(SEPARATOR) {
        return Err(NamespaceError::InvalidArgument(format!(
            "Absolute path required: {:?}",
            path
        )));
    }
    let mut components = vec![Vec::new()];
    components.extend(
        path.split(SEPARATOR)
            .filter(|c| !c.is_empty())
            .map(|c| c.as_bytes().to_vec()),
    );
    Ok(components)
}

/// Join `components[start..end]` with the separator.
pub fn construct_path(components: &[Vec<u8>], start: usize, end: usize) -> String {
    let end = end.min(components.len());
    if start >= end {
        return String::new();
    }
    components[start..end]
        .iter()
        .map(|c| String::from_utf8_lossy(c))
        .collect::<Vec<_>>()
        .join("/")
}

/// Human readable form of a whole component list, `/` for the root.
pub fn path_to_string(components: &[Vec<u8>]) -> String {
    match components {
        [only] if only.is_empty() => SEPARATOR.to_string(),
        _ => construct_path(components, 0, components.len()),
    }
}
