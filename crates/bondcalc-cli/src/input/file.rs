use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON file and deserialise into a typed struct.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let resolved = resolve_path(Path::new(path))?;
    let contents = fs::read_to_string(&resolved)
        .map_err(|e| format!("Failed to read '{}': {}", resolved.display(), e))?;
    let value = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", resolved.display(), e))?;
    Ok(value)
}

/// Anchor relative paths at the working directory and require a regular file.
fn resolve_path(path: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let resolved = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    if !resolved.is_file() {
        let reason = if resolved.exists() { "Not a file" } else { "File not found" };
        return Err(format!("{}: {}", reason, resolved.display()).into());
    }

    Ok(resolved)
}
