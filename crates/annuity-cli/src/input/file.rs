use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Load a JSON request file. Relative paths resolve against the working directory.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let path = Path::new(path);
    if !path.is_file() {
        let reason = if path.exists() { "Not a file" } else { "File not found" };
        return Err(format!("{}: {}", reason, path.display()).into());
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    let request = serde_json::from_str(&contents)
        .map_err(|e| format!("Invalid annuity request in '{}': {}", path.display(), e))?;
    Ok(request)
}
