//! Validation of configured toolchain binary paths.

use anyhow::{anyhow, Result};

/// Reject binary paths containing shell metacharacters or traversal sequences.
pub fn validate_binary_path(name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(anyhow!("Invalid {} path: empty", name));
    }

    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(anyhow!(
            "Invalid {} path: contains dangerous characters: {}",
            name,
            path
        ));
    }

    if path.contains("..") {
        return Err(anyhow!(
            "Invalid {} path: contains directory traversal: {}",
            name,
            path
        ));
    }

    if !path
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '/' | '-' | '_' | '.' | '\\'))
    {
        return Err(anyhow!("Invalid {} path: contains unsafe characters", name));
    }

    Ok(())
}
