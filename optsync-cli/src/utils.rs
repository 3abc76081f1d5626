//! Common helpers for the command-line host.

use std::path::Path;

use anyhow::Context;
use tokio::fs;

/// Replaces `${env:VAR_NAME}` placeholders with environment variable values.
///
/// Unset variables expand to an empty string. Anything that is not a
/// complete `${env:...}` placeholder is copied through unchanged.
///
/// # Example
///
/// ```rust
/// use optsync_cli::utils::replace_env_placeholders;
///
/// unsafe { std::env::set_var("OPTSYNC_DOC_HOME", "/home/doc"); }
/// let root = replace_env_placeholders("${env:OPTSYNC_DOC_HOME}/.optsync");
/// assert_eq!(root, "/home/doc/.optsync");
/// ```
pub fn replace_env_placeholders(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let placeholder = &after[..end];
                match placeholder.strip_prefix("env:") {
                    Some(name) => {
                        let value = std::env::var(name).unwrap_or_default();
                        debug!("expanding ${{env:{name}}} to {value:?}");
                        result.push_str(&value);
                    }
                    None => {
                        result.push_str("${");
                        result.push_str(placeholder);
                        result.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    result.push_str(rest);
    result
}

/// Read a settings file and return it as JSON text.
///
/// `.json` files are returned as-is; `.toml` files are converted to JSON.
pub async fn read_settings_file(path: &Path) -> anyhow::Result<String> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    match ext {
        "json" => Ok(content),
        "toml" => {
            let v: toml::Value = toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            Ok(serde_json::to_string(&v)?)
        }
        _ => bail!("unsupported settings file extension: {ext:?}"),
    }
}
