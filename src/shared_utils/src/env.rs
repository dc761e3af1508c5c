use thiserror::Error;

/// An environment variable required by the application is not set.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// Reads an environment variable, returning a structured error if it's missing.
///
/// This is a thin wrapper around `std::env::var` that provides a more
/// ergonomic and specific error type for missing variables.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    std::env::var(name).map_err(|_| MissingEnvVarError(name.to_string()))
}

/// Like [`get_env_var`], but also rejects values that are empty after trimming.
///
/// Secrets exported as `FOO=` are as unusable as unset ones, so both map to
/// the same error.
pub fn get_non_empty_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    let value = get_env_var(name)?;
    if value.trim().is_empty() {
        return Err(MissingEnvVarError(name.to_string()));
    }
    Ok(value)
}
