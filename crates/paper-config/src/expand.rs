//! `${VAR}` expansion for the string fields of `[sync]` and `[build]`.

use crate::ConfigError;

/// Variable lookup; `None` means the variable is unset.
pub(crate) type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Reads variables from the process environment.
pub(crate) fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Expand `${VAR}` and `${VAR:-default}` in each `(field, value)` pair, in order.
///
/// Stops at the first reference to an unset variable without a default.
/// Bare `$VAR` is left alone.
pub(crate) fn expand_fields<'v>(
    fields: impl IntoIterator<Item = (&'static str, &'v mut String)>,
    lookup: Lookup<'_>,
) -> Result<(), ConfigError> {
    for (field, value) in fields {
        if value.contains("${") {
            *value = expand(value, field, lookup)?;
        }
    }
    Ok(())
}

fn expand(value: &str, field: &str, lookup: Lookup<'_>) -> Result<String, ConfigError> {
    shellexpand::env_with_context(value, |var: &str| lookup(var).map(Some).ok_or(Unset))
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

/// Lookup failure marker; the variable name travels in the shellexpand error.
struct Unset;
