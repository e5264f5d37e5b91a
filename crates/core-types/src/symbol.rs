use crate::error::CoreError;

/// Exchange suffix used by Yahoo-style NSE tickers (e.g. `RELIANCE.NS`).
pub const NSE_SUFFIX: &str = ".NS";

/// Normalizes a user-supplied ticker to the registry key form.
///
/// Trims whitespace, upper-cases, and strips a trailing `.NS` exchange suffix, so
/// `" reliance.ns "` and `"RELIANCE"` refer to the same stock.
pub fn normalize_symbol(input: &str) -> Result<String, CoreError> {
    let upper = input.trim().to_ascii_uppercase();
    let bare = upper.strip_suffix(NSE_SUFFIX).unwrap_or(&upper);

    if bare.is_empty() {
        return Err(CoreError::InvalidInput(
            "symbol".to_string(),
            format!("'{input}' is empty after normalization"),
        ));
    }

    if let Some(ch) = bare
        .chars()
        .find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '&'))
    {
        return Err(CoreError::InvalidInput(
            "symbol".to_string(),
            format!("'{input}' contains invalid character '{ch}'"),
        ));
    }

    Ok(bare.to_string())
}
