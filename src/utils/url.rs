//! URL utilities for consistent URL handling
//!
//! Backend URLs are typed by hand in the settings view, so they arrive with
//! or without a scheme and with stray trailing slashes. Everything that
//! builds a request URL goes through these helpers.

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use localhub::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:11434/"), "http://localhost:11434");
/// assert_eq!(normalize_base_url("https://api.example.com/v1///"), "https://api.example.com/v1");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Construct a complete API endpoint URL from a base URL and endpoint path
///
/// # Examples
///
/// ```
/// use localhub::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:11434/", "/api/tags"),
///     "http://localhost:11434/api/tags"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

/// Ensure a user-supplied address carries an HTTP(S) scheme.
///
/// Blank input stays blank so that "unset" survives a save. Protocol-relative
/// input (`//host`) gets `default_scheme` prefixed.
///
/// # Examples
///
/// ```
/// use localhub::utils::url::normalize_external_url;
///
/// assert_eq!(normalize_external_url("10.0.0.5:11434", "http"), "http://10.0.0.5:11434");
/// assert_eq!(normalize_external_url("  ", "https"), "");
/// ```
pub fn normalize_external_url(value: &str, default_scheme: &str) -> String {
    let cleaned = value.trim();
    if cleaned.is_empty() {
        return String::new();
    }
    if cleaned.starts_with("http://") || cleaned.starts_with("https://") {
        return cleaned.to_string();
    }
    if let Some(rest) = cleaned.strip_prefix("//") {
        return format!("{default_scheme}://{rest}");
    }
    format!("{default_scheme}://{cleaned}")
}
