use crate::core::backends::ConfigField;
use crate::core::config::data::Settings;

/// Show enough of a secret to recognise it without revealing it.
pub fn mask_secret(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return "(unset)".to_string();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

pub fn format_field(settings: &Settings, field: ConfigField) -> String {
    let value = settings.backends.get(field);
    if field.is_secret() {
        return mask_secret(value);
    }
    if value.trim().is_empty() {
        "(unset)".to_string()
    } else {
        value.replace('\n', " ")
    }
}
