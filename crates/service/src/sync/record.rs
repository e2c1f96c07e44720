use models::about_us::AboutUsKind;
use serde_json::Value;

/// Only locale carried over from the remote API.
pub const LOCALE: &str = "esp";

/// A remote record that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRecord {
    /// Remote `id`, stringified. `None` when absent or null.
    pub remote_id: Option<String>,
    pub title: String,
    pub description: String,
}

impl RemoteRecord {
    /// Requires string values at `titulo.esp` and `descripcion.esp`.
    pub fn parse(value: &Value) -> Result<Self, String> {
        let title = localized(value, "titulo").ok_or_else(|| format!("missing titulo.{}", LOCALE))?;
        let description = localized(value, "descripcion").ok_or_else(|| format!("missing descripcion.{}", LOCALE))?;
        Ok(Self {
            remote_id: remote_id(value.get("id")),
            title: title.to_string(),
            description: description.to_string(),
        })
    }
}

fn localized<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value.get(field)?.get(LOCALE)?.as_str()
}

fn remote_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Case-insensitive exact match on the Spanish headings.
pub fn classify_about_us(title: &str) -> AboutUsKind {
    match title.to_lowercase().as_str() {
        "misión" | "mision" => AboutUsKind::Mission,
        "visión" | "vision" => AboutUsKind::Vision,
        _ => AboutUsKind::General,
    }
}
