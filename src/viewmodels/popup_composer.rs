// ============================================================================
// POPUP COMPOSER - Texto de popup / etiqueta de cada marcador
// ============================================================================

use serde::Serialize;
use serde_json::Value;

use crate::models::{ColumnMapping, DisplayFlags, LocationRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupContent {
    /// HTML del popup (valores ya escapados)
    pub popup_text: String,
    /// Etiqueta permanente, solo con "mostrar siempre la etiqueta"
    pub permanent_label_text: Option<String>,
}

pub struct PopupComposer;

impl PopupComposer {
    pub fn compose(record: &LocationRecord, flags: &DisplayFlags, columns: &ColumnMapping) -> PopupContent {
        let coordinates = coordinate_text(record);
        let title = if flags.show_custom_fields {
            field_text(record, columns.title.as_deref())
        } else {
            None
        };

        let popup_text = if flags.show_custom_fields {
            let description = field_text(record, columns.description.as_deref());
            match (&title, description) {
                (None, None) => escape_html(&coordinates),
                (Some(title), None) => format!("<strong>{}</strong>", escape_html(title)),
                (None, Some(description)) => escape_html(&description),
                (Some(title), Some(description)) => format!(
                    "<strong>{}</strong><br/>{}",
                    escape_html(title),
                    escape_html(&description)
                ),
            }
        } else {
            Self::default_lines(record, columns, &coordinates).join("<br/>")
        };

        // La etiqueta se suma al popup, no lo reemplaza
        let permanent_label_text = flags
            .always_show_label
            .then(|| escape_html(title.as_deref().unwrap_or(&coordinates)));

        PopupContent { popup_text, permanent_label_text }
    }

    /// Todos los campos no geométricos + fecha + coordenadas
    fn default_lines(record: &LocationRecord, columns: &ColumnMapping, coordinates: &str) -> Vec<String> {
        let mut lines: Vec<String> = record
            .extra
            .iter()
            .filter(|(key, _)| **key != columns.latitude && **key != columns.longitude)
            .map(|(key, value)| format!("<b>{}:</b> {}", escape_html(key), escape_html(&value_text(value))))
            .collect();

        lines.push(format!(
            "<b>Time:</b> {}",
            record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        lines.push(escape_html(coordinates));
        lines
    }
}

fn coordinate_text(record: &LocationRecord) -> String {
    format!("Lat: {:.6}, Lng: {:.6}", record.latitude, record.longitude)
}

fn field_text(record: &LocationRecord, column: Option<&str>) -> Option<String> {
    let value = record.extra.get(column?)?;
    let text = value_text(value);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
