//! Flat `key: value` front matter between `---` delimiters

use std::fmt::Display;

pub const DELIMITER: &str = "---";

/// Front matter builder; keys render in insertion order
#[derive(Debug, Clone, Default)]
pub struct FrontMatter {
    entries: Vec<(&'static str, String)>,
}

impl FrontMatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Line breaks in the value are folded into spaces so a
    /// value can never end the block early.
    pub fn field(mut self, key: &'static str, value: impl Display) -> Self {
        let value = value.to_string().replace(['\r', '\n'], " ");
        self.entries.push((key, value.trim().to_string()));
        self
    }

    /// Append a field only when the value is known
    pub fn opt_field<V: Display>(self, key: &'static str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.field(key, value),
            None => self,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::from(DELIMITER);
        out.push('\n');
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        out.push_str(DELIMITER);
        out.push_str("\n\n");
        out
    }
}

/// Read one field from a document's leading front matter block.
///
/// Only the block at the very top is scanned, so body text that happens to
/// look like `key: value` is never mistaken for the marker.
pub fn extract_field(document: &str, key: &str) -> Option<String> {
    let mut lines = document.lines();
    if lines.next()?.trim_end() != DELIMITER {
        return None;
    }

    for line in lines {
        if line.trim_end() == DELIMITER {
            break;
        }
        if let Some((k, v)) = line.split_once(':') {
            if k.trim() == key {
                return Some(v.trim().to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_keeps_key_order() {
        let fm = FrontMatter::new()
            .field("title", "Write report")
            .opt_field("parent_id", None::<&str>)
            .field("priority", 5)
            .field("modified_time", "2024-05-01 08:00:00");

        assert_eq!(
            fm.render(),
            "---\ntitle: Write report\npriority: 5\nmodified_time: 2024-05-01 08:00:00\n---\n\n"
        );
    }

    #[test]
    fn test_multiline_values_are_folded() {
        let fm = FrontMatter::new().field("title", "line one\nline two");
        assert!(fm.render().contains("title: line one line two\n"));
    }

    #[test]
    fn test_extract_field_reads_marker_with_colons() {
        let doc = "---\ntask_id: t1\nmodified_time: 2024-05-01 08:00:00\n---\n\n# t1\n";
        assert_eq!(
            extract_field(doc, "modified_time").as_deref(),
            Some("2024-05-01 08:00:00")
        );
        assert_eq!(extract_field(doc, "task_id").as_deref(), Some("t1"));
    }

    #[test]
    fn test_extract_field_ignores_body() {
        let doc = "---\ntitle: x\n---\n\nmodified_time: 2024-01-01 00:00:00\n";
        assert!(extract_field(doc, "modified_time").is_none());
        assert!(extract_field("modified_time: 1\n", "modified_time").is_none());
    }
}
