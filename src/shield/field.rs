use serde::{Deserialize, Serialize};

/// Which browser event produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Input,
    Paste,
}

/// The attributes of the form field the event fired on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldInfo {
    pub tag: String,
    pub id: String,
    pub class_name: String,
    pub name: String,
    pub placeholder: String,
    pub input_type: String,
}

impl FieldInfo {
    /// A plain `<input type="text">` with no identifying attributes.
    pub fn text_input() -> Self {
        Self {
            tag: "input".into(),
            input_type: "text".into(),
            ..Default::default()
        }
    }

    pub fn textarea() -> Self {
        Self {
            tag: "textarea".into(),
            ..Default::default()
        }
    }

    fn is_text_entry(&self) -> bool {
        matches!(self.tag.to_lowercase().as_str(), "input" | "textarea")
    }

    pub fn is_password(&self) -> bool {
        self.input_type.eq_ignore_ascii_case("password")
    }

    /// Search boxes are left alone: queries routinely contain quotes and operators.
    pub fn is_search_box(&self, page_host: &str) -> bool {
        if !self.is_text_entry() {
            return false;
        }
        let id = self.id.to_lowercase();
        let class_name = self.class_name.to_lowercase();
        let name = self.name.to_lowercase();
        let placeholder = self.placeholder.to_lowercase();

        if page_host.to_lowercase().contains("google.") && name == "q" {
            return true;
        }
        [id, class_name, name, placeholder]
            .iter()
            .any(|attr| attr.contains("search"))
    }

    /// Whether the shield should look at values typed into this field at all.
    pub fn is_inspectable(&self, page_host: &str) -> bool {
        self.is_text_entry() && !self.is_password() && !self.is_search_box(page_host)
    }
}

/// One keystroke or paste into a form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEvent {
    pub kind: EventKind,
    pub field: FieldInfo,
    pub page_host: String,
    pub value: String,
}
