//! Configuration document model — steps, fields, and their identifiers.
//!
//! The same types are the in-memory representation and the JSON shape
//! exchanged with the persistence gateway. Attributes the engine does not
//! know about are kept in `extra` maps so documents round-trip without loss.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque step identifier, unique within a configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

/// Opaque field identifier, unique within its owning step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

macro_rules! opaque_id {
    ($name:ident) => {
        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

opaque_id!(StepId);
opaque_id!(FieldId);

/// Field type tag, e.g. `"text"` or `"select"`.
///
/// The set of tags is open: anything the catalog does not recognise is kept
/// verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldType(String);

impl FieldType {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is one of the tags in [`field_types::ALL`].
    pub fn is_well_known(&self) -> bool {
        field_types::ALL.contains(&self.0.as_str())
    }

    /// Whether the field presents a fixed list of choices.
    pub fn has_options(&self) -> bool {
        matches!(
            self.0.as_str(),
            field_types::SELECT | field_types::MULTISELECT | field_types::RADIO
        )
    }
}

impl From<&str> for FieldType {
    fn from(tag: &str) -> Self {
        Self(tag.to_string())
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Well-known field type tags.
pub mod field_types {
    pub const TEXT: &str = "text";
    pub const TEXTAREA: &str = "textarea";
    pub const EMAIL: &str = "email";
    pub const NUMBER: &str = "number";
    pub const PHONE: &str = "phone";
    pub const DATE: &str = "date";
    pub const SELECT: &str = "select";
    pub const MULTISELECT: &str = "multiselect";
    pub const CHECKBOX: &str = "checkbox";
    pub const RADIO: &str = "radio";
    pub const FILE: &str = "file";
    pub const HEADING: &str = "heading";
    pub const PARAGRAPH: &str = "paragraph";
    pub const ADDRESS: &str = "address";
    pub const URL: &str = "url";
    pub const PASSWORD: &str = "password";

    pub const ALL: &[&str] = &[
        TEXT,
        TEXTAREA,
        EMAIL,
        NUMBER,
        PHONE,
        DATE,
        SELECT,
        MULTISELECT,
        CHECKBOX,
        RADIO,
        FILE,
        HEADING,
        PARAGRAPH,
        ADDRESS,
        URL,
        PASSWORD,
    ];
}

/// One choice of a select/radio field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: String,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A single typed input definition within a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[serde(default)]
    pub id: FieldId,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub field_name: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Type-specific attributes without a dedicated slot (validation rules,
    /// accepted file types, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// JSON keys owned by [`Field`] itself; they never land in `extra`.
pub const RESERVED_FIELD_KEYS: &[&str] = &[
    "id",
    "type",
    "label",
    "fieldName",
    "isRequired",
    "order",
    "placeholder",
    "helpText",
    "options",
    "defaultValue",
];

impl Field {
    pub fn new(id: FieldId, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id,
            field_type,
            label: label.into(),
            field_name: String::new(),
            is_required: false,
            order: 0,
            placeholder: None,
            help_text: None,
            options: None,
            default_value: None,
            extra: Map::new(),
        }
    }
}

/// An ordered page of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(default)]
    pub id: StepId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Step {
    pub fn new(id: StepId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            order: 0,
            fields: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn field(&self, id: &FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| &f.id == id)
    }

    pub fn field_mut(&mut self, id: &FieldId) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| &f.id == id)
    }

    pub fn field_position(&self, id: &FieldId) -> Option<usize> {
        self.fields.iter().position(|f| &f.id == id)
    }
}

/// The complete definition of a multi-step onboarding form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    #[serde(default)]
    pub name: String,
    /// Stable key the persistence gateway stores the document under.
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub target_user_type: String,
    #[serde(default)]
    pub target_org_type: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub security_level: String,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Configuration {
    /// Parse a document received as an opaque JSON object.
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn step(&self, id: &StepId) -> Option<&Step> {
        self.steps.iter().find(|s| &s.id == id)
    }

    pub fn step_mut(&mut self, id: &StepId) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| &s.id == id)
    }

    pub fn step_position(&self, id: &StepId) -> Option<usize> {
        self.steps.iter().position(|s| &s.id == id)
    }

    /// Total number of fields across all steps.
    pub fn field_count(&self) -> usize {
        self.steps.iter().map(|s| s.fields.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn configuration_uses_camel_case_keys() {
        let mut config = Configuration::from_json(json!({
            "name": "KYC",
            "key": "kyc",
            "targetUserType": "individual",
            "isActive": true,
            "securityLevel": "high",
            "steps": []
        }))
        .unwrap();
        config.steps.push(Step::new(StepId::from("s1"), "Identity"));

        let value = config.to_json().unwrap();
        assert_eq!(value["targetUserType"], "individual");
        assert_eq!(value["isActive"], true);
        assert_eq!(value["steps"][0]["title"], "Identity");
        assert!(value.get("target_user_type").is_none());
    }

    #[test]
    fn unknown_field_type_and_attributes_round_trip() {
        let raw = json!({
            "id": "f1",
            "type": "signature-pad",
            "label": "Sign here",
            "fieldName": "signature",
            "isRequired": true,
            "order": 0,
            "penColor": "#000",
            "validation": {"minStrokes": 3}
        });
        let field: Field = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(field.field_type.as_str(), "signature-pad");
        assert!(!field.field_type.is_well_known());
        assert_eq!(field.extra["penColor"], "#000");

        let back = serde_json::to_value(&field).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn missing_attributes_fall_back_to_defaults() {
        let step: Step = serde_json::from_value(json!({"id": "s1"})).unwrap();
        assert_eq!(step.title, "");
        assert_eq!(step.order, 0);
        assert!(step.fields.is_empty());

        let field: Field = serde_json::from_value(json!({})).unwrap();
        assert!(field.id.is_empty());
        assert!(!field.is_required);
    }

    #[test]
    fn options_are_only_meaningful_for_choice_types() {
        assert!(FieldType::from(field_types::SELECT).has_options());
        assert!(FieldType::from(field_types::RADIO).has_options());
        assert!(!FieldType::from(field_types::CHECKBOX).has_options());
        assert!(!FieldType::from("rating").has_options());
    }

    #[test]
    fn lookup_helpers() {
        let mut step = Step::new(StepId::from("s1"), "One");
        step.fields
            .push(Field::new(FieldId::from("a"), FieldType::from("text"), "A"));
        step.fields
            .push(Field::new(FieldId::from("b"), FieldType::from("email"), "B"));

        assert_eq!(step.field_position(&FieldId::from("b")), Some(1));
        assert!(step.field(&FieldId::from("zzz")).is_none());

        let config = Configuration {
            name: String::new(),
            key: String::new(),
            target_user_type: String::new(),
            target_org_type: String::new(),
            version: String::new(),
            is_active: false,
            security_level: String::new(),
            steps: vec![step],
            extra: Map::new(),
        };
        assert_eq!(config.field_count(), 2);
        assert_eq!(config.step_position(&StepId::from("s1")), Some(0));
    }
}
