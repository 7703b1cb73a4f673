//! Field-type catalog — default label, name, and attributes for new fields.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::model::{FieldOption, FieldType, field_types};

/// Defaults applied to a freshly added field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTemplate {
    pub label: String,
    pub field_name: String,
    pub placeholder: Option<String>,
    pub options: Option<Vec<FieldOption>>,
    pub is_required: bool,
}

impl FieldTemplate {
    pub fn new(label: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            field_name: field_name.into(),
            placeholder: None,
            options: None,
            is_required: false,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = Some(options);
        self
    }

    /// Build a template from the tag alone, for types no catalog knows.
    ///
    /// `"tax-id"` and `"taxId"` both become label `"Tax Id Field"` and
    /// field name `"tax_id"`.
    pub fn synthesize(field_type: &FieldType) -> Self {
        let words = tag_words(field_type.as_str());
        if words.is_empty() {
            return Self::new("Field", "field");
        }

        let label = words
            .iter()
            .map(|w| capitalize(w))
            .collect::<Vec<_>>()
            .join(" ");
        let field_name = words
            .iter()
            .map(|w| w.to_lowercase())
            .collect::<Vec<_>>()
            .join("_");

        Self::new(format!("{label} Field"), field_name)
    }
}

static CAMEL_HUMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("static regex"));
static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("static regex"));

fn tag_words(tag: &str) -> Vec<String> {
    let spaced = CAMEL_HUMP.replace_all(tag, "$1 $2");
    let spaced = NON_ALNUM.replace_all(&spaced, " ");
    spaced.split_whitespace().map(String::from).collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Supplies field defaults by type tag.
pub trait FieldTypeCatalog: Send + Sync {
    /// Defaults for a tag, if the catalog knows it.
    fn lookup(&self, field_type: &FieldType) -> Option<FieldTemplate>;

    /// All tags the catalog can describe.
    fn field_types(&self) -> Vec<FieldType>;

    /// Catalog defaults, or a template synthesized from the tag.
    fn template_for(&self, field_type: &FieldType) -> FieldTemplate {
        self.lookup(field_type)
            .unwrap_or_else(|| FieldTemplate::synthesize(field_type))
    }
}

/// Catalog of the well-known field types, extensible at startup.
#[derive(Debug, Clone)]
pub struct BuiltinCatalog {
    entries: HashMap<String, FieldTemplate>,
}

impl BuiltinCatalog {
    /// An empty catalog; every lookup falls back to synthesis.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register or replace the template for a tag.
    pub fn with_entry(mut self, tag: impl Into<String>, template: FieldTemplate) -> Self {
        self.entries.insert(tag.into(), template);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn starter_options() -> Vec<FieldOption> {
    vec![
        FieldOption::new("Option 1", "option_1"),
        FieldOption::new("Option 2", "option_2"),
    ]
}

impl Default for BuiltinCatalog {
    fn default() -> Self {
        use field_types::*;

        Self::empty()
            .with_entry(
                TEXT,
                FieldTemplate::new("Text Field", "text_field").with_placeholder("Enter text"),
            )
            .with_entry(
                TEXTAREA,
                FieldTemplate::new("Long Answer", "long_answer")
                    .with_placeholder("Enter a detailed answer"),
            )
            .with_entry(
                EMAIL,
                FieldTemplate::new("Email Address", "email")
                    .with_placeholder("name@example.com"),
            )
            .with_entry(
                NUMBER,
                FieldTemplate::new("Number", "number").with_placeholder("0"),
            )
            .with_entry(
                PHONE,
                FieldTemplate::new("Phone Number", "phone").with_placeholder("+1 555 000 0000"),
            )
            .with_entry(DATE, FieldTemplate::new("Date", "date"))
            .with_entry(
                SELECT,
                FieldTemplate::new("Dropdown", "selection")
                    .with_placeholder("Select an option")
                    .with_options(starter_options()),
            )
            .with_entry(
                MULTISELECT,
                FieldTemplate::new("Multiple Choice", "selections")
                    .with_options(starter_options()),
            )
            .with_entry(CHECKBOX, FieldTemplate::new("Checkbox", "checkbox"))
            .with_entry(
                RADIO,
                FieldTemplate::new("Radio Group", "choice").with_options(starter_options()),
            )
            .with_entry(FILE, FieldTemplate::new("File Upload", "file_upload"))
            .with_entry(HEADING, FieldTemplate::new("Section Heading", "heading"))
            .with_entry(PARAGRAPH, FieldTemplate::new("Paragraph", "paragraph"))
            .with_entry(
                ADDRESS,
                FieldTemplate::new("Address", "address").with_placeholder("Street, city, postcode"),
            )
            .with_entry(
                URL,
                FieldTemplate::new("Website", "website").with_placeholder("https://"),
            )
            .with_entry(PASSWORD, FieldTemplate::new("Password", "password"))
    }
}

impl FieldTypeCatalog for BuiltinCatalog {
    fn lookup(&self, field_type: &FieldType) -> Option<FieldTemplate> {
        self.entries.get(field_type.as_str()).cloned()
    }

    fn field_types(&self) -> Vec<FieldType> {
        let mut tags: Vec<FieldType> = self
            .entries
            .keys()
            .map(|k| FieldType::new(k.as_str()))
            .collect();
        tags.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        tags
    }
}
