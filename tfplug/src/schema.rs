//! Schema types and builders for tfplug
//!
//! Providers, data sources and resources all describe their attributes with
//! the same `Schema` type. The host uses it to validate configuration before
//! any handler runs.

use crate::types::{Config, Diagnostic, Diagnostics, Dynamic};
use std::collections::HashMap;

/// AttributeType mirrors Terraform's type system
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number,
    Bool,
    List(Box<AttributeType>),
    Map(Box<AttributeType>),
    Object(HashMap<String, AttributeType>),
}

impl AttributeType {
    /// Whether a concrete value fits this type. Null and unknown fit any type.
    pub fn accepts(&self, value: &Dynamic) -> bool {
        match (self, value) {
            (_, Dynamic::Null) | (_, Dynamic::Unknown) => true,
            (AttributeType::String, Dynamic::String(_)) => true,
            (AttributeType::Number, Dynamic::Number(_)) => true,
            (AttributeType::Bool, Dynamic::Bool(_)) => true,
            (AttributeType::List(elem), Dynamic::List(items)) => {
                items.iter().all(|item| elem.accepts(item))
            }
            (AttributeType::Map(elem), Dynamic::Map(entries)) => {
                entries.values().all(|entry| elem.accepts(entry))
            }
            (AttributeType::Object(fields), Dynamic::Map(entries)) => {
                entries.iter().all(|(name, entry)| {
                    fields
                        .get(name)
                        .map(|field| field.accepts(entry))
                        .unwrap_or(false)
                })
            }
            _ => false,
        }
    }
}

/// A single attribute of a schema
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
}

/// Schema is returned by providers, resources and data sources.
/// Version is used for state migration.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub version: i64,
    pub description: String,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    /// Checks user configuration against the schema: required attributes are
    /// present, computed-only attributes are not set, no unknown attributes,
    /// and every value matches its declared type.
    pub fn validate_config(&self, config: &Config) -> Diagnostics {
        let mut diags = Diagnostics::new();

        for attr in &self.attributes {
            let value = config.get(&attr.name).unwrap_or(&Dynamic::Null);

            if attr.required && value.is_null() {
                diags.push(
                    Diagnostic::error(
                        format!("Missing required argument: {}", attr.name),
                        format!("The argument \"{}\" is required, but no definition was found.", attr.name),
                    )
                    .with_attribute(&attr.name),
                );
            }

            if attr.computed && !attr.optional && !value.is_null() {
                diags.push(
                    Diagnostic::error(
                        format!("Invalid configuration for computed attribute: {}", attr.name),
                        format!("\"{}\" is computed by the provider and cannot be set.", attr.name),
                    )
                    .with_attribute(&attr.name),
                );
            }
        }

        for (name, value) in &config.values {
            match self.attribute(name) {
                Some(attr) if !attr.r#type.accepts(value) => diags.push(
                    Diagnostic::error(
                        format!("Incorrect attribute value type: {}", name),
                        format!("Expected {:?}, got {}.", attr.r#type, value.type_name()),
                    )
                    .with_attribute(name),
                ),
                Some(_) => {}
                None => diags.push(
                    Diagnostic::error(
                        format!("Unsupported argument: {}", name),
                        format!("An argument named \"{}\" is not expected here.", name),
                    )
                    .with_attribute(name),
                ),
            }
        }

        diags
    }
}

/// AttributeBuilder provides a fluent API for building attributes
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, r#type: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
            },
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// SchemaBuilder provides a fluent API for building schemas
#[derive(Default)]
pub struct SchemaBuilder {
    description: String,
    attributes: Vec<Attribute>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    pub fn attribute(mut self, attr: AttributeBuilder) -> Self {
        self.attributes.push(attr.build());
        self
    }

    /// Shorthand for a computed string, the common case for API outputs
    pub fn computed_string(self, name: &str, description: &str) -> Self {
        self.attribute(
            AttributeBuilder::string(name)
                .computed()
                .description(description),
        )
    }

    pub fn build(self, version: i64) -> Schema {
        Schema {
            version,
            description: self.description,
            attributes: self.attributes,
        }
    }
}
