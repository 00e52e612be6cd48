//! Core property types for the registry.
//!
//! Definitions describe named, typed attributes that users attach to tasks.
//! Values are a closed sum type keyed by the declared property type; raw
//! control input arrives as [`RawValue`] and only the codec converts it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Boundary within which task ids, property definitions and task numbers are unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "kebab-case")]
pub enum Scope {
    /// The unscoped task space.
    Global,
    /// A single project, identified by its opaque id.
    Project(String),
}

impl Scope {
    pub fn project(id: impl Into<String>) -> Self {
        Self::Project(id.into())
    }

    pub fn is_project(&self) -> bool {
        matches!(self, Self::Project(_))
    }

    /// Stable string key, used for file names and counter maps.
    pub fn key(&self) -> String {
        match self {
            Self::Global => "global".to_string(),
            Self::Project(id) => format!("project:{id}"),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Opaque identifier of a property definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(Ulid);

impl PropertyId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for PropertyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for PropertyId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

/// The declared type of a custom property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Text,
    Number,
    Date,
    Boolean,
    Dropdown,
    Tags,
    Url,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Boolean => "boolean",
            Self::Dropdown => "dropdown",
            Self::Tags => "tags",
            Self::Url => "url",
        }
    }

    /// Whether the `options` list means anything for this type.
    pub fn uses_options(&self) -> bool {
        matches!(self, Self::Dropdown | Self::Tags)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A property definition: the complete schema for one user-defined attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub id: PropertyId,
    pub scope: Scope,
    pub name: String,
    #[serde(rename = "type")]
    pub type_: PropertyType,
    /// Allowed values. Required for `dropdown`; an optional allow-list for `tags`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub display_order: i64,
}

impl PropertyDef {
    /// Sort key giving the registry's total presentation order.
    pub fn order_key(&self) -> (i64, PropertyId) {
        (self.display_order, self.id)
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o == value)
    }
}

/// Input for creating a definition. The registry assigns the id and,
/// unless given, the display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: PropertyType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub display_order: Option<i64>,
}

impl NewProperty {
    pub fn new(name: impl Into<String>, type_: PropertyType) -> Self {
        Self {
            name: name.into(),
            type_,
            options: Vec::new(),
            required: false,
            display_order: None,
        }
    }

    /// Set the option list
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Mark the property as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Place the property at an explicit display order
    pub fn at_order(mut self, order: i64) -> Self {
        self.display_order = Some(order);
        self
    }
}

/// Partial update of a definition. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyPatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<PropertyType>,
    pub options: Option<Vec<String>>,
    pub required: Option<bool>,
    pub display_order: Option<i64>,
}

impl PropertyPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Change the declared type. Stored values are not migrated.
    pub fn retype(mut self, type_: PropertyType) -> Self {
        self.type_ = Some(type_);
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn reorder(mut self, order: i64) -> Self {
        self.display_order = Some(order);
        self
    }
}

/// A stored custom property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PropertyValue {
    Text(String),
    Number(f64),
    Date(DateTime<Utc>),
    Bool(bool),
    Dropdown(String),
    Tags(Vec<String>),
    Url(String),
}

impl PropertyValue {
    /// The property type this value was encoded for.
    pub fn property_type(&self) -> PropertyType {
        match self {
            Self::Text(_) => PropertyType::Text,
            Self::Number(_) => PropertyType::Number,
            Self::Date(_) => PropertyType::Date,
            Self::Bool(_) => PropertyType::Boolean,
            Self::Dropdown(_) => PropertyType::Dropdown,
            Self::Tags(_) => PropertyType::Tags,
            Self::Url(_) => PropertyType::Url,
        }
    }
}

/// Raw input from a form control, before coercion.
///
/// Serialized strings always come back as `Text`; the codec parses dates
/// from text itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Date(DateTime<FixedOffset>),
    List(Vec<String>),
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for RawValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<DateTime<Utc>> for RawValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value.fixed_offset())
    }
}

impl From<DateTime<FixedOffset>> for RawValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Date(value)
    }
}
