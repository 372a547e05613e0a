//! Object schema model.
//!
//! Field metadata as returned by an org's describe call. The core treats a
//! schema snapshot as already fetched — discovery lives behind the
//! [`SchemaProvider`](provider::SchemaProvider) trait.

pub mod provider;

pub use provider::{
    CachedSchemaProvider, SchemaError, SchemaProvider, SchemaResult, StaticSchemaProvider,
};

use serde::{Deserialize, Serialize};

/// Declared field type, from the vendor describe vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Id,
    String,
    Boolean,
    Int,
    Double,
    Currency,
    Percent,
    Date,
    Datetime,
    Time,
    Email,
    Phone,
    Url,
    Textarea,
    Picklist,
    Multipicklist,
    Combobox,
    Reference,
    Address,
    Location,
    Base64,
    Encryptedstring,
    Anytype,
    /// Any describe type this crate has no special handling for.
    #[serde(other)]
    Other,
}

impl FieldType {
    /// Numeric types accepted by `sum`/`avg`/`median`/`stddev`/`variance`/`sum-if`.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Int | FieldType::Double | FieldType::Currency | FieldType::Percent
        )
    }

    /// Date-like types, accepted by `min`/`max` alongside numerics.
    pub fn is_date_like(&self) -> bool {
        matches!(self, FieldType::Date | FieldType::Datetime | FieldType::Time)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Id => "id",
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::Int => "int",
            FieldType::Double => "double",
            FieldType::Currency => "currency",
            FieldType::Percent => "percent",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::Time => "time",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Url => "url",
            FieldType::Textarea => "textarea",
            FieldType::Picklist => "picklist",
            FieldType::Multipicklist => "multipicklist",
            FieldType::Combobox => "combobox",
            FieldType::Reference => "reference",
            FieldType::Address => "address",
            FieldType::Location => "location",
            FieldType::Base64 => "base64",
            FieldType::Encryptedstring => "encryptedstring",
            FieldType::Anytype => "anytype",
            FieldType::Other => "other",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for one field of an object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMetadata {
    /// API name, canonical casing.
    pub name: String,
    /// Human-readable label.
    #[serde(default)]
    pub label: Option<String>,
    /// Declared type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the field may appear inside an aggregate function.
    #[serde(default)]
    pub aggregatable: bool,
    /// Whether the field may appear in a WHERE clause.
    #[serde(default)]
    pub filterable: bool,
}

/// Describe snapshot for one object in one environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSchema {
    pub name: String,
    pub fields: Vec<FieldMetadata>,
}

impl ObjectSchema {
    /// Case-insensitive field lookup by API name.
    pub fn field(&self, name: &str) -> Option<&FieldMetadata> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }
}
