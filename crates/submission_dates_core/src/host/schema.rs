//! API schema declaration for the date properties.

use crate::model::submission_dates::DateField;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Schema type name for every date property.
pub const DATE_STRING_TYPE: &str = "date-string";

/// Static schema declaration for one date property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub multilingual: bool,
    pub nullable: bool,
    /// Property is included in API summary views.
    pub api_summary: bool,
}

impl FieldDescriptor {
    const DATE: Self = Self {
        kind: DATE_STRING_TYPE,
        multilingual: false,
        nullable: true,
        api_summary: true,
    };
}

/// Returns one descriptor per date field. Never depends on stored data.
pub fn describe_schema() -> BTreeMap<DateField, FieldDescriptor> {
    DateField::ALL
        .into_iter()
        .map(|field| (field, FieldDescriptor::DATE))
        .collect()
}

/// Merges the date properties into a host schema's `properties` object.
///
/// Existing entries under the same keys are replaced; other properties are
/// left alone.
pub fn merge_into_schema(properties: &mut Map<String, Value>) {
    for (field, descriptor) in describe_schema() {
        properties.insert(field.property_key().to_string(), descriptor_value(descriptor));
    }
}

fn descriptor_value(descriptor: FieldDescriptor) -> Value {
    json!({
        "type": descriptor.kind,
        "multilingual": descriptor.multilingual,
        "nullable": descriptor.nullable,
        "apiSummary": descriptor.api_summary,
    })
}
