//! Schema Documents - Schemas and flows loaded from JSON.
//!
//! A form can be described entirely as data:
//!
//! ```json
//! {
//!   "schema": {
//!     "name":    { "type": "string", "label": "Name" },
//!     "plan":    { "type": "select", "props": { "optionsFrom": "/api/plans" } },
//!     "address": { "type": "form", "schema": { "city": { "type": "string" } }, "flow": ["city"] },
//!     "steps":   { "type": "arrayForm", "selector": "kind", "schema": { ... }, "flow": [ ... ] }
//!   },
//!   "flow": ["name", ">>>Billing", "plan", "address", "---", "steps"]
//! }
//! ```
//!
//! Type tags are the ones [`FieldKind::from_tag`] knows, plus `form` (or
//! `object` with a nested schema) and `arrayForm`. Any other tag becomes
//! [`FieldKind::Other`] and is resolved by the dispatcher's named renderers
//! at render time. Predicates in documents are fixed booleans; computed
//! predicates need code.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::engine::{FormError, FormResult};
use crate::types::{FieldDefinition, FieldKind, FieldProps, Flow, Schema, SelectOption, SubForm};
use crate::value::Value;

/// A whole form: schema plus flow.
#[derive(Clone, Debug, Deserialize)]
pub struct SchemaDocument {
    pub schema: BTreeMap<String, FieldDocument>,
    #[serde(default)]
    pub flow: Vec<String>,
}

/// One field of a [`SchemaDocument`].
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDocument {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub help: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
    #[serde(default)]
    pub props: PropsDocument,
    /// Nested schema for `form` and `arrayForm`.
    #[serde(default)]
    pub schema: Option<BTreeMap<String, FieldDocument>>,
    /// Nested flow. Defaults to the nested schema's fields in name order.
    #[serde(default)]
    pub flow: Option<Vec<String>>,
    /// Discriminator key for `arrayForm`.
    #[serde(default)]
    pub selector: Option<String>,
}

fn visible_by_default() -> bool {
    true
}

/// Props as written in documents. Unrecognised keys land in `extra`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropsDocument {
    pub placeholder: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub rows: Option<u16>,
    pub language: Option<String>,
    pub options: Vec<Value>,
    pub options_from: Option<String>,
    #[serde(alias = "isClearable")]
    pub clearable: bool,
    pub creatable: bool,
    pub placeholder_key: Option<String>,
    pub placeholder_value: Option<String>,
    pub default_entry: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl From<PropsDocument> for FieldProps {
    fn from(doc: PropsDocument) -> Self {
        FieldProps {
            placeholder: doc.placeholder,
            prefix: doc.prefix,
            suffix: doc.suffix,
            min: doc.min,
            max: doc.max,
            step: doc.step,
            rows: doc.rows,
            language: doc.language,
            options: doc.options.iter().map(SelectOption::from_value).collect(),
            options_from: doc.options_from,
            transformer: None,
            fetch_condition: None,
            clearable: doc.clearable,
            creatable: doc.creatable,
            placeholder_key: doc.placeholder_key,
            placeholder_value: doc.placeholder_value,
            default_entry: doc.default_entry,
            extra: doc.extra,
        }
    }
}

impl SchemaDocument {
    pub fn from_json(text: &str) -> FormResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build the schema and flow.
    pub fn into_parts(self) -> FormResult<(Schema, Flow)> {
        let schema = build_schema(self.schema)?;
        Ok((schema, Flow::parse(self.flow.iter().map(String::as_str))))
    }
}

impl Flow {
    /// Parse a JSON array of flow markers.
    pub fn from_json(text: &str) -> FormResult<Flow> {
        let items: Vec<String> = serde_json::from_str(text)?;
        Ok(Flow::parse(items.iter().map(String::as_str)))
    }
}

fn build_schema(fields: BTreeMap<String, FieldDocument>) -> FormResult<Schema> {
    let mut schema = Schema::new();
    for (name, doc) in fields {
        let definition = build_field(&name, doc)?;
        schema.insert(name, definition);
    }
    Ok(schema)
}

fn build_sub_form(
    name: &str,
    fields: Option<BTreeMap<String, FieldDocument>>,
    flow: Option<Vec<String>>,
) -> FormResult<SubForm> {
    let fields = fields.ok_or_else(|| FormError::InvalidDefinition {
        field: name.to_string(),
        reason: "nested form without a schema".to_string(),
    })?;
    let flow = match flow {
        Some(items) => Flow::parse(items.iter().map(String::as_str)),
        None => Flow::parse(fields.keys().map(String::as_str)),
    };
    Ok(SubForm::new(build_schema(fields)?, flow))
}

fn build_field(name: &str, doc: FieldDocument) -> FormResult<FieldDefinition> {
    let kind = match doc.kind.as_str() {
        "form" => FieldKind::NestedObject(build_sub_form(name, doc.schema, doc.flow)?),
        "object" if doc.schema.is_some() => {
            FieldKind::NestedObject(build_sub_form(name, doc.schema, doc.flow)?)
        }
        "arrayForm" => {
            let selector = doc.selector.ok_or_else(|| FormError::InvalidDefinition {
                field: name.to_string(),
                reason: "arrayForm without a selector".to_string(),
            })?;
            FieldKind::NestedArray {
                form: build_sub_form(name, doc.schema, doc.flow)?,
                selector,
            }
        }
        tag => FieldKind::from_tag(tag),
    };

    let mut definition = FieldDefinition::new(kind)
        .disabled(doc.disabled)
        .visible(doc.visible)
        .props(doc.props.into());
    definition.label = doc.label;
    definition.help = doc.help;
    Ok(definition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FlowStep;

    const SIGNUP: &str = r#"{
        "schema": {
            "name": { "type": "string", "label": "Name" },
            "age": { "type": "number", "props": { "min": 0, "step": 1 } },
            "plan": {
                "type": "select",
                "props": { "options": ["free", { "label": "Gold", "value": "gold" }], "isClearable": true, "width": 4 }
            },
            "address": {
                "type": "form",
                "schema": { "city": { "type": "string" }, "zip": { "type": "string" } },
                "flow": ["zip", "city"]
            },
            "stars": { "type": "rating", "visible": false }
        },
        "flow": ["name", ">>>More", "age", "plan", "---", "address"]
    }"#;

    #[test]
    fn test_document_builds_schema_and_flow() {
        let (schema, flow) = SchemaDocument::from_json(SIGNUP).unwrap().into_parts().unwrap();

        assert_eq!(schema.len(), 5);
        assert_eq!(schema.get("name").unwrap().label.as_deref(), Some("Name"));
        assert_eq!(flow.steps().len(), 6);
        assert!(matches!(&flow.steps()[1], FlowStep::CollapseStart { label, collapsed: true } if label == "More"));
    }

    #[test]
    fn test_props_are_mapped() {
        let (schema, _) = SchemaDocument::from_json(SIGNUP).unwrap().into_parts().unwrap();

        let plan = &schema.get("plan").unwrap().props;
        assert_eq!(plan.options, vec![SelectOption::new("free", "free"), SelectOption::new("Gold", "gold")]);
        assert!(plan.clearable);
        assert_eq!(plan.extra.get("width"), Some(&Value::from(4)), "unknown keys go to extra");

        assert_eq!(schema.get("age").unwrap().props.min, Some(0.0));
    }

    #[test]
    fn test_nested_form_and_unknown_tag() {
        let (schema, _) = SchemaDocument::from_json(SIGNUP).unwrap().into_parts().unwrap();

        let FieldKind::NestedObject(address) = &schema.get("address").unwrap().kind else {
            panic!("address should be a nested form");
        };
        assert_eq!(address.flow.field_names().collect::<Vec<_>>(), vec!["zip", "city"]);

        let stars = schema.get("stars").unwrap();
        assert!(matches!(&stars.kind, FieldKind::Other(tag) if tag == "rating"));
        assert!(!stars.visible.eval(&Value::Null));
    }

    #[test]
    fn test_array_form_requires_selector() {
        let doc = r#"{ "schema": { "steps": { "type": "arrayForm", "schema": {} } } }"#;
        let err = SchemaDocument::from_json(doc).unwrap().into_parts().unwrap_err();

        assert!(matches!(err, FormError::InvalidDefinition { field, .. } if field == "steps"));
    }

    #[test]
    fn test_nested_flow_defaults_to_schema_order() {
        let doc = r#"{ "schema": { "steps": {
            "type": "arrayForm", "selector": "kind",
            "schema": { "kind": { "type": "label" }, "b": { "type": "string" } }
        } } }"#;
        let (schema, _) = SchemaDocument::from_json(doc).unwrap().into_parts().unwrap();

        let FieldKind::NestedArray { form, selector } = &schema.get("steps").unwrap().kind else {
            panic!("steps should be an array form");
        };
        assert_eq!(selector, "kind");
        assert_eq!(form.flow.field_names().collect::<Vec<_>>(), vec!["b", "kind"]);
    }

    #[test]
    fn test_malformed_json_is_schema_error() {
        assert!(matches!(SchemaDocument::from_json("{"), Err(FormError::Schema(_))));
        assert!(matches!(Flow::from_json("[1]"), Err(FormError::Schema(_))));
        assert_eq!(Flow::from_json(r#"["a", "---"]"#).unwrap().steps().len(), 2);
    }
}
