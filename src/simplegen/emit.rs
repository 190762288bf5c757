//! Descriptor emission
//!
//! The built-in generator writes one JSON descriptor per platform,
//! `{out_dir}/{controller_class}.json`, holding the parsed exchanges
//! plus a response schema inferred from JSON bodies. Platform SDK
//! toolchains consume the descriptor downstream.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::extension::{
    ContentKind, EmptyPropertyPolicy, LangPackError, LangPackGenerator, Platform,
    RestExampleModel,
};

use super::TOOL_NAME;

/// [`LangPackGenerator`] writing JSON descriptors
pub struct DescriptorGenerator {
    controller_class: String,
    package: String,
    namespace: Option<String>,
    policy: EmptyPropertyPolicy,
    models: Vec<RestExampleModel>,
}

#[derive(Serialize)]
struct Descriptor<'a> {
    tool: &'static str,
    platform: &'a str,
    controller: &'a str,
    package: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
    methods: Vec<MethodEntry<'a>>,
}

#[derive(Serialize)]
struct MethodEntry<'a> {
    #[serde(flatten)]
    model: &'a RestExampleModel,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    response_schema: BTreeMap<String, String>,
}

impl DescriptorGenerator {
    pub fn new(
        controller_class: impl Into<String>,
        package: impl Into<String>,
        namespace: Option<String>,
        policy: EmptyPropertyPolicy,
    ) -> Self {
        Self {
            controller_class: controller_class.into(),
            package: package.into(),
            namespace,
            policy,
            models: Vec::new(),
        }
    }
}

impl LangPackGenerator for DescriptorGenerator {
    fn add(&mut self, model: RestExampleModel) {
        self.models.push(model);
    }

    fn len(&self) -> usize {
        self.models.len()
    }

    fn generate(&self, platform: Platform, out_dir: &Path) -> Result<(), LangPackError> {
        if self.models.is_empty() {
            return Err(LangPackError::Generation(
                "No examples to generate from".to_string(),
            ));
        }
        let mut methods = Vec::with_capacity(self.models.len());
        for model in &self.models {
            methods.push(MethodEntry {
                model,
                response_schema: infer_schema(model, self.policy)?,
            });
        }
        let descriptor = Descriptor {
            tool: TOOL_NAME,
            platform: platform.as_str(),
            controller: &self.controller_class,
            package: &self.package,
            namespace: self.namespace.as_deref(),
            methods,
        };
        let text = serde_json::to_string_pretty(&descriptor).map_err(|error| {
            LangPackError::Generation(format!("Cannot serialize the descriptor: {error}"))
        })?;
        fs::write(out_dir.join(format!("{}.json", self.controller_class)), text)?;
        Ok(())
    }
}

/// Property name to type name, from a JSON response body. Non-JSON and
/// non-object responses yield an empty schema.
fn infer_schema(
    model: &RestExampleModel,
    policy: EmptyPropertyPolicy,
) -> Result<BTreeMap<String, String>, LangPackError> {
    let mut schema = BTreeMap::new();
    if model.response_content != Some(ContentKind::Json) {
        return Ok(schema);
    }
    let Some(body) = model.response_body.as_deref() else {
        return Ok(schema);
    };
    let value: serde_json::Value = serde_json::from_str(body).map_err(|error| {
        LangPackError::Generation(format!(
            "Example {} has a malformed JSON response: {error}",
            model.name
        ))
    })?;
    let serde_json::Value::Object(object) = value else {
        return Ok(schema);
    };

    for (property, value) in &object {
        match property_type(value) {
            Some(kind) => {
                schema.insert(property.clone(), kind.to_string());
            }
            // Null or empty values carry no type to infer
            None => match policy {
                EmptyPropertyPolicy::Abort => {
                    return Err(LangPackError::Generation(format!(
                        "Cannot infer a type for '{property}' in example {}; \
                         use --policy ignore or default-type",
                        model.name
                    )));
                }
                EmptyPropertyPolicy::Ignore => {}
                EmptyPropertyPolicy::DefaultType => {
                    schema.insert(property.clone(), "string".to_string());
                }
            },
        }
    }
    Ok(schema)
}

fn property_type(value: &serde_json::Value) -> Option<&'static str> {
    use serde_json::Value;
    match value {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(_) => Some("string"),
        Value::Bool(_) => Some("boolean"),
        Value::Number(number) if number.is_f64() => Some("float"),
        Value::Number(_) => Some("int"),
        Value::Array(_) => Some("array"),
        Value::Object(_) => Some("object"),
    }
}
