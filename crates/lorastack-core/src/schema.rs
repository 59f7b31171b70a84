//! Node registration schema
//!
//! Describes the form the host renders for this node and the shape of its
//! outputs.

use crate::slot::{
    DEFAULT_WEIGHT, MAX_SLOTS, MAX_WEIGHT, MIN_WEIGHT, NO_LORAS_PLACEHOLDER, WEIGHT_STEP,
    weight_field,
};
use serde::{Deserialize, Serialize};

/// Identifier the host registers the node under
pub const NODE_ID: &str = "LoraStackTagSelector";

/// Human-readable node title
pub const DISPLAY_NAME: &str = "LoRA Stack + Tag Selector (Selectable Triggers)";

/// Menu category
pub const CATEGORY: &str = "Custom/LoRA";

/// Output socket types, in order
pub const RETURN_TYPES: [&str; 6] = ["MODEL", "CLIP", "LORA_STACK", "LIST", "STRING", "LIST"];

/// Output socket names, in order
pub const RETURN_NAMES: [&str; 6] = [
    "Model",
    "Clip",
    "Lora_Stack",
    "Selected_Tags_List",
    "Selected_Tags_String",
    "Lora_Names_List",
];

/// A single form input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputKind {
    /// Opaque graph handle (`MODEL`, `CLIP`)
    Handle { handle: String },
    /// Choice from a fixed list
    Choice { options: Vec<String> },
    Boolean { default: bool },
    Float {
        default: f64,
        min: f64,
        max: f64,
        step: f64,
    },
}

/// Named form input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputField {
    pub name: String,
    #[serde(flatten)]
    pub kind: InputKind,
}

impl InputField {
    fn new(name: impl Into<String>, kind: InputKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Full node description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSchema {
    pub id: String,
    pub display_name: String,
    pub category: String,
    pub output_node: bool,
    /// Required inputs, in form order
    pub required: Vec<InputField>,
    pub return_types: Vec<String>,
    pub return_names: Vec<String>,
}

impl NodeSchema {
    /// Describe the node given the files the storage resolver can see.
    ///
    /// With no files available the file selectors offer only the placeholder.
    pub fn describe(available_files: &[String]) -> Self {
        let files = if available_files.is_empty() {
            vec![NO_LORAS_PLACEHOLDER.to_string()]
        } else {
            available_files.to_vec()
        };

        let mut required = vec![
            InputField::new(
                "model",
                InputKind::Handle {
                    handle: "MODEL".to_string(),
                },
            ),
            InputField::new(
                "clip",
                InputKind::Handle {
                    handle: "CLIP".to_string(),
                },
            ),
            InputField::new(
                "num_loras",
                InputKind::Choice {
                    options: (1..=MAX_SLOTS).map(|n| n.to_string()).collect(),
                },
            ),
        ];

        for i in 1..=MAX_SLOTS {
            required.push(InputField::new(
                format!("lora{i}_enabled"),
                InputKind::Boolean { default: false },
            ));
            required.push(InputField::new(
                format!("lora{i}_file"),
                InputKind::Choice {
                    options: files.clone(),
                },
            ));
            required.push(InputField::new(
                weight_field(i),
                InputKind::Float {
                    default: DEFAULT_WEIGHT,
                    min: MIN_WEIGHT,
                    max: MAX_WEIGHT,
                    step: WEIGHT_STEP,
                },
            ));
        }

        Self {
            id: NODE_ID.to_string(),
            display_name: DISPLAY_NAME.to_string(),
            category: CATEGORY.to_string(),
            output_node: true,
            required,
            return_types: RETURN_TYPES.iter().map(|s| s.to_string()).collect(),
            return_names: RETURN_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Find an input by name
    pub fn field(&self, name: &str) -> Option<&InputField> {
        self.required.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_field_count() {
        let schema = NodeSchema::describe(&["a.safetensors".to_string()]);
        // model, clip, num_loras + three per slot
        assert_eq!(schema.required.len(), 3 + 3 * MAX_SLOTS);
        assert_eq!(schema.return_names.len(), schema.return_types.len());
        assert!(schema.output_node);
    }

    #[test]
    fn test_schema_placeholder_without_files() {
        let schema = NodeSchema::describe(&[]);
        let field = schema.field("lora3_file").unwrap();
        assert_eq!(
            field.kind,
            InputKind::Choice {
                options: vec![NO_LORAS_PLACEHOLDER.to_string()]
            }
        );
    }

    #[test]
    fn test_schema_weight_bounds() {
        let schema = NodeSchema::describe(&[]);
        match &schema.field("lora6_weight").unwrap().kind {
            InputKind::Float { min, max, step, .. } => {
                assert_eq!(*min, -3.0);
                assert_eq!(*max, 3.0);
                assert_eq!(*step, 0.01);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_schema_serializes_flat() {
        let schema = NodeSchema::describe(&[]);
        let json = serde_json::to_value(schema.field("lora1_enabled").unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "lora1_enabled", "type": "boolean", "default": false})
        );
    }
}
