use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Describes how the pixel colors of a tile are turned into class labels.
///
/// In JSON, a number selects the binary mode and an object of
/// `"class name": [label, [r, g, b, a]]` selects the multi-class mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum ClassSpec {
    Binary(BinaryClass),
    Multiclass(MulticlassMap),
}

/// Every pixel that is not fully transparent gets the `label`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryClass {
    pub label: f64,
}

/// Reference color and label of one class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassDefinition {
    pub label: f64,
    pub color: [u8; 4],
}

/// Classes in the order of their definition
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MulticlassMap {
    classes: Vec<(String, ClassDefinition)>,
}

impl MulticlassMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a class. Redefining a class replaces its definition but keeps its position.
    #[must_use]
    pub fn with_class(mut self, name: impl Into<String>, label: f64, color: [u8; 4]) -> Self {
        self.insert(name, ClassDefinition { label, color });
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, definition: ClassDefinition) {
        let name = name.into();

        if let Some((_, existing)) = self.classes.iter_mut().find(|(n, _)| *n == name) {
            *existing = definition;
        } else {
            self.classes.push((name, definition));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClassDefinition)> {
        self.classes
            .iter()
            .map(|(name, definition)| (name.as_str(), definition))
    }

    pub fn labels(&self) -> impl Iterator<Item = f64> + '_ {
        self.classes.iter().map(|(_, definition)| definition.label)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassSpec {
    pub fn binary(label: f64) -> Self {
        Self::Binary(BinaryClass { label })
    }

    /// All labels that may be written into the output raster
    pub fn labels(&self) -> Vec<f64> {
        match self {
            ClassSpec::Binary(binary) => vec![binary.label],
            ClassSpec::Multiclass(classes) => classes.labels().collect(),
        }
    }
}

impl From<MulticlassMap> for ClassSpec {
    fn from(classes: MulticlassMap) -> Self {
        Self::Multiclass(classes)
    }
}

fn unsupported(reason: impl Into<String>) -> Error {
    Error::UnsupportedConfiguration {
        reason: reason.into(),
    }
}

fn parse_class_definition(name: &str, value: &Value) -> Result<ClassDefinition, Error> {
    let invalid = || unsupported(format!("class `{name}` must be given as [label, [r, g, b, a]]"));

    let [label, color] = value.as_array().map(Vec::as_slice).ok_or_else(invalid)? else {
        return Err(invalid());
    };

    let label = label.as_f64().ok_or_else(invalid)?;

    let channels = color.as_array().ok_or_else(invalid)?;
    if channels.len() != 4 {
        return Err(invalid());
    }

    let mut rgba = [0_u8; 4];
    for (channel, value) in rgba.iter_mut().zip(channels) {
        *channel = value
            .as_u64()
            .and_then(|v| u8::try_from(v).ok())
            .ok_or_else(invalid)?;
    }

    Ok(ClassDefinition { label, color: rgba })
}

impl TryFrom<Value> for ClassSpec {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(number) => number
                .as_f64()
                .map(ClassSpec::binary)
                .ok_or_else(|| unsupported("the binary class label must be a finite number")),
            Value::Object(object) => {
                let mut classes = MulticlassMap::new();
                for (name, definition) in &object {
                    classes.insert(name.clone(), parse_class_definition(name, definition)?);
                }
                Ok(ClassSpec::Multiclass(classes))
            }
            other => Err(unsupported(format!(
                "expected a label or a map of classes, found `{other}`"
            ))),
        }
    }
}

impl From<ClassSpec> for Value {
    fn from(class_spec: ClassSpec) -> Self {
        match class_spec {
            ClassSpec::Binary(binary) => Value::from(binary.label),
            ClassSpec::Multiclass(classes) => Value::Object(
                classes
                    .iter()
                    .map(|(name, definition)| {
                        (
                            name.to_string(),
                            serde_json::json!([definition.label, definition.color]),
                        )
                    })
                    .collect(),
            ),
        }
    }
}
