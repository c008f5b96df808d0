//! Survey field model.
//!
//! `Field` is the strict shape used across the API: a tagged union keyed on
//! `field_type`, so every kind carries only the attributes it can use.
//! `WireField` is the permissive camelCase shape spoken by the generation
//! service and found in stored fixtures. It converts into `Field` by keeping
//! what is legal for its type and dropping the rest.

use std::collections::HashSet;
use std::num::NonZeroU32;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

/// The kind of a survey question. Encoded on the wire as the integers 0–6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    ShortText = 0,
    LongText = 1,
    Number = 2,
    YesNo = 3,
    MultipleChoice = 4,
    Dropdown = 5,
    Rating = 6,
}

#[derive(Debug, Error)]
#[error("unknown field type code: {0}")]
pub struct UnknownFieldType(pub f64);

impl FieldType {
    pub const ALL: [FieldType; 7] = [
        FieldType::ShortText,
        FieldType::LongText,
        FieldType::Number,
        FieldType::YesNo,
        FieldType::MultipleChoice,
        FieldType::Dropdown,
        FieldType::Rating,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Accepts integral numbers only; the generation schema types this as a
    /// JSON "number", so `6.0` is as valid as `6`.
    pub fn from_number(raw: f64) -> Result<Self, UnknownFieldType> {
        if raw.fract() != 0.0 || !(0.0..=6.0).contains(&raw) {
            return Err(UnknownFieldType(raw));
        }
        Self::try_from(raw as u8)
    }
}

impl TryFrom<u8> for FieldType {
    type Error = UnknownFieldType;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(code as usize)
            .copied()
            .ok_or(UnknownFieldType(code as f64))
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        FieldType::from_number(raw).map_err(de::Error::custom)
    }
}

/// Inclusive bounds for a Number field, serialized as `[min, max]`.
/// An inverted pair is representable; consumers decide what to do with it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct NumberRange {
    pub min: f64,
    pub max: f64,
}

impl NumberRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl From<(f64, f64)> for NumberRange {
    fn from((min, max): (f64, f64)) -> Self {
        Self { min, max }
    }
}

impl From<NumberRange> for (f64, f64) {
    fn from(range: NumberRange) -> Self {
        (range.min, range.max)
    }
}

/// Ordered, distinct, non-empty choices. Fewer than two collapse to "unset",
/// so a value of this type always has at least `MIN_OPTIONS` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChoiceOptions(Vec<String>);

impl ChoiceOptions {
    pub const MIN_OPTIONS: usize = 2;

    pub fn new<I, S>(options: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let options: Vec<String> = options
            .into_iter()
            .map(|o| o.into().trim().to_string())
            .filter(|o| !o.is_empty() && seen.insert(o.clone()))
            .collect();
        (options.len() >= Self::MIN_OPTIONS).then_some(Self(options))
    }

    /// Parses the editor's comma-separated input: `"a, b,,a"` is `[a, b]`.
    pub fn parse_csv(input: &str) -> Option<Self> {
        Self::new(input.split(','))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Options as sent by clients: a list, or the raw comma-separated text box.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawOptions {
    List(Vec<String>),
    Csv(String),
}

fn deserialize_options<'de, D>(deserializer: D) -> Result<Option<ChoiceOptions>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawOptions>::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| match raw {
        RawOptions::List(options) => ChoiceOptions::new(options),
        RawOptions::Csv(input) => ChoiceOptions::parse_csv(&input),
    }))
}

fn deserialize_max_length<'de, D>(deserializer: D) -> Result<Option<NonZeroU32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.and_then(max_length_from_number))
}

fn max_length_from_number(raw: f64) -> Option<NonZeroU32> {
    if !raw.is_finite() || raw < 1.0 {
        return None;
    }
    NonZeroU32::new(raw.min(u32::MAX as f64) as u32)
}

/// Type-specific attributes, one variant per `FieldType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field_type", rename_all = "snake_case")]
pub enum FieldKind {
    ShortText {
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            deserialize_with = "deserialize_max_length"
        )]
        max_length: Option<NonZeroU32>,
    },
    LongText {
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            deserialize_with = "deserialize_max_length"
        )]
        max_length: Option<NonZeroU32>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<NumberRange>,
    },
    YesNo,
    MultipleChoice {
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            deserialize_with = "deserialize_options"
        )]
        options: Option<ChoiceOptions>,
        #[serde(default)]
        allow_multiple_selection: bool,
    },
    Dropdown {
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            deserialize_with = "deserialize_options"
        )]
        options: Option<ChoiceOptions>,
    },
    Rating,
}

impl FieldKind {
    /// The attribute-free kind for a type.
    pub fn empty(field_type: FieldType) -> Self {
        match field_type {
            FieldType::ShortText => FieldKind::ShortText { max_length: None },
            FieldType::LongText => FieldKind::LongText { max_length: None },
            FieldType::Number => FieldKind::Number { range: None },
            FieldType::YesNo => FieldKind::YesNo,
            FieldType::MultipleChoice => FieldKind::MultipleChoice {
                options: None,
                allow_multiple_selection: false,
            },
            FieldType::Dropdown => FieldKind::Dropdown { options: None },
            FieldType::Rating => FieldKind::Rating,
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            FieldKind::ShortText { .. } => FieldType::ShortText,
            FieldKind::LongText { .. } => FieldType::LongText,
            FieldKind::Number { .. } => FieldType::Number,
            FieldKind::YesNo => FieldType::YesNo,
            FieldKind::MultipleChoice { .. } => FieldType::MultipleChoice,
            FieldKind::Dropdown { .. } => FieldType::Dropdown,
            FieldKind::Rating => FieldType::Rating,
        }
    }

    pub fn max_length(&self) -> Option<NonZeroU32> {
        match self {
            FieldKind::ShortText { max_length } | FieldKind::LongText { max_length } => *max_length,
            _ => None,
        }
    }

    pub fn options(&self) -> Option<&ChoiceOptions> {
        match self {
            FieldKind::MultipleChoice { options, .. } | FieldKind::Dropdown { options } => {
                options.as_ref()
            }
            _ => None,
        }
    }

    /// Switches to another type, carrying over attributes that stay legal:
    /// max length between the text kinds, options between the choice kinds.
    pub fn retyped(self, field_type: FieldType) -> Self {
        if self.field_type() == field_type {
            return self;
        }
        let max_length = self.max_length();
        let options = self.options().cloned();
        match field_type {
            FieldType::ShortText => FieldKind::ShortText { max_length },
            FieldType::LongText => FieldKind::LongText { max_length },
            FieldType::MultipleChoice => FieldKind::MultipleChoice {
                options,
                allow_multiple_selection: false,
            },
            FieldType::Dropdown => FieldKind::Dropdown { options },
            other => FieldKind::empty(other),
        }
    }
}

/// One survey question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Replacement bodies may omit the id; the editor pins it to the target.
    #[serde(default)]
    pub id: Uuid,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl Field {
    /// A blank ShortText question, optional, with no constraints.
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            label: String::new(),
            description: None,
            required: false,
            kind: FieldKind::empty(FieldType::ShortText),
        }
    }

    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    pub fn set_field_type(&mut self, field_type: FieldType) {
        let kind = std::mem::replace(&mut self.kind, FieldKind::Rating);
        self.kind = kind.retyped(field_type);
    }
}

/// Permissive field shape: the generation service's reply format and the
/// format of stored fixtures. Any attribute may be present on any type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub field_type: FieldType,
    pub field_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_description: Option<String>,
    #[serde(default)]
    pub required_field: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_multiple_selection: Option<bool>,
}

impl WireField {
    /// Converts into the strict model. Attributes not legal for the field's
    /// type are ignored, as are malformed ones (a range that is not a pair,
    /// a non-positive length, fewer than two options).
    pub fn into_field(self, id: Uuid) -> Field {
        let max_length = self.maximum_length.and_then(max_length_from_number);
        let options = self.options.and_then(ChoiceOptions::new);
        let kind = match self.field_type {
            FieldType::ShortText => FieldKind::ShortText { max_length },
            FieldType::LongText => FieldKind::LongText { max_length },
            FieldType::Number => FieldKind::Number {
                range: match self.range.as_deref() {
                    Some(&[min, max]) => Some(NumberRange::new(min, max)),
                    _ => None,
                },
            },
            FieldType::YesNo => FieldKind::YesNo,
            FieldType::MultipleChoice => FieldKind::MultipleChoice {
                options,
                allow_multiple_selection: self.allow_multiple_selection.unwrap_or(false),
            },
            FieldType::Dropdown => FieldKind::Dropdown { options },
            FieldType::Rating => FieldKind::Rating,
        };

        Field {
            id,
            label: self.field_label,
            description: self.field_description.filter(|d| !d.trim().is_empty()),
            required: self.required_field,
            kind,
        }
    }
}

impl From<&Field> for WireField {
    fn from(field: &Field) -> Self {
        let (range, allow_multiple_selection) = match &field.kind {
            FieldKind::Number { range } => (range.map(|r| vec![r.min, r.max]), None),
            FieldKind::MultipleChoice {
                allow_multiple_selection,
                ..
            } => (None, Some(*allow_multiple_selection)),
            _ => (None, None),
        };

        WireField {
            id: Some(field.id),
            field_type: field.field_type(),
            field_label: field.label.clone(),
            field_description: field.description.clone(),
            required_field: field.required,
            maximum_length: field.kind.max_length().map(|n| n.get() as f64),
            range,
            options: field.kind.options().map(|o| o.as_slice().to_vec()),
            allow_multiple_selection,
        }
    }
}
