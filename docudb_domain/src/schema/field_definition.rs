// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Schema Field Definitions
//!
//! Declarative per-field rules: expected type, requiredness, defaults (static
//! or computed), constraints, and a post-validation transform. A schema is an
//! ordered list of these definitions plus options; compilation and execution
//! live in [`crate::schema::Schema`].
//!
//! Callbacks (computed defaults, custom validators, transforms) are carried
//! as shared function objects so a schema can be cloned cheaply and shared
//! across collections and threads.

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

/// Document value types a schema field can demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    /// A point-in-time carried as an RFC-3339 string
    Date,
    Object,
    Array,
}

impl FieldType {
    /// Checks a present, non-null value against this type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Date => crate::document::parse_datetime(value).is_some(),
            FieldType::Object => value.is_object(),
            FieldType::Array => value.is_array(),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Number => write!(f, "number"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::Date => write!(f, "date"),
            FieldType::Object => write!(f, "object"),
            FieldType::Array => write!(f, "array"),
        }
    }
}

/// Outcome of a custom validator.
///
/// Mirrors the loosely-typed contract of the validator callback: success,
/// generic failure, or failure with a caller-supplied message.
#[derive(Debug, Clone)]
pub enum CustomCheck {
    Pass,
    Fail,
    FailWith(String),
}

impl From<bool> for CustomCheck {
    fn from(ok: bool) -> Self {
        if ok {
            CustomCheck::Pass
        } else {
            CustomCheck::Fail
        }
    }
}

/// Custom validator callback: `(value, whole document) -> outcome`.
pub type CustomValidator = Arc<dyn Fn(&Value, &Value) -> CustomCheck + Send + Sync>;

/// Post-validation value transform.
pub type ValueTransform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Computed default callback: `(original document, field name) -> value`.
pub type DefaultFn = Arc<dyn Fn(&Value, &str) -> Value + Send + Sync>;

/// Default for an absent field: a static value (deep-copied per use) or a
/// function called lazily with the original document and the field name.
#[derive(Clone)]
pub enum DefaultValue {
    Static(Value),
    Computed(DefaultFn),
}

impl std::fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefaultValue::Static(v) => f.debug_tuple("Static").field(v).finish(),
            DefaultValue::Computed(_) => f.debug_tuple("Computed").field(&"<fn>").finish(),
        }
    }
}

/// Constraints applied to a field only when it is present and non-null.
///
/// Constraints run in declaration order: `min`, `max`, `min_length`,
/// `max_length`, `pattern`, `enum`, `custom`. The optional `message`
/// overrides the generated error text for every constraint failure on this
/// field.
#[derive(Clone, Default)]
pub struct ValidationRules {
    pub(crate) min: Option<f64>,
    pub(crate) max: Option<f64>,
    pub(crate) min_length: Option<usize>,
    pub(crate) max_length: Option<usize>,
    pub(crate) pattern: Option<Regex>,
    pub(crate) enum_values: Option<Vec<Value>>,
    pub(crate) custom: Option<CustomValidator>,
    pub(crate) message: Option<String>,
}

impl ValidationRules {
    /// Creates an empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the numeric lower bound (inclusive)
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets the numeric upper bound (inclusive)
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Sets the minimum string/array length
    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    /// Sets the maximum string/array length
    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    /// Sets the regex a string value must match.
    ///
    /// The pattern is applied exactly as written: no implicit anchoring.
    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Restricts the value to one of the given alternatives (deep equality)
    pub fn enum_values(mut self, values: Vec<Value>) -> Self {
        self.enum_values = Some(values);
        self
    }

    /// Sets a custom validator callback
    pub fn custom<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Value) -> CustomCheck + Send + Sync + 'static,
    {
        self.custom = Some(Arc::new(f));
        self
    }

    /// Overrides the error text for this field's constraint failures
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl std::fmt::Debug for ValidationRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationRules")
            .field("min", &self.min)
            .field("max", &self.max)
            .field("min_length", &self.min_length)
            .field("max_length", &self.max_length)
            .field("pattern", &self.pattern.as_ref().map(|r| r.as_str()))
            .field("enum_values", &self.enum_values)
            .field("custom", &self.custom.as_ref().map(|_| "<fn>"))
            .field("message", &self.message)
            .finish()
    }
}

/// Complete definition of one schema field.
#[derive(Clone)]
pub struct FieldDefinition {
    pub(crate) field_type: FieldType,
    pub(crate) required: bool,
    pub(crate) default: Option<DefaultValue>,
    pub(crate) validate: Option<ValidationRules>,
    pub(crate) transform: Option<ValueTransform>,
}

impl FieldDefinition {
    /// Creates a definition of the given type with no further rules
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            default: None,
            validate: None,
            transform: None,
        }
    }

    /// Marks the field required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets a static default (deep-copied on each use)
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(DefaultValue::Static(value));
        self
    }

    /// Sets a computed default, called lazily with `(document, field name)`
    pub fn default_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &str) -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Computed(Arc::new(f)));
        self
    }

    /// Attaches constraint rules
    pub fn validate(mut self, rules: ValidationRules) -> Self {
        self.validate = Some(rules);
        self
    }

    /// Attaches a post-validation transform
    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(f));
        self
    }

    /// Gets the expected type
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// True when the field carries a `validate.pattern` rule
    pub fn has_pattern(&self) -> bool {
        self.validate.as_ref().is_some_and(|v| v.pattern.is_some())
    }
}

impl std::fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("field_type", &self.field_type)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("validate", &self.validate)
            .field("transform", &self.transform.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
