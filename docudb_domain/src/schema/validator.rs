// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Schema Validation
//!
//! Validates and normalizes a document against an ordered set of field
//! definitions. Validation runs field-by-field in definition order:
//!
//! 1. absent + required -> `RequiredField`
//! 2. absent + default -> assign the default (static defaults are deep-copied
//!    per call; computed defaults are called lazily with the original
//!    document and the field name; defaults are never type-checked)
//! 3. present -> type check (`InvalidType` on mismatch; `null` is accepted
//!    for any type since `null` is a value, not a type)
//! 4. constraints in order: `min`, `max`, `min_length`, `max_length`,
//!    `pattern`, `enum`, `custom` - each with its own error code
//! 5. transform, then assign into the validated output
//!
//! Extra top-level keys not starting with `_` fail under `strict`; otherwise
//! they pass through untouched. With `timestamps` enabled, `_updatedAt` is
//! refreshed on every validation and `_createdAt` is set only when the input
//! document lacks it.
//!
//! The compiled schema also carries `owns_id_validation`, set at construction
//! when the definition contains an `_id` field with a `validate.pattern`.
//! The collection controller consults that flag instead of reflecting on the
//! definition at call time.

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::document::{deep_equal, require_object};
use crate::error::StoreError;
use crate::schema::field_definition::{CustomCheck, DefaultValue, FieldDefinition, ValidationRules};
use crate::value_objects::IdKind;

/// Schema-level options.
#[derive(Debug, Clone, Copy)]
pub struct SchemaOptions {
    /// Reject top-level keys outside the definition (default true)
    pub strict: bool,
    /// Maintain `_createdAt` / `_updatedAt` (default false)
    pub timestamps: bool,
    /// Identifier format for generated `_id`s; `None` defers to the
    /// collection's configuration
    pub id_type: Option<IdKind>,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            strict: true,
            timestamps: false,
            id_type: None,
        }
    }
}

/// Compiled document schema: ordered field definitions plus options.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<(String, FieldDefinition)>,
    options: SchemaOptions,
    owns_id_validation: bool,
}

impl Schema {
    /// Compiles a schema from its definition.
    pub fn new(fields: Vec<(String, FieldDefinition)>, options: SchemaOptions) -> Self {
        let owns_id_validation = fields.iter().any(|(name, def)| name == "_id" && def.has_pattern());
        Self {
            fields,
            options,
            owns_id_validation,
        }
    }

    /// Starts an empty schema builder
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Gets the schema options
    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// True when the schema defines `_id` with a pattern rule, taking over
    /// identifier-format validation from the collection controller
    pub fn owns_id_validation(&self) -> bool {
        self.owns_id_validation
    }

    /// Looks up a field definition by name
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, def)| def)
    }

    /// Validates and normalizes a document.
    ///
    /// On success returns the validated output: the input document with
    /// defaults filled in, transforms applied, and (when enabled) timestamps
    /// maintained. The input is never mutated.
    pub fn validate(&self, doc: &Value) -> Result<Value, StoreError> {
        let input = require_object(doc)?;

        if self.options.strict {
            for key in input.keys() {
                if !key.starts_with('_') && self.field(key).is_none() {
                    return Err(StoreError::InvalidField(format!(
                        "field '{}' is not declared in the schema",
                        key
                    )));
                }
            }
        }

        // Start from the input so key insertion order survives validation.
        let mut output = doc.clone();

        for (name, def) in &self.fields {
            match input.get(name) {
                None => {
                    if def.required {
                        return Err(StoreError::RequiredField(format!("field '{}' is required", name)));
                    }
                    if let Some(default) = &def.default {
                        let value = match default {
                            DefaultValue::Static(v) => v.clone(),
                            DefaultValue::Computed(f) => f(doc, name),
                        };
                        output
                            .as_object_mut()
                            .expect("validated output is always a map")
                            .insert(name.clone(), value);
                    }
                }
                Some(Value::Null) => {
                    // null is a value: requiredness is satisfied, constraints
                    // do not run.
                }
                Some(value) => {
                    if !def.field_type.matches(value) {
                        return Err(StoreError::InvalidType(format!(
                            "field '{}' expected {}, got {}",
                            name,
                            def.field_type,
                            type_name(value)
                        )));
                    }

                    if let Some(rules) = &def.validate {
                        check_constraints(name, value, doc, rules)?;
                    }

                    if let Some(transform) = &def.transform {
                        let transformed = transform(value.clone());
                        output
                            .as_object_mut()
                            .expect("validated output is always a map")
                            .insert(name.clone(), transformed);
                    }
                }
            }
        }

        if self.options.timestamps {
            let now = Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
            let map = output.as_object_mut().expect("validated output is always a map");
            if !input.contains_key("_createdAt") {
                map.insert("_createdAt".to_string(), now.clone());
            }
            map.insert("_updatedAt".to_string(), now);
        }

        Ok(output)
    }
}

/// Incremental schema construction in definition order.
#[derive(Default)]
pub struct SchemaBuilder {
    fields: Vec<(String, FieldDefinition)>,
    options: SchemaOptions,
}

impl SchemaBuilder {
    /// Appends a field definition
    pub fn field(mut self, name: impl Into<String>, def: FieldDefinition) -> Self {
        self.fields.push((name.into(), def));
        self
    }

    /// Sets strict mode
    pub fn strict(mut self, strict: bool) -> Self {
        self.options.strict = strict;
        self
    }

    /// Enables or disables timestamp maintenance
    pub fn timestamps(mut self, timestamps: bool) -> Self {
        self.options.timestamps = timestamps;
        self
    }

    /// Sets the identifier format for generated `_id`s
    pub fn id_type(mut self, id_type: IdKind) -> Self {
        self.options.id_type = Some(id_type);
        self
    }

    /// Compiles the schema
    pub fn build(self) -> Schema {
        Schema::new(self.fields, self.options)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Runs the constraint chain for one present, non-null field value.
fn check_constraints(field: &str, value: &Value, doc: &Value, rules: &ValidationRules) -> Result<(), StoreError> {
    let text = |generated: String| -> String {
        match &rules.message {
            Some(message) => format!("field '{}': {}", field, message),
            None => format!("field '{}': {}", field, generated),
        }
    };

    if let Some(min) = rules.min {
        if let Some(n) = value.as_f64() {
            if n < min {
                return Err(StoreError::InvalidValue(text(format!("value {} is below minimum {}", n, min))));
            }
        }
    }

    if let Some(max) = rules.max {
        if let Some(n) = value.as_f64() {
            if n > max {
                return Err(StoreError::InvalidValue(text(format!("value {} exceeds maximum {}", n, max))));
            }
        }
    }

    let measured_len = match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    };

    if let (Some(min_len), Some(len)) = (rules.min_length, measured_len) {
        if len < min_len {
            return Err(StoreError::InvalidLength(text(format!(
                "length {} is below minimum {}",
                len, min_len
            ))));
        }
    }

    if let (Some(max_len), Some(len)) = (rules.max_length, measured_len) {
        if len > max_len {
            return Err(StoreError::InvalidLength(text(format!(
                "length {} exceeds maximum {}",
                len, max_len
            ))));
        }
    }

    if let Some(pattern) = &rules.pattern {
        if let Some(s) = value.as_str() {
            if !pattern.is_match(s) {
                return Err(StoreError::InvalidRegex(text(format!(
                    "value does not match pattern '{}'",
                    pattern.as_str()
                ))));
            }
        }
    }

    if let Some(allowed) = &rules.enum_values {
        if !allowed.iter().any(|candidate| deep_equal(value, candidate)) {
            return Err(StoreError::InvalidEnum(text("value is not one of the allowed alternatives".to_string())));
        }
    }

    if let Some(custom) = &rules.custom {
        match custom(value, doc) {
            CustomCheck::Pass => {}
            CustomCheck::Fail => {
                return Err(StoreError::CustomValidation(text("custom validation failed".to_string())));
            }
            CustomCheck::FailWith(message) => {
                return Err(StoreError::CustomValidation(format!("field '{}': {}", field, message)));
            }
        }
    }

    Ok(())
}
