// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Criteria Compilation
//!
//! Compiles a MongoDB-subset criteria document into an AST evaluated by the
//! matcher. Compilation happens once per query; evaluation is a pure function
//! over the AST, so a query can be run against any number of documents
//! without re-parsing.
//!
//! ## Grammar
//!
//! - Top level: a map from field names to either a scalar (equality) or an
//!   operator object.
//! - Logical operators at any level: `$and: [criteria...]`,
//!   `$or: [criteria...]`, `$not: criteria`.
//! - Field operators: `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`,
//!   `$nin`, `$exists`, `$regex` (with optional `$options`), `$size`, `$all`.
//! - Unknown `$`-operators fail compilation with `InvalidOperator`.
//! - A `$and`/`$or` whose operand is not an array compiles to a node that
//!   matches nothing.

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use crate::error::StoreError;
use crate::value_objects::FieldPath;

/// One comparison applied to a resolved field value.
#[derive(Debug, Clone)]
pub enum FieldOp {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    In(Vec<Value>),
    Nin(Vec<Value>),
    Exists(bool),
    Regex(Regex),
    Size(i64),
    All(Vec<Value>),
}

/// Compiled criteria tree.
#[derive(Debug, Clone)]
pub enum CriteriaNode {
    /// Matches every document (empty criteria)
    All,
    /// Matches no document (malformed logical operand)
    Never,
    And(Vec<CriteriaNode>),
    Or(Vec<CriteriaNode>),
    Not(Box<CriteriaNode>),
    Condition { path: FieldPath, op: FieldOp },
}

/// Compiles a criteria document into its AST.
pub fn compile(criteria: &Value) -> Result<CriteriaNode, StoreError> {
    let map = criteria
        .as_object()
        .ok_or_else(|| StoreError::InvalidCriteria("criteria must be a JSON object".to_string()))?;

    let mut nodes = Vec::with_capacity(map.len());
    for (key, value) in map {
        match key.as_str() {
            "$and" => nodes.push(compile_logical_list(value, CriteriaNode::And)?),
            "$or" => nodes.push(compile_logical_list(value, CriteriaNode::Or)?),
            "$not" => nodes.push(CriteriaNode::Not(Box::new(compile(value)?))),
            key if key.starts_with('$') => {
                return Err(StoreError::InvalidOperator(format!(
                    "unknown logical operator '{}'",
                    key
                )));
            }
            field => nodes.push(compile_field(field, value)?),
        }
    }

    Ok(match nodes.len() {
        0 => CriteriaNode::All,
        1 => nodes.into_iter().next().expect("length checked"),
        _ => CriteriaNode::And(nodes),
    })
}

/// `$and`/`$or` demand an array operand; anything else matches nothing.
fn compile_logical_list<F>(operand: &Value, combine: F) -> Result<CriteriaNode, StoreError>
where
    F: FnOnce(Vec<CriteriaNode>) -> CriteriaNode,
{
    match operand.as_array() {
        Some(items) => {
            let children = items.iter().map(compile).collect::<Result<Vec<_>, _>>()?;
            Ok(combine(children))
        }
        None => Ok(CriteriaNode::Never),
    }
}

fn compile_field(field: &str, value: &Value) -> Result<CriteriaNode, StoreError> {
    let path = FieldPath::new(field);

    let operator_map = match value.as_object() {
        Some(map) if map.keys().any(|k| k.starts_with('$')) => map,
        // Scalars, arrays, and plain objects are equality criteria.
        _ => {
            return Ok(CriteriaNode::Condition {
                path,
                op: FieldOp::Eq(value.clone()),
            });
        }
    };

    let mut ops = Vec::with_capacity(operator_map.len());
    for (op, operand) in operator_map {
        let op = match op.as_str() {
            "$eq" => FieldOp::Eq(operand.clone()),
            "$ne" => FieldOp::Ne(operand.clone()),
            "$gt" => FieldOp::Gt(operand.clone()),
            "$gte" => FieldOp::Gte(operand.clone()),
            "$lt" => FieldOp::Lt(operand.clone()),
            "$lte" => FieldOp::Lte(operand.clone()),
            "$in" => FieldOp::In(require_array(op, operand)?),
            "$nin" => FieldOp::Nin(require_array(op, operand)?),
            "$all" => FieldOp::All(require_array(op, operand)?),
            "$exists" => FieldOp::Exists(operand.as_bool().ok_or_else(|| {
                StoreError::InvalidCriteria(format!("$exists on '{}' requires a boolean operand", field))
            })?),
            "$size" => FieldOp::Size(operand.as_i64().ok_or_else(|| {
                StoreError::InvalidCriteria(format!("$size on '{}' requires an integer operand", field))
            })?),
            "$regex" => FieldOp::Regex(compile_regex(field, operand, operator_map.get("$options"))?),
            // Consumed together with $regex above.
            "$options" if operator_map.contains_key("$regex") => continue,
            other => {
                return Err(StoreError::InvalidOperator(format!(
                    "unknown operator '{}' on field '{}'",
                    other, field
                )));
            }
        };
        ops.push(CriteriaNode::Condition { path: path.clone(), op });
    }

    Ok(match ops.len() {
        0 => CriteriaNode::All,
        1 => ops.into_iter().next().expect("length checked"),
        _ => CriteriaNode::And(ops),
    })
}

fn require_array(op: &str, operand: &Value) -> Result<Vec<Value>, StoreError> {
    operand
        .as_array()
        .cloned()
        .ok_or_else(|| StoreError::InvalidCriteria(format!("{} requires an array operand", op)))
}

/// Builds the matcher regex from either a pattern string (with an optional
/// `$options` sibling) or a `{pattern, $options}` object operand.
fn compile_regex(field: &str, operand: &Value, sibling_options: Option<&Value>) -> Result<Regex, StoreError> {
    let (pattern, options) = match operand {
        Value::String(pattern) => (pattern.as_str(), sibling_options.and_then(Value::as_str)),
        Value::Object(map) => {
            let pattern = map.get("pattern").and_then(Value::as_str).ok_or_else(|| {
                StoreError::InvalidCriteria(format!("$regex object on '{}' requires a 'pattern' string", field))
            })?;
            (pattern, map.get("$options").and_then(Value::as_str))
        }
        _ => {
            return Err(StoreError::InvalidCriteria(format!(
                "$regex on '{}' requires a pattern string or {{pattern, $options}} object",
                field
            )));
        }
    };

    let mut builder = RegexBuilder::new(pattern);
    if let Some(options) = options {
        for flag in options.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                other => {
                    return Err(StoreError::InvalidCriteria(format!(
                        "unsupported $options flag '{}' on field '{}'",
                        other, field
                    )));
                }
            };
        }
    }
    builder
        .build()
        .map_err(|e| StoreError::InvalidCriteria(format!("invalid $regex on '{}': {}", field, e)))
}
