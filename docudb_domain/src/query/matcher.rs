// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Match Evaluation
//!
//! Pure evaluation of a compiled criteria tree against one document.
//!
//! ## Semantics
//!
//! - Equality is structural deep equality; dates compare by instant.
//! - Range operators use native ordering (numbers, dates); an unordered or
//!   absent operand never matches.
//! - `$in`/`$nin`: any-element match when the document value is an array,
//!   single-value match otherwise. `$nin` is the exact negation, so an
//!   absent field satisfies it.
//! - `$exists` tests presence (`null` is present).
//! - `$regex` applies to strings only.
//! - `$size` and `$all` apply to arrays only.
//! - Dot-paths descend nested maps; arrays are not implicitly traversed.

use std::cmp::Ordering;

use serde_json::Value;

use crate::document::{compare_values, deep_equal};
use crate::query::criteria::{CriteriaNode, FieldOp};

/// Evaluates a compiled criteria tree against a document.
pub fn matches(node: &CriteriaNode, doc: &Value) -> bool {
    match node {
        CriteriaNode::All => true,
        CriteriaNode::Never => false,
        CriteriaNode::And(children) => children.iter().all(|child| matches(child, doc)),
        CriteriaNode::Or(children) => children.iter().any(|child| matches(child, doc)),
        CriteriaNode::Not(inner) => !matches(inner, doc),
        CriteriaNode::Condition { path, op } => {
            let value = path.resolve(doc);
            eval_op(op, value)
        }
    }
}

fn eval_op(op: &FieldOp, value: Option<&Value>) -> bool {
    match op {
        FieldOp::Eq(operand) => value.is_some_and(|v| deep_equal(v, operand)),
        FieldOp::Ne(operand) => !value.is_some_and(|v| deep_equal(v, operand)),
        FieldOp::Gt(operand) => cmp_matches(value, operand, |o| o == Ordering::Greater),
        FieldOp::Gte(operand) => cmp_matches(value, operand, |o| o != Ordering::Less),
        FieldOp::Lt(operand) => cmp_matches(value, operand, |o| o == Ordering::Less),
        FieldOp::Lte(operand) => cmp_matches(value, operand, |o| o != Ordering::Greater),
        FieldOp::In(candidates) => value.is_some_and(|v| in_matches(v, candidates)),
        FieldOp::Nin(candidates) => !value.is_some_and(|v| in_matches(v, candidates)),
        FieldOp::Exists(expected) => value.is_some() == *expected,
        FieldOp::Regex(re) => value.and_then(Value::as_str).is_some_and(|s| re.is_match(s)),
        FieldOp::Size(expected) => value
            .and_then(Value::as_array)
            .is_some_and(|items| items.len() as i64 == *expected),
        FieldOp::All(required) => value.and_then(Value::as_array).is_some_and(|items| {
            required
                .iter()
                .all(|needed| items.iter().any(|item| deep_equal(item, needed)))
        }),
    }
}

fn cmp_matches(value: Option<&Value>, operand: &Value, accept: fn(Ordering) -> bool) -> bool {
    match value.and_then(|v| compare_values(v, operand)) {
        Some(ordering) => accept(ordering),
        None => false,
    }
}

/// `$in`: any-element match on arrays, single-value match otherwise.
fn in_matches(value: &Value, candidates: &[Value]) -> bool {
    match value.as_array() {
        Some(items) => items
            .iter()
            .any(|item| candidates.iter().any(|c| deep_equal(item, c))),
        None => candidates.iter().any(|c| deep_equal(value, c)),
    }
}
