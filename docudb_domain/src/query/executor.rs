// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Query Execution
//!
//! A [`Query`] bundles compiled criteria with execution options: sort, skip,
//! limit, and field selection. Execution filters the candidate documents with
//! the matcher, then applies sort -> skip -> limit -> projection in that
//! order.
//!
//! - **Sort** takes `{field: 1 | -1}` pairs with lexicographic precedence in
//!   iteration order; documents missing a sort field compare equal on that
//!   key. The underlying sort is stable, so equal documents keep their
//!   incoming order.
//! - **Projection** is inclusion-only. Dot-paths reconstruct nested output
//!   objects; `_id` is always carried along.
//!
//! The raw criteria document is retained so the collection controller can
//! inspect top-level scalar equality pairs for index-assisted execution
//! without reverse-engineering the AST.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::document::compare_values;
use crate::error::StoreError;
use crate::query::criteria::{compile, CriteriaNode};
use crate::query::matcher;
use crate::value_objects::FieldPath;

/// Sort direction for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Interprets the MongoDB-style `1` / `-1` encoding.
    pub fn from_signum(n: i64) -> Result<Self, StoreError> {
        match n {
            1 => Ok(SortOrder::Asc),
            -1 => Ok(SortOrder::Desc),
            other => Err(StoreError::InvalidCriteria(format!(
                "sort direction must be 1 or -1, got {}",
                other
            ))),
        }
    }
}

/// Compiled query with execution options.
#[derive(Debug, Clone)]
pub struct Query {
    criteria_source: Value,
    root: CriteriaNode,
    sort: Vec<(FieldPath, SortOrder)>,
    skip: Option<usize>,
    limit: Option<usize>,
    select: Option<Vec<FieldPath>>,
}

impl Query {
    /// Compiles a query from a criteria document.
    pub fn new(criteria: Value) -> Result<Self, StoreError> {
        let root = compile(&criteria)?;
        Ok(Self {
            criteria_source: criteria,
            root,
            sort: Vec::new(),
            skip: None,
            limit: None,
            select: None,
        })
    }

    /// Adds sort keys from a `{field: 1 | -1}` map, in iteration order.
    pub fn with_sort_spec(mut self, spec: &Value) -> Result<Self, StoreError> {
        let map = spec
            .as_object()
            .ok_or_else(|| StoreError::InvalidCriteria("sort specification must be a JSON object".to_string()))?;
        for (field, direction) in map {
            let signum = direction.as_i64().ok_or_else(|| {
                StoreError::InvalidCriteria(format!("sort direction for '{}' must be 1 or -1", field))
            })?;
            self.sort.push((FieldPath::new(field), SortOrder::from_signum(signum)?));
        }
        Ok(self)
    }

    /// Adds a single sort key
    pub fn with_sort(mut self, field: impl Into<FieldPath>, order: SortOrder) -> Self {
        self.sort.push((field.into(), order));
        self
    }

    /// Skips the first `n` results after sorting
    pub fn with_skip(mut self, n: usize) -> Self {
        self.skip = Some(n);
        self
    }

    /// Caps the number of results after skipping
    pub fn with_limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Restricts output to the given fields (inclusion projection)
    pub fn with_select<I, P>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<FieldPath>,
    {
        self.select = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Gets the raw criteria document this query was compiled from
    pub fn criteria(&self) -> &Value {
        &self.criteria_source
    }

    /// Evaluates the criteria against one document.
    pub fn matches(&self, doc: &Value) -> bool {
        matcher::matches(&self.root, doc)
    }

    /// Filters, then applies sort/skip/limit/projection.
    pub fn execute(&self, docs: Vec<Value>) -> Vec<Value> {
        let matched = docs.into_iter().filter(|doc| self.matches(doc)).collect();
        self.post_process(matched)
    }

    /// Applies sort -> skip -> limit -> projection to pre-matched documents.
    ///
    /// Split out so index-assisted execution can feed candidates it already
    /// rechecked through the same pipeline.
    pub fn post_process(&self, mut matched: Vec<Value>) -> Vec<Value> {
        if !self.sort.is_empty() {
            matched.sort_by(|a, b| self.compare_docs(a, b));
        }

        let skip = self.skip.unwrap_or(0);
        let mut result: Vec<Value> = if skip >= matched.len() {
            Vec::new()
        } else {
            matched.split_off(skip)
        };

        if let Some(limit) = self.limit {
            result.truncate(limit);
        }

        match &self.select {
            Some(fields) => result.iter().map(|doc| project(doc, fields)).collect(),
            None => result,
        }
    }

    /// Top-level `field: scalar` equality pairs usable for index lookups.
    ///
    /// A pair qualifies when the key is not an operator and the value is not
    /// an operator object.
    pub fn equality_lookups(&self) -> Vec<(&str, &Value)> {
        let Some(map) = self.criteria_source.as_object() else {
            return Vec::new();
        };
        map.iter()
            .filter(|(key, value)| !key.starts_with('$') && !value.is_object())
            .map(|(key, value)| (key.as_str(), value))
            .collect()
    }

    fn compare_docs(&self, a: &Value, b: &Value) -> Ordering {
        for (path, order) in &self.sort {
            let ordering = match (path.resolve(a), path.resolve(b)) {
                (Some(va), Some(vb)) => compare_values(va, vb).unwrap_or(Ordering::Equal),
                // Missing values sort as equal on this key
                _ => Ordering::Equal,
            };
            let ordering = match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Inclusion projection; dot-paths rebuild nested structure, `_id` rides
/// along.
fn project(doc: &Value, fields: &[FieldPath]) -> Value {
    let mut out = Value::Object(Map::new());
    if let Some(id) = doc.get("_id") {
        out.as_object_mut()
            .expect("projection output is a map")
            .insert("_id".to_string(), id.clone());
    }
    for path in fields {
        if let Some(value) = path.resolve(doc) {
            path.set(&mut out, value.clone());
        }
    }
    out
}
