// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Document Schemas
//!
//! Declarative validation and normalization of documents: typed field
//! definitions with requiredness, defaults, constraint rules, custom
//! validators, and transforms, plus schema-level options (`strict`,
//! `timestamps`, `idType`).

pub mod field_definition;
pub mod validator;

pub use field_definition::{
    CustomCheck, CustomValidator, DefaultFn, DefaultValue, FieldDefinition, FieldType, ValidationRules, ValueTransform,
};
pub use validator::{Schema, SchemaBuilder, SchemaOptions};
