//! Rendering dereferenced schemas into target-language type definitions.
//!
//! The pipeline only depends on the [`Transpiler`] trait. [`BuiltinTranspiler`]
//! is the default backend: it covers objects, string enums, arrays, maps and
//! scalars, and falls back to each language's dynamic type for anything else.

use serde_json::{Map, Value};

use crate::error::TranspileError;
use crate::names::{
    is_python_keyword, is_rust_keyword, leading_digit_safe, to_pascal_case, to_snake_case,
};
use crate::types::Language;

/// A schema-to-source backend.
///
/// Implementations must be deterministic and free of side effects: the same
/// language and schema set always render the same text.
pub trait Transpiler {
    fn render(&self, language: Language, schemas: &[Value]) -> Result<String, TranspileError>;
}

/// Built-in schema-to-source backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTranspiler;

impl Transpiler for BuiltinTranspiler {
    fn render(&self, language: Language, schemas: &[Value]) -> Result<String, TranspileError> {
        let types = collect_types(schemas)?;
        Ok(match language {
            Language::TypeScript => render_ts(&types),
            Language::Go => render_go(&types),
            Language::Rust => render_rust(&types),
            Language::Python => render_python(&types),
        })
    }
}

// =============================================================================
// Type model
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TypeRef {
    String,
    Integer,
    Number,
    Boolean,
    Null,
    Any,
    Array(Box<TypeRef>),
    Map(Box<TypeRef>),
    Named(String),
}

#[derive(Debug)]
struct Field {
    key: String,
    ty: TypeRef,
    required: bool,
}

#[derive(Debug)]
enum Shape {
    Object(Vec<Field>),
    StringEnum(Vec<String>),
    Alias(TypeRef),
}

#[derive(Debug)]
struct NamedType {
    name: String,
    description: Option<String>,
    shape: Shape,
}

struct Collector {
    root_name: String,
    types: Vec<NamedType>,
}

fn collect_types(schemas: &[Value]) -> Result<Vec<NamedType>, TranspileError> {
    if schemas.is_empty() {
        return Err(TranspileError::Empty);
    }
    let mut types = Vec::new();
    for (i, schema) in schemas.iter().enumerate() {
        let name = schema
            .get("title")
            .and_then(Value::as_str)
            .map(to_pascal_case)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| TranspileError::Unnamed {
                path: format!("schemas[{}]", i),
            })?;
        let name = leading_digit_safe(name);
        let mut collector = Collector {
            root_name: name.clone(),
            types: std::mem::take(&mut types),
        };
        collector.define(&name, schema);
        types = collector.types;
    }
    Ok(types)
}

fn string_enum(schema: &Value) -> Option<Vec<String>> {
    let values = schema.get("enum")?.as_array()?;
    values
        .iter()
        .map(|v| v.as_str().map(String::from))
        .collect::<Option<Vec<_>>>()
        .filter(|v| !v.is_empty())
}

fn is_object_like(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("object")
        || schema.get("properties").is_some()
}

fn properties(schema: &Value) -> Option<&Map<String, Value>> {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .filter(|p| !p.is_empty())
}

impl Collector {
    fn define(&mut self, name: &str, schema: &Value) {
        if self.types.iter().any(|t| t.name == name) {
            return;
        }
        // Reserve the name before walking children so self-references resolve
        let index = self.types.len();
        self.types.push(NamedType {
            name: name.to_string(),
            description: schema
                .get("description")
                .and_then(Value::as_str)
                .map(String::from),
            shape: Shape::Alias(TypeRef::Any),
        });

        let shape = if let Some(values) = string_enum(schema) {
            Shape::StringEnum(values)
        } else if let Some(props) = properties(schema) {
            let required: Vec<&str> = schema
                .get("required")
                .and_then(Value::as_array)
                .map(|r| r.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            let fields = props
                .iter()
                .map(|(key, prop)| Field {
                    key: key.clone(),
                    ty: self.type_ref(prop, &format!("{}{}", name, to_pascal_case(key))),
                    required: required.contains(&key.as_str()),
                })
                .collect();
            Shape::Object(fields)
        } else {
            Shape::Alias(self.inline_ref(schema, name))
        };
        self.types[index].shape = shape;
    }

    /// Reference to `schema`, defining a named type for it when needed.
    fn type_ref(&mut self, schema: &Value, hint: &str) -> TypeRef {
        if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
            // Only recursive references survive dereferencing
            return if reference == "#" {
                TypeRef::Named(self.root_name.clone())
            } else {
                TypeRef::Any
            };
        }
        let titled = schema
            .get("title")
            .and_then(Value::as_str)
            .map(to_pascal_case)
            .filter(|n| !n.is_empty())
            .map(leading_digit_safe);
        if string_enum(schema).is_some() || properties(schema).is_some() {
            let name = titled.unwrap_or_else(|| hint.to_string());
            self.define(&name, schema);
            return TypeRef::Named(name);
        }
        self.inline_ref(schema, hint)
    }

    /// Reference to `schema` without giving it a name of its own.
    fn inline_ref(&mut self, schema: &Value, hint: &str) -> TypeRef {
        let ty = match schema.get("type") {
            Some(Value::String(t)) => Some(t.as_str()),
            Some(Value::Array(ts)) => ts
                .iter()
                .filter_map(Value::as_str)
                .find(|t| *t != "null")
                .or(Some("null")),
            _ => None,
        };
        match ty {
            Some("string") => TypeRef::String,
            Some("integer") => TypeRef::Integer,
            Some("number") => TypeRef::Number,
            Some("boolean") => TypeRef::Boolean,
            Some("null") => TypeRef::Null,
            Some("array") => match schema.get("items") {
                Some(items) if items.is_object() => {
                    TypeRef::Array(Box::new(self.type_ref(items, &format!("{}Item", hint))))
                }
                _ => TypeRef::Array(Box::new(TypeRef::Any)),
            },
            _ if is_object_like(schema) => match schema.get("additionalProperties") {
                Some(values) if values.is_object() => {
                    TypeRef::Map(Box::new(self.type_ref(values, &format!("{}Value", hint))))
                }
                _ => TypeRef::Map(Box::new(TypeRef::Any)),
            },
            _ => self.union_ref(schema, hint),
        }
    }

    /// `anyOf`/`oneOf` with exactly one non-null branch collapses to that branch.
    fn union_ref(&mut self, schema: &Value, hint: &str) -> TypeRef {
        let branches = schema
            .get("anyOf")
            .or_else(|| schema.get("oneOf"))
            .and_then(Value::as_array);
        if let Some(branches) = branches {
            let non_null: Vec<&Value> = branches
                .iter()
                .filter(|b| b.get("type").and_then(Value::as_str) != Some("null"))
                .collect();
            if let [single] = non_null.as_slice() {
                return self.type_ref(single, hint);
            }
        }
        TypeRef::Any
    }
}

// =============================================================================
// TypeScript
// =============================================================================

fn is_plain_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn ts_type(ty: &TypeRef) -> String {
    match ty {
        TypeRef::String => "string".to_string(),
        TypeRef::Integer | TypeRef::Number => "number".to_string(),
        TypeRef::Boolean => "boolean".to_string(),
        TypeRef::Null => "null".to_string(),
        TypeRef::Any => "any".to_string(),
        TypeRef::Array(inner) => format!("{}[]", ts_type(inner)),
        TypeRef::Map(inner) => format!("{{ [key: string]: {} }}", ts_type(inner)),
        TypeRef::Named(name) => name.clone(),
    }
}

fn render_ts(types: &[NamedType]) -> String {
    let mut out = String::new();
    for t in types {
        if let Some(desc) = &t.description {
            out.push_str(&format!("/**\n * {}\n */\n", desc));
        }
        match &t.shape {
            Shape::Object(fields) => {
                out.push_str(&format!("export interface {} {{\n", t.name));
                for field in fields {
                    let key = if is_plain_identifier(&field.key) {
                        field.key.clone()
                    } else {
                        format!("{:?}", field.key)
                    };
                    let optional = if field.required { "" } else { "?" };
                    out.push_str(&format!("  {}{}: {};\n", key, optional, ts_type(&field.ty)));
                }
                out.push_str("}\n");
            }
            Shape::StringEnum(values) => {
                let union: Vec<String> = values.iter().map(|v| format!("{:?}", v)).collect();
                out.push_str(&format!("export type {} = {};\n", t.name, union.join(" | ")));
            }
            Shape::Alias(ty) => {
                out.push_str(&format!("export type {} = {};\n", t.name, ts_type(ty)));
            }
        }
    }
    out
}

// =============================================================================
// Go
// =============================================================================

fn go_type(ty: &TypeRef) -> String {
    match ty {
        TypeRef::String => "string".to_string(),
        TypeRef::Integer => "int64".to_string(),
        TypeRef::Number => "float64".to_string(),
        TypeRef::Boolean => "bool".to_string(),
        TypeRef::Null | TypeRef::Any => "interface{}".to_string(),
        TypeRef::Array(inner) => format!("[]{}", go_type(inner)),
        TypeRef::Map(inner) => format!("map[string]{}", go_type(inner)),
        TypeRef::Named(name) => name.clone(),
    }
}

fn go_ident(raw: &str, fallback: &str) -> String {
    let ident = to_pascal_case(raw);
    if ident.is_empty() {
        fallback.to_string()
    } else if ident.starts_with(|c: char| c.is_ascii_digit()) {
        format!("X{}", ident)
    } else {
        ident
    }
}

fn render_go(types: &[NamedType]) -> String {
    let mut out = String::new();
    for t in types {
        if let Some(desc) = &t.description {
            out.push_str(&format!("// {} {}\n", t.name, desc));
        }
        match &t.shape {
            Shape::Object(fields) => {
                out.push_str(&format!("type {} struct {{\n", t.name));
                for (i, field) in fields.iter().enumerate() {
                    let name = go_ident(&field.key, &format!("Field{}", i));
                    let ty = match (&field.ty, field.required) {
                        (
                            TypeRef::Array(_) | TypeRef::Map(_) | TypeRef::Any | TypeRef::Null,
                            _,
                        ) => go_type(&field.ty),
                        (_, false) => format!("*{}", go_type(&field.ty)),
                        (TypeRef::Named(n), true) if *n == t.name => format!("*{}", n),
                        (_, true) => go_type(&field.ty),
                    };
                    let omit = if field.required { "" } else { ",omitempty" };
                    out.push_str(&format!(
                        "\t{} {} `json:\"{}{}\"`\n",
                        name, ty, field.key, omit
                    ));
                }
                out.push_str("}\n");
            }
            Shape::StringEnum(values) => {
                out.push_str(&format!("type {} string\n\nconst (\n", t.name));
                let mut seen = Vec::new();
                for (i, value) in values.iter().enumerate() {
                    let mut name = format!("{}{}", t.name, go_ident(value, &i.to_string()));
                    if seen.contains(&name) {
                        name = format!("{}{}", name, i);
                    }
                    out.push_str(&format!("\t{} {} = {:?}\n", name, t.name, value));
                    seen.push(name);
                }
                out.push_str(")\n");
            }
            Shape::Alias(ty) => {
                out.push_str(&format!("type {} {}\n", t.name, go_type(ty)));
            }
        }
        out.push('\n');
    }
    out
}

// =============================================================================
// Rust
// =============================================================================

fn rust_type(ty: &TypeRef) -> String {
    match ty {
        TypeRef::String => "String".to_string(),
        TypeRef::Integer => "i64".to_string(),
        TypeRef::Number => "f64".to_string(),
        TypeRef::Boolean => "bool".to_string(),
        TypeRef::Null | TypeRef::Any => "serde_json::Value".to_string(),
        TypeRef::Array(inner) => format!("Vec<{}>", rust_type(inner)),
        TypeRef::Map(inner) => {
            format!("std::collections::BTreeMap<String, {}>", rust_type(inner))
        }
        TypeRef::Named(name) => name.clone(),
    }
}

fn rust_field_name(key: &str, index: usize) -> String {
    let name = to_snake_case(key);
    if name.is_empty() {
        format!("field_{}", index)
    } else if is_rust_keyword(&name) {
        format!("{}_", name)
    } else {
        leading_digit_safe(name)
    }
}

fn render_rust(types: &[NamedType]) -> String {
    let mut out = String::from("use serde::{Deserialize, Serialize};\n\n");
    for t in types {
        if let Some(desc) = &t.description {
            out.push_str(&format!("/// {}\n", desc));
        }
        match &t.shape {
            Shape::Object(fields) => {
                out.push_str("#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]\n");
                out.push_str(&format!("pub struct {} {{\n", t.name));
                for (i, field) in fields.iter().enumerate() {
                    let name = rust_field_name(&field.key, i);
                    if name != field.key {
                        out.push_str(&format!("    #[serde(rename = {:?})]\n", field.key));
                    }
                    let mut ty = rust_type(&field.ty);
                    if field.ty == TypeRef::Named(t.name.clone()) {
                        ty = format!("Box<{}>", ty);
                    }
                    if field.required {
                        out.push_str(&format!("    pub {}: {},\n", name, ty));
                    } else {
                        out.push_str(
                            "    #[serde(default, skip_serializing_if = \"Option::is_none\")]\n",
                        );
                        out.push_str(&format!("    pub {}: Option<{}>,\n", name, ty));
                    }
                }
                out.push_str("}\n");
            }
            Shape::StringEnum(values) => {
                out.push_str(
                    "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]\n",
                );
                out.push_str(&format!("pub enum {} {{\n", t.name));
                let mut seen = Vec::new();
                for (i, value) in values.iter().enumerate() {
                    let mut variant = to_pascal_case(value);
                    if variant.is_empty() || variant.starts_with(|c: char| c.is_ascii_digit()) {
                        variant = format!("V{}", variant);
                    }
                    if seen.contains(&variant) {
                        variant = format!("{}{}", variant, i);
                    }
                    out.push_str(&format!("    #[serde(rename = {:?})]\n", value));
                    out.push_str(&format!("    {},\n", variant));
                    seen.push(variant);
                }
                out.push_str("}\n");
            }
            Shape::Alias(ty) => {
                out.push_str(&format!("pub type {} = {};\n", t.name, rust_type(ty)));
            }
        }
        out.push('\n');
    }
    out
}

// =============================================================================
// Python
// =============================================================================

fn py_type(ty: &TypeRef) -> String {
    match ty {
        TypeRef::String => "str".to_string(),
        TypeRef::Integer => "int".to_string(),
        TypeRef::Number => "float".to_string(),
        TypeRef::Boolean => "bool".to_string(),
        TypeRef::Null => "None".to_string(),
        TypeRef::Any => "Any".to_string(),
        TypeRef::Array(inner) => format!("List[{}]", py_type(inner)),
        TypeRef::Map(inner) => format!("Dict[str, {}]", py_type(inner)),
        TypeRef::Named(name) => name.clone(),
    }
}

fn py_ident(raw: &str, fallback: String) -> String {
    let name = to_snake_case(raw);
    if name.is_empty() {
        fallback
    } else if is_python_keyword(&name) {
        format!("{}_", name)
    } else {
        leading_digit_safe(name)
    }
}

fn render_python(types: &[NamedType]) -> String {
    let mut out = String::from(
        "from __future__ import annotations\n\n\
         from dataclasses import dataclass\n\
         from enum import Enum\n\
         from typing import Any, Dict, List, Optional\n",
    );
    for t in types {
        out.push_str("\n\n");
        match &t.shape {
            Shape::Object(fields) => {
                out.push_str(&format!("@dataclass\nclass {}:\n", t.name));
                if let Some(desc) = &t.description {
                    out.push_str(&format!("    \"\"\"{}\"\"\"\n\n", desc));
                }
                // dataclasses need fields without defaults first
                let (required, optional): (Vec<_>, Vec<_>) =
                    fields.iter().enumerate().partition(|(_, f)| f.required);
                for (i, field) in required {
                    let name = py_ident(&field.key, format!("field_{}", i));
                    out.push_str(&format!("    {}: {}\n", name, py_type(&field.ty)));
                }
                for (i, field) in optional {
                    let name = py_ident(&field.key, format!("field_{}", i));
                    out.push_str(&format!(
                        "    {}: Optional[{}] = None\n",
                        name,
                        py_type(&field.ty)
                    ));
                }
                if fields.is_empty() {
                    out.push_str("    pass\n");
                }
            }
            Shape::StringEnum(values) => {
                out.push_str(&format!("class {}(Enum):\n", t.name));
                if let Some(desc) = &t.description {
                    out.push_str(&format!("    \"\"\"{}\"\"\"\n\n", desc));
                }
                let mut seen = Vec::new();
                for (i, value) in values.iter().enumerate() {
                    let mut member = py_ident(value, format!("value_{}", i)).to_uppercase();
                    if seen.contains(&member) {
                        member = format!("{}_{}", member, i);
                    }
                    out.push_str(&format!("    {} = {:?}\n", member, value));
                    seen.push(member);
                }
            }
            Shape::Alias(ty) => {
                out.push_str(&format!("{} = {}\n", t.name, py_type(ty)));
            }
        }
    }
    out
}
