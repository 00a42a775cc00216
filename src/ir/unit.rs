//! Compiled unit definitions
//!
//! A compiled unit is persisted as a JSON document produced by the external
//! compiler. The weaver reads it, rewrites call sites in place and writes it
//! back only when something changed.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::instruction::{Instruction, Target};
use crate::utils::{Error, Result};

/// One compiled module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledUnit {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Names of the units this one references
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub types: Vec<TypeEntry>,
}

impl CompiledUnit {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            references: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Read a unit from disk
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&text).map_err(|e| Error::json(path, e))
    }

    /// Write the unit back to disk
    pub fn write(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).map_err(|e| Error::json(path, e))?;
        fs::write(path, text).map_err(|e| Error::io(path, e))
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a == name)
    }

    /// Resolve a type by its index path (top-level index, then nested indices)
    pub fn type_at(&self, path: &[usize]) -> Option<&TypeEntry> {
        let (first, rest) = path.split_first()?;
        let mut ty = self.types.get(*first)?;
        for index in rest {
            ty = ty.nested_types.get(*index)?;
        }
        Some(ty)
    }

    pub fn type_at_mut(&mut self, path: &[usize]) -> Option<&mut TypeEntry> {
        let (first, rest) = path.split_first()?;
        let mut ty = self.types.get_mut(*first)?;
        for index in rest {
            ty = ty.nested_types.get_mut(*index)?;
        }
        Some(ty)
    }

    /// Every type in the unit, nested types included, in pre-order
    pub fn all_types(&self) -> Vec<&TypeEntry> {
        let mut out = Vec::new();
        let mut stack: Vec<&TypeEntry> = self.types.iter().rev().collect();
        while let Some(ty) = stack.pop() {
            out.push(ty);
            stack.extend(ty.nested_types.iter().rev());
        }
        out
    }
}

/// A type declared in a compiled unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeEntry {
    pub name: String,
    /// `Namespace.Name` for top-level types, `Outer/Name` for nested ones
    pub full_name: String,
    #[serde(default)]
    pub base_type: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    /// Synthesized by the compiler (iterator state machines, closures)
    #[serde(default)]
    pub compiler_generated: bool,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
    #[serde(default)]
    pub properties: Vec<PropertyEntry>,
    #[serde(default)]
    pub methods: Vec<MethodEntry>,
    #[serde(default)]
    pub nested_types: Vec<TypeEntry>,
}

impl TypeEntry {
    pub fn new(namespace: &str, name: &str) -> Self {
        let full_name = if namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", namespace, name)
        };
        Self {
            name: name.to_string(),
            full_name,
            base_type: None,
            interfaces: Vec::new(),
            compiler_generated: false,
            attributes: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            nested_types: Vec::new(),
        }
    }

    /// Add a nested type, deriving its full name and those of its
    /// descendants from this one
    pub fn add_nested(&mut self, mut nested: TypeEntry) {
        nested.full_name = format!("{}/{}", self.full_name, nested.name);

        let mut stack: Vec<&mut TypeEntry> = vec![&mut nested];
        while let Some(parent) = stack.pop() {
            let prefix = parent.full_name.clone();
            for child in parent.nested_types.iter_mut() {
                child.full_name = format!("{}/{}", prefix, child.name);
                stack.push(child);
            }
        }

        self.nested_types.push(nested);
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a == name)
    }

    pub fn public_fields(&self) -> impl Iterator<Item = &FieldEntry> {
        self.fields.iter().filter(|f| f.is_public)
    }

    /// Property whose getter or setter is the named method
    pub fn property_for_accessor(&self, method_name: &str) -> Option<&PropertyEntry> {
        self.properties.iter().find(|p| {
            p.getter.as_deref() == Some(method_name) || p.setter.as_deref() == Some(method_name)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub name: String,
    pub field_type: String,
    #[serde(default)]
    pub is_public: bool,
}

impl FieldEntry {
    pub fn public(name: &str, field_type: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type: field_type.to_string(),
            is_public: true,
        }
    }

    pub fn private(name: &str, field_type: &str) -> Self {
        Self {
            is_public: false,
            ..Self::public(name, field_type)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyEntry {
    pub name: String,
    #[serde(default)]
    pub getter: Option<String>,
    #[serde(default)]
    pub setter: Option<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl PropertyEntry {
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub param_type: String,
}

impl Parameter {
    pub fn new(name: &str, param_type: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type: param_type.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Local {
    #[serde(default)]
    pub name: Option<String>,
    pub local_type: String,
}

impl Local {
    pub fn new(local_type: &str) -> Self {
        Self {
            name: None,
            local_type: local_type.to_string(),
        }
    }
}

/// A method declared on a type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodEntry {
    pub name: String,
    #[serde(default)]
    pub has_this: bool,
    pub return_type: String,
    #[serde(default)]
    pub params: Vec<Parameter>,
    #[serde(default)]
    pub locals: Vec<Local>,
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Absent for abstract and extern methods
    #[serde(default)]
    pub body: Option<Vec<Instruction>>,
}

impl MethodEntry {
    pub fn new(name: &str, return_type: &str) -> Self {
        Self {
            name: name.to_string(),
            has_this: false,
            return_type: return_type.to_string(),
            params: Vec::new(),
            locals: Vec::new(),
            attributes: Vec::new(),
            body: None,
        }
    }

    pub fn with_this(mut self) -> Self {
        self.has_this = true;
        self
    }

    pub fn with_params(mut self, params: Vec<Parameter>) -> Self {
        self.params = params;
        self
    }

    pub fn with_locals(mut self, locals: Vec<Local>) -> Self {
        self.locals = locals;
        self
    }

    pub fn with_body(mut self, body: Vec<Instruction>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a == name)
    }

    pub fn instructions(&self) -> &[Instruction] {
        self.body.as_deref().unwrap_or(&[])
    }

    /// Signature used in diagnostics
    pub fn display_name(&self, declaring_type: &str) -> String {
        let params: Vec<&str> = self.params.iter().map(|p| p.param_type.as_str()).collect();
        format!(
            "{} {}::{}({})",
            self.return_type,
            declaring_type,
            self.name,
            params.join(",")
        )
    }

    /// Declared type of a load/store operand
    pub fn target_type(&self, target: &Target, declaring_type: &str) -> Result<String> {
        match target {
            Target::Field(field) => Ok(field.field_type.clone()),
            Target::Local { index } => self
                .locals
                .get(*index)
                .map(|l| l.local_type.clone())
                .ok_or_else(|| {
                    Error::malformed(
                        &self.display_name(declaring_type),
                        format!("local index {} out of range", index),
                    )
                }),
            Target::Parameter { index } => self
                .params
                .get(*index)
                .map(|p| p.param_type.clone())
                .ok_or_else(|| {
                    Error::malformed(
                        &self.display_name(declaring_type),
                        format!("parameter index {} out of range", index),
                    )
                }),
            Target::This if self.has_this => Ok(declaring_type.to_string()),
            Target::This => Err(Error::malformed(
                &self.display_name(declaring_type),
                "receiver loaded in a static method",
            )),
        }
    }
}
