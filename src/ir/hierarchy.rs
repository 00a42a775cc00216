//! Type hierarchy
//!
//! Base-class and interface relations of the types the weaver knows about.
//! Relations come from the unit being woven, the units it references, and
//! platform types seeded by rule sets.

use std::collections::{HashMap, HashSet};

use super::unit::CompiledUnit;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeRelations {
    pub base: Option<String>,
    pub interfaces: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    types: HashMap<String, TypeRelations>,
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the relations of a type, replacing any earlier declaration
    pub fn declare(&mut self, name: &str, base: Option<&str>, interfaces: &[&str]) {
        self.types.insert(
            name.to_string(),
            TypeRelations {
                base: base.map(str::to_string),
                interfaces: interfaces.iter().map(|i| i.to_string()).collect(),
            },
        );
    }

    /// Record every type declared by a unit
    pub fn add_unit(&mut self, unit: &CompiledUnit) {
        for ty in unit.all_types() {
            self.types.insert(
                ty.full_name.clone(),
                TypeRelations {
                    base: ty.base_type.clone(),
                    interfaces: ty.interfaces.clone(),
                },
            );
        }
    }

    pub fn merge(&mut self, other: &TypeHierarchy) {
        for (name, relations) in &other.types {
            self.types.insert(name.clone(), relations.clone());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// True if a value of type `candidate` can be stored in a slot of type
    /// `target`: the same type, a base class, or an implemented interface.
    pub fn is_assignable_from(&self, target: &str, candidate: &str) -> bool {
        if target == candidate {
            return true;
        }

        let mut visited = HashSet::new();
        let mut worklist = vec![candidate];

        while let Some(name) = worklist.pop() {
            if !visited.insert(name) {
                continue;
            }
            let Some(relations) = self.types.get(name) else {
                continue;
            };
            for parent in relations.base.iter().chain(relations.interfaces.iter()) {
                if parent == target {
                    return true;
                }
                worklist.push(parent);
            }
        }

        false
    }

    /// `target` is a base class or interface of `candidate`, but not the type itself
    pub fn is_strict_supertype_of(&self, target: &str, candidate: &str) -> bool {
        target != candidate && self.is_assignable_from(target, candidate)
    }
}
