//! Synthesized container classification
//!
//! Iterators and deferred continuations are lowered by the compiler into
//! separate nested types. Their exclusion status follows the method that
//! produced them, so the weaver has to map a container back to its origin.

use regex::Regex;

use crate::ir::{MethodEntry, TypeEntry};

/// Recognizes compiler-generated container types by name and shape
pub struct ContainerClassifier {
    pattern: Regex,
}

impl ContainerClassifier {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"^<(?P<method>\w+)>d__").expect("container name pattern is valid"),
        }
    }

    /// Name of the method a container was generated for, from `<Method>d__N`
    pub fn origin_method_name<'a>(&self, type_name: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(type_name)
            .and_then(|c| c.name("method"))
            .map(|m| m.as_str())
    }

    /// Whether `ty` is a synthesized container generated for `method`
    pub fn is_generated_container_for(&self, ty: &TypeEntry, method: &MethodEntry) -> bool {
        is_generated_container_for(ty, method)
    }
}

impl Default for ContainerClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `ty` is a synthesized container generated for `method`.
///
/// The name must contain the method name. A local of the container type
/// decides it; otherwise every parameter must be captured as a public field
/// of the same name and type. Without parameters only the captured receiver
/// may be public.
pub fn is_generated_container_for(ty: &TypeEntry, method: &MethodEntry) -> bool {
    if !ty.name.contains(&method.name) {
        return false;
    }

    if method.locals.iter().any(|l| l.local_type == ty.full_name) {
        return true;
    }

    if method.params.is_empty() {
        let public = ty.public_fields().count();
        return if method.has_this { public == 1 } else { public == 0 };
    }

    method.params.iter().all(|param| {
        ty.public_fields()
            .any(|f| f.name == param.name && f.field_type == param.param_type)
    })
}
