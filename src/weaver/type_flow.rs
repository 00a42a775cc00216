//! Backward type-flow analysis
//!
//! Decides whether the value pushed by an instruction is statically known to
//! be of a target type. The walk is local to one method body: loads through a
//! supertype-typed slot are refined by following the most recent store into
//! that slot, and anything that cannot be disproved is assumed to match.

use crate::ir::{CallKind, Instruction, MethodEntry, Target, TypeHierarchy};
use crate::utils::{Error, Result};

/// Outcome of a type-flow query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inference {
    /// Pushed directly from a slot or call declared as the target type
    Exact,
    /// Declared as a supertype, but a same-method assignment proves the target type
    Refined,
    /// Declared as a supertype and no assignment could be found
    Assumed,
    Mismatch,
}

impl Inference {
    pub fn is_match(self) -> bool {
        !matches!(self, Inference::Mismatch)
    }
}

/// Type-flow analyzer over a single method body
pub struct TypeFlow<'a> {
    method: &'a MethodEntry,
    declaring_type: &'a str,
    hierarchy: &'a TypeHierarchy,
}

impl<'a> TypeFlow<'a> {
    pub fn new(method: &'a MethodEntry, declaring_type: &'a str, hierarchy: &'a TypeHierarchy) -> Self {
        Self {
            method,
            declaring_type,
            hierarchy,
        }
    }

    /// Whether the instruction at `index` pushes a value of type `target`
    pub fn pushes_value_of_type(&self, index: usize, target: &str) -> Result<bool> {
        Ok(self.infer(index, target)?.is_match())
    }

    pub fn infer(&self, index: usize, target: &str) -> Result<Inference> {
        let body = self.method.instructions();
        let mut cursor = index;
        let mut refined = false;

        loop {
            let inst = body.get(cursor).ok_or_else(|| {
                Error::malformed(
                    &self.method_name(),
                    format!("instruction index {} out of range", cursor),
                )
            })?;

            match inst {
                Instruction::Call { callee, kind } => {
                    let pushed = match kind {
                        CallKind::Construct => callee.declaring_type.as_str(),
                        CallKind::Direct | CallKind::Virtual => callee.return_type.as_str(),
                    };
                    return Ok(self.classify_declared(pushed, target, refined));
                }
                Instruction::Load { target: slot } => {
                    let declared = self.method.target_type(slot, self.declaring_type)?;
                    if declared == target {
                        return Ok(exact_or_refined(refined));
                    }
                    if !self.hierarchy.is_strict_supertype_of(&declared, target) {
                        return Ok(Inference::Mismatch);
                    }
                    match self.find_store(cursor, slot) {
                        // The stored value was already on the stack at entry
                        Some(0) => return Ok(Inference::Assumed),
                        Some(store) => {
                            cursor = store - 1;
                            refined = true;
                        }
                        None => return Ok(Inference::Assumed),
                    }
                }
                Instruction::Store { .. } | Instruction::Other { .. } => {
                    return Ok(Inference::Mismatch);
                }
            }
        }
    }

    fn classify_declared(&self, declared: &str, target: &str, refined: bool) -> Inference {
        if declared == target {
            exact_or_refined(refined)
        } else if self.hierarchy.is_strict_supertype_of(declared, target) {
            Inference::Assumed
        } else {
            Inference::Mismatch
        }
    }

    /// Most recent store into `slot` strictly before `before`
    fn find_store(&self, before: usize, slot: &Target) -> Option<usize> {
        let body = self.method.instructions();
        (0..before).rev().find(|&i| {
            matches!(&body[i], Instruction::Store { target } if target == slot)
        })
    }

    fn method_name(&self) -> String {
        self.method.display_name(self.declaring_type)
    }
}

fn exact_or_refined(refined: bool) -> Inference {
    if refined {
        Inference::Refined
    } else {
        Inference::Exact
    }
}
