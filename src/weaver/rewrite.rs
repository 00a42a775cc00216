//! Call-site rewriting
//!
//! Replaces the callee of matching call instructions with a wrapper while
//! leaving the rest of the instruction stream untouched.

use log::log;

use super::exclusion::ScopeExclusion;
use super::type_flow::{Inference, TypeFlow};
use super::WeaveContext;
use crate::ir::{CallKind, CompiledUnit, Instruction, MethodEntry, MethodRef};
use crate::utils::{Error, Result};

/// A predicate deciding whether a call site should be redirected
pub type Predicate = Box<dyn Fn(&CallSite<'_>) -> Result<bool>>;

/// Redirects call sites matched by `predicate` to `replacement`.
///
/// Predicates must not have side effects or depend on rewrite state; a
/// replaced call must no longer match, which keeps rewriting idempotent.
pub struct WrapperRule {
    pub name: &'static str,
    predicate: Predicate,
    pub replacement: MethodRef,
    /// Overrides the call kind of the replaced instruction
    pub call_kind: Option<CallKind>,
}

impl WrapperRule {
    pub fn new<F>(name: &'static str, replacement: MethodRef, predicate: F) -> Self
    where
        F: Fn(&CallSite<'_>) -> Result<bool> + 'static,
    {
        Self {
            name,
            predicate: Box::new(predicate),
            replacement,
            call_kind: None,
        }
    }

    pub fn with_call_kind(mut self, kind: CallKind) -> Self {
        self.call_kind = Some(kind);
        self
    }

    pub fn matches(&self, site: &CallSite<'_>) -> Result<bool> {
        (self.predicate)(site)
    }
}

/// A call instruction in the context of its method
pub struct CallSite<'a> {
    pub method: &'a MethodEntry,
    pub declaring_type: &'a str,
    pub index: usize,
    pub ctx: &'a WeaveContext,
}

impl<'a> CallSite<'a> {
    pub fn instruction(&self) -> Option<&'a Instruction> {
        self.method.instructions().get(self.index)
    }

    pub fn callee(&self) -> Option<&'a MethodRef> {
        self.instruction().and_then(Instruction::callee)
    }

    /// Callee full name equals `full_name`
    pub fn callee_is(&self, full_name: &str) -> bool {
        self.callee().is_some_and(|c| c.full_name() == full_name)
    }

    /// Whether the receiver pushed right before this call may be a `target`
    pub fn receiver_is(&self, target: &str) -> Result<bool> {
        let Some(previous) = self.index.checked_sub(1) else {
            return Ok(false);
        };

        let flow = TypeFlow::new(self.method, self.declaring_type, &self.ctx.hierarchy);
        let inference = flow.infer(previous, target)?;
        if inference == Inference::Assumed {
            log!(
                self.ctx.trace_level(),
                "Weaver could not prove the receiver type at {}+{}; assuming {}",
                self.method.display_name(self.declaring_type),
                self.index,
                target
            );
        }
        Ok(inference.is_match())
    }
}

/// Replace every call in `method` matched by a rule, first match wins.
/// Returns whether any instruction was replaced.
pub fn replace_matching_calls(
    method: &mut MethodEntry,
    declaring_type: &str,
    rules: &[WrapperRule],
    ctx: &WeaveContext,
) -> Result<bool> {
    let len = match &method.body {
        Some(body) => body.len(),
        None => return Ok(false),
    };

    let mut did_weave = false;

    for index in 0..len {
        let chosen = {
            let site = CallSite {
                method: &*method,
                declaring_type,
                index,
                ctx,
            };
            if !site.instruction().is_some_and(Instruction::is_call) {
                continue;
            }
            first_match(rules, &site)?
        };

        let Some(rule) = chosen else {
            continue;
        };
        let method_name = method.display_name(declaring_type);
        let Some(Instruction::Call { callee, kind }) =
            method.body.as_mut().and_then(|b| b.get_mut(index))
        else {
            continue;
        };

        log!(
            ctx.trace_level(),
            "Weaver replacing \"{}\" with \"{}\" in \"{}\"",
            callee,
            rule.replacement,
            method_name
        );

        *callee = rule.replacement.clone();
        if let Some(override_kind) = rule.call_kind {
            *kind = override_kind;
        }
        did_weave = true;
    }

    Ok(did_weave)
}

fn first_match<'r>(rules: &'r [WrapperRule], site: &CallSite<'_>) -> Result<Option<&'r WrapperRule>> {
    for rule in rules {
        let matched = rule.matches(site).map_err(|e| Error::Rule {
            rule: rule.name.to_string(),
            method: site.method.display_name(site.declaring_type),
            message: e.to_string(),
        })?;
        if matched {
            return Ok(Some(rule));
        }
    }
    Ok(None)
}

/// Apply `rules` to every type of the unit, nested types included.
///
/// Types are visited with an explicit work stack. Excluded types are skipped
/// together with everything nested inside them.
pub fn weave_type_tree(
    unit: &mut CompiledUnit,
    rules: &[WrapperRule],
    scope: &ScopeExclusion,
    ctx: &WeaveContext,
) -> Result<bool> {
    let mut did_weave = false;
    let mut stack: Vec<Vec<usize>> = (0..unit.types.len()).rev().map(|i| vec![i]).collect();

    while let Some(path) = stack.pop() {
        let (mask, nested_count, full_name) = {
            let Some(ty) = unit.type_at(&path) else {
                continue;
            };
            let parent = path.split_last().and_then(|(_, outer)| unit.type_at(outer));

            if !scope.should_weave_type(parent, ty) {
                log!(
                    ctx.trace_level(),
                    "Weaver skipped type {} because it or its origin method is excluded",
                    ty.full_name
                );
                continue;
            }

            let mask: Vec<bool> = ty
                .methods
                .iter()
                .map(|m| {
                    let weave = scope.should_weave_method(ty, m);
                    if !weave {
                        log!(
                            ctx.trace_level(),
                            "Weaver skipped {}.{} because it is excluded",
                            ty.name,
                            m.name
                        );
                    }
                    weave
                })
                .collect();
            (mask, ty.nested_types.len(), ty.full_name.clone())
        };

        let Some(ty) = unit.type_at_mut(&path) else {
            continue;
        };
        for (method, weave) in ty.methods.iter_mut().zip(mask) {
            if weave && replace_matching_calls(method, &full_name, rules, ctx)? {
                did_weave = true;
            }
        }

        for i in (0..nested_count).rev() {
            let mut child = path.clone();
            child.push(i);
            stack.push(child);
        }
    }

    Ok(did_weave)
}
