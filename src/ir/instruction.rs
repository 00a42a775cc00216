//! Instruction model
//!
//! A method body is a flat, linearly laid out sequence of stack-machine
//! instructions. Only the operations the weaver reasons about are modelled
//! precisely; everything else is carried through as `Other`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Full name of the void type
pub const VOID: &str = "System.Void";

/// Name given to instance constructors
pub const CONSTRUCTOR: &str = ".ctor";

/// Reference to a callable
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    pub declaring_type: String,
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    pub return_type: String,
    /// Takes an implicit receiver
    #[serde(default)]
    pub has_this: bool,
}

impl MethodRef {
    /// Static method reference
    pub fn new(declaring_type: &str, name: &str, params: &[&str], return_type: &str) -> Self {
        Self {
            declaring_type: declaring_type.to_string(),
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            return_type: return_type.to_string(),
            has_this: false,
        }
    }

    /// Instance method reference
    pub fn instance(declaring_type: &str, name: &str, params: &[&str], return_type: &str) -> Self {
        Self {
            has_this: true,
            ..Self::new(declaring_type, name, params, return_type)
        }
    }

    /// Instance constructor reference
    pub fn constructor(declaring_type: &str, params: &[&str]) -> Self {
        Self::instance(declaring_type, CONSTRUCTOR, params, VOID)
    }

    /// `"<ret> <Declaring>::<Name>(<p1>,<p2>)"`
    pub fn full_name(&self) -> String {
        format!(
            "{} {}::{}({})",
            self.return_type,
            self.declaring_type,
            self.name,
            self.params.join(",")
        )
    }

    pub fn returns_value(&self) -> bool {
        self.return_type != VOID
    }

    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

/// Reference to a field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    pub declaring_type: String,
    pub name: String,
    pub field_type: String,
}

impl FieldRef {
    pub fn new(declaring_type: &str, name: &str, field_type: &str) -> Self {
        Self {
            declaring_type: declaring_type.to_string(),
            name: name.to_string(),
            field_type: field_type.to_string(),
        }
    }
}

/// Operand of a load or store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    Field(FieldRef),
    Local { index: usize },
    Parameter { index: usize },
    /// The implicit receiver of an instance method
    This,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Field(field) => write!(f, "{}::{}", field.declaring_type, field.name),
            Target::Local { index } => write!(f, "loc{}", index),
            Target::Parameter { index } => write!(f, "arg{}", index),
            Target::This => write!(f, "this"),
        }
    }
}

/// How a call is dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    /// Static or non-virtual dispatch
    Direct,
    /// Virtual or interface dispatch
    Virtual,
    /// Constructor invoked on a freshly allocated object
    Construct,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CallKind::Direct => "call",
            CallKind::Virtual => "callvirt",
            CallKind::Construct => "newobj",
        };
        write!(f, "{}", s)
    }
}

/// Number of stack slots an instruction consumes and produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackEffect {
    pub pops: usize,
    pub pushes: usize,
}

/// A single instruction in a method body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    Load { target: Target },
    Store { target: Target },
    Call { callee: MethodRef, kind: CallKind },
    Other { opcode: String },
}

impl Instruction {
    pub fn load(target: Target) -> Self {
        Instruction::Load { target }
    }

    pub fn store(target: Target) -> Self {
        Instruction::Store { target }
    }

    pub fn call(callee: MethodRef, kind: CallKind) -> Self {
        Instruction::Call { callee, kind }
    }

    pub fn other(opcode: &str) -> Self {
        Instruction::Other {
            opcode: opcode.to_string(),
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Instruction::Call { .. })
    }

    /// Callee of a call instruction
    pub fn callee(&self) -> Option<&MethodRef> {
        match self {
            Instruction::Call { callee, .. } => Some(callee),
            _ => None,
        }
    }

    /// Stack shape of the instruction, `None` for opaque instructions
    pub fn stack_effect(&self) -> Option<StackEffect> {
        match self {
            Instruction::Load { .. } => Some(StackEffect { pops: 0, pushes: 1 }),
            Instruction::Store { .. } => Some(StackEffect { pops: 1, pushes: 0 }),
            Instruction::Call { callee, kind } => {
                let effect = match kind {
                    CallKind::Construct => StackEffect {
                        pops: callee.params.len(),
                        pushes: 1,
                    },
                    CallKind::Direct | CallKind::Virtual => StackEffect {
                        pops: callee.params.len() + usize::from(callee.has_this),
                        pushes: usize::from(callee.returns_value()),
                    },
                };
                Some(effect)
            }
            Instruction::Other { .. } => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Load { target } => write!(f, "ld {}", target),
            Instruction::Store { target } => write!(f, "st {}", target),
            Instruction::Call { callee, kind } => write!(f, "{} {}", kind, callee),
            Instruction::Other { opcode } => write!(f, "{}", opcode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_format() {
        let m = MethodRef::instance(
            "System.Net.Http.HttpClient",
            CONSTRUCTOR,
            &["System.Net.Http.HttpMessageHandler", "System.Boolean"],
            VOID,
        );
        assert_eq!(
            m.full_name(),
            "System.Void System.Net.Http.HttpClient::.ctor(System.Net.Http.HttpMessageHandler,System.Boolean)"
        );
    }

    #[test]
    fn test_stack_effect_of_calls() {
        let ctor = Instruction::call(
            MethodRef::constructor("A.Client", &["A.Handler"]),
            CallKind::Construct,
        );
        assert_eq!(ctor.stack_effect(), Some(StackEffect { pops: 1, pushes: 1 }));

        let dispose = Instruction::call(
            MethodRef::instance("System.IDisposable", "Dispose", &[], VOID),
            CallKind::Virtual,
        );
        assert_eq!(dispose.stack_effect(), Some(StackEffect { pops: 1, pushes: 0 }));

        let factory = Instruction::call(
            MethodRef::new("A.Factory", "Make", &["System.Int32"], "A.Client"),
            CallKind::Direct,
        );
        assert_eq!(factory.stack_effect(), Some(StackEffect { pops: 1, pushes: 1 }));
        assert_eq!(Instruction::other("nop").stack_effect(), None);
    }

    #[test]
    fn test_instruction_json_shape() {
        let inst = Instruction::load(Target::Local { index: 2 });
        let json = serde_json::to_string(&inst).unwrap();
        assert_eq!(json, r#"{"op":"load","target":{"kind":"local","index":2}}"#);
        let back: Instruction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, inst);
    }
}
