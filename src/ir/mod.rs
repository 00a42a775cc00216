//! Instruction model - compiled units, types, methods and instruction streams

pub mod hierarchy;
pub mod instruction;
pub mod printer;
pub mod unit;

pub use hierarchy::TypeHierarchy;
pub use instruction::{CallKind, FieldRef, Instruction, MethodRef, StackEffect, Target, VOID};
pub use unit::{CompiledUnit, FieldEntry, Local, MethodEntry, Parameter, PropertyEntry, TypeEntry};
