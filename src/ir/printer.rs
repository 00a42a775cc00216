//! Unit Printer - Pretty print compiled units
//!
//! Outputs a human-readable listing of a unit for debugging weaver decisions.

use std::fmt::Write;

use super::unit::{CompiledUnit, MethodEntry, TypeEntry};

/// Pretty printer for compiled units
pub struct UnitPrinter {
    output: String,
    indent: usize,
}

impl UnitPrinter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    /// Print a unit to string
    pub fn print_unit(&mut self, unit: &CompiledUnit) -> String {
        self.output.clear();
        self.indent = 0;

        writeln!(self.output, "; Unit: {}", unit.name).unwrap();
        if !unit.references.is_empty() {
            writeln!(self.output, "; References: {}", unit.references.join(", ")).unwrap();
        }
        for attr in &unit.attributes {
            writeln!(self.output, "; [{}]", attr).unwrap();
        }
        writeln!(self.output).unwrap();

        for ty in &unit.types {
            self.print_type(ty);
            writeln!(self.output).unwrap();
        }

        self.output.clone()
    }

    fn pad(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
    }

    fn print_type(&mut self, ty: &TypeEntry) {
        for attr in &ty.attributes {
            self.pad();
            writeln!(self.output, "[{}]", attr).unwrap();
        }
        self.pad();
        write!(self.output, "type {}", ty.full_name).unwrap();
        if ty.compiler_generated {
            self.output.push_str(" (generated)");
        }
        let parents: Vec<&str> = ty
            .base_type
            .iter()
            .chain(ty.interfaces.iter())
            .map(String::as_str)
            .collect();
        if !parents.is_empty() {
            write!(self.output, " : {}", parents.join(", ")).unwrap();
        }
        writeln!(self.output, " {{").unwrap();

        self.indent += 1;
        for field in &ty.fields {
            self.pad();
            let vis = if field.is_public { "pub " } else { "" };
            writeln!(self.output, "{}field {}: {}", vis, field.name, field.field_type).unwrap();
        }
        for method in &ty.methods {
            self.print_method(method);
        }
        for nested in &ty.nested_types {
            self.print_type(nested);
        }
        self.indent -= 1;

        self.pad();
        writeln!(self.output, "}}").unwrap();
    }

    fn print_method(&mut self, method: &MethodEntry) {
        for attr in &method.attributes {
            self.pad();
            writeln!(self.output, "[{}]", attr).unwrap();
        }
        self.pad();
        let kw = if method.has_this { "method" } else { "static method" };
        write!(self.output, "{} {}(", kw, method.name).unwrap();
        for (i, param) in method.params.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            write!(self.output, "{}: {}", param.name, param.param_type).unwrap();
        }
        write!(self.output, ") -> {}", method.return_type).unwrap();

        let Some(body) = &method.body else {
            writeln!(self.output, ";").unwrap();
            return;
        };
        writeln!(self.output, " {{").unwrap();

        self.indent += 1;
        for (i, local) in method.locals.iter().enumerate() {
            self.pad();
            let name = local.name.as_deref().unwrap_or("_");
            writeln!(self.output, ".local loc{} {}: {}", i, name, local.local_type).unwrap();
        }
        for (i, inst) in body.iter().enumerate() {
            self.pad();
            writeln!(self.output, "{:04}: {}", i, inst).unwrap();
        }
        self.indent -= 1;

        self.pad();
        writeln!(self.output, "}}").unwrap();
    }
}

impl Default for UnitPrinter {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to print a unit
pub fn print_unit(unit: &CompiledUnit) -> String {
    UnitPrinter::new().print_unit(unit)
}
