// src/printer.rs
//
// Deterministic, side-effect-free rendering of type expressions. The exact
// output is a contract: downstream diagnostics assert these strings
// verbatim, and tests use them as a human-readable equality oracle.

use std::fmt::Write;

use crate::model::Model;
use crate::multiplicity::Multiplicity;
use crate::types::{FunctionSigId, GenericId, OpKind, RawType, RelationId, TypeNode, VariableValue};

/// Print with short class names.
pub fn print(model: &Model, id: GenericId) -> String {
    let mut out = String::new();
    write_generic(&mut out, model, Some(id), false);
    out
}

/// Print with fully-qualified class paths.
pub fn print_full_paths(model: &Model, id: GenericId) -> String {
    let mut out = String::new();
    write_generic(&mut out, model, Some(id), true);
    out
}

pub(crate) fn write_generic(out: &mut String, model: &Model, id: Option<GenericId>, full: bool) {
    let Some(id) = id else {
        out.push_str("NULL");
        return;
    };
    match model.node(id) {
        TypeNode::Operation(op) => {
            write_generic(out, model, Some(op.left), full);
            out.push_str(match op.op {
                OpKind::Union => "+",
                OpKind::Subset => "\u{2286}",
                OpKind::Equal => "=",
                OpKind::Difference => "-",
            });
            write_generic(out, model, Some(op.right), full);
        }
        TypeNode::Parameter(p) => {
            if p.contravariant {
                out.push('-');
            }
            out.push_str(&p.name);
        }
        TypeNode::Concrete(c) => {
            match c.raw {
                RawType::Function(sig) => write_function_sig(out, model, sig, full),
                RawType::Relation(rel) => write_relation(out, model, rel, full),
                RawType::Class(class) => {
                    let def = model.class(class);
                    if full {
                        out.push_str(&def.path());
                    } else {
                        out.push_str(&def.name);
                    }
                }
            }
            write_variable_values(out, &c.variable_values);
            write_args(out, model, &c.type_args, &c.mult_args, full);
        }
    }
}

fn write_args(
    out: &mut String,
    model: &Model,
    type_args: &[GenericId],
    mult_args: &[Multiplicity],
    full: bool,
) {
    if type_args.is_empty() && mult_args.is_empty() {
        return;
    }
    out.push('<');
    for (i, arg) in type_args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_generic(out, model, Some(*arg), full);
    }
    if !mult_args.is_empty() {
        out.push('|');
        for (i, mult) in mult_args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{mult}");
        }
    }
    out.push('>');
}

fn write_function_sig(out: &mut String, model: &Model, sig: FunctionSigId, full: bool) {
    let sig = model.graph.function_sig(sig);
    out.push('{');
    for param in &sig.params {
        write_generic(out, model, param.ty, full);
        write_mult_suffix(out, param.mult.as_ref());
        out.push_str("->");
    }
    write_generic(out, model, sig.ret, full);
    write_mult_suffix(out, sig.ret_mult.as_ref());
    out.push('}');
}

fn write_mult_suffix(out: &mut String, mult: Option<&Multiplicity>) {
    if let Some(mult) = mult {
        let _ = write!(out, "[{mult}]");
    }
}

fn write_relation(out: &mut String, model: &Model, rel: RelationId, full: bool) {
    let shape = model.graph.relation(rel);
    out.push('(');
    for (i, col) in shape.columns.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&col.name);
        if col.wildcard {
            out.push('?');
        }
        out.push(':');
        write_generic(out, model, col.ty, full);
        if let Some(mult) = &col.mult
            && *mult != Multiplicity::one()
        {
            let _ = write!(out, "[{mult}]");
        }
    }
    out.push(')');
}

fn write_variable_values(out: &mut String, values: &[VariableValue]) {
    if values.is_empty() {
        return;
    }
    out.push('(');
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        match value {
            VariableValue::Int(v) => {
                let _ = write!(out, "{v}");
            }
            VariableValue::Str(s) => {
                let _ = write!(out, "'{s}'");
            }
            VariableValue::Var(name) => out.push_str(name),
        }
    }
    out.push(')');
}
