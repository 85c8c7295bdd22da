// src/compat.rs
//
// Compatibility (subtype/supertype) and structural equality over type
// expressions, with covariant and contravariant modes. Function types are
// contravariant in their parameters and covariant in their return type;
// tabular types dispatch to column-set compatibility.

use crate::errors::{Result, TypeAlgebraError};
use crate::inheritance::resolve_function_generic_type;
use crate::model::{ClassId, Model};
use crate::multiplicity::multiplicities_equal;
use crate::printer;
use crate::span::to_source_span;
use crate::types::{FunctionSigId, GenericId, RawType, TypeNode, VariableValue};

/// Is `g1` compatible with `g2`? Covariant mode asks whether `g1` is a
/// subtype of (or equal to) `g2`; contravariant mode flips the direction.
pub fn is_generic_compatible_with(
    model: &mut Model,
    g1: GenericId,
    g2: GenericId,
    covariant: bool,
) -> Result<bool> {
    compatible_impl(model, g1, g2, covariant, 0)
}

pub(crate) fn compatible_impl(
    model: &mut Model,
    g1: GenericId,
    g2: GenericId,
    covariant: bool,
    depth: usize,
) -> Result<bool> {
    if depth > model.max_type_depth() {
        return Err(TypeAlgebraError::TypeGraphTooDeep {
            type_expr: printer::print(model, g1),
            span: to_source_span(model.node(g1).span()),
        });
    }

    // Value-level template arguments must line up before anything else
    if !type_variable_values_compatible(model, g1, g2) {
        return Ok(false);
    }

    if generic_types_equal(model, g1, g2) {
        return Ok(true);
    }

    let (sub, sup) = if covariant { (g1, g2) } else { (g2, g1) };
    let (Some(sub_raw), Some(sup_raw)) = (model.raw_type_of(sub), model.raw_type_of(sup)) else {
        // A missing raw type stands in for an unresolved parameter; treated
        // permissively during partial inference.
        return Ok(true);
    };

    if model.raw_is_bottom(sub_raw) || model.raw_is_top(sup_raw) {
        return Ok(true);
    }

    if let RawType::Relation(sub_rel) = sub_raw {
        return Ok(match sup_raw {
            RawType::Relation(sup_rel) => model.relation_compatible(sub_rel, sup_rel),
            _ => false,
        });
    }

    if let (RawType::Function(sub_sig), RawType::Function(sup_sig)) = (sub_raw, sup_raw) {
        return function_sig_compatible(model, Some(sub_sig), Some(sup_sig), depth);
    }

    let sub_is_callable = is_nominal_function(model, sub_raw);
    let sup_is_callable = is_nominal_function(model, sup_raw);
    if sub_is_callable || sup_is_callable {
        if !(sub_is_callable && sup_is_callable) {
            return Ok(model.raw_subtype_of(sub_raw, sup_raw));
        }
        // Both callables: the kinds must be nominally related (a property is
        // not a plain function definition) ...
        if !model.raw_subtype_of(sub_raw, sup_raw) {
            return Ok(false);
        }
        // ... and their resolved signatures must respect variance.
        let sub_sig = resolve_function_generic_type(model, sub)?;
        let sup_sig = resolve_function_generic_type(model, sup)?;
        return function_sig_compatible(model, sub_sig, sup_sig, depth);
    }

    // Plain class against plain class: nominal subtyping on the raw types.
    // TODO: compare the instantiated type arguments as well; callers
    // currently rely on this being raw-type-only, so changing it needs a
    // caller audit first.
    Ok(model.raw_subtype_of(sub_raw, sup_raw))
}

fn is_nominal_function(model: &Model, raw: RawType) -> bool {
    matches!(raw, RawType::Class(c) if model.is_subclass_of(c, ClassId::FUNCTION))
}

/// Compatibility of two resolved function signatures: equal arity,
/// contravariant parameters, covariant return. A supertype whose signature
/// is erased (`Function<Any>`) is compatible with anything; an erased
/// subtype is not.
fn function_sig_compatible(
    model: &mut Model,
    sub: Option<FunctionSigId>,
    sup: Option<FunctionSigId>,
    depth: usize,
) -> Result<bool> {
    let Some(sup) = sup else {
        return Ok(true);
    };
    let Some(sub) = sub else {
        return Ok(false);
    };

    let sub_sig = model.graph.function_sig(sub).clone();
    let sup_sig = model.graph.function_sig(sup).clone();
    if sub_sig.params.len() != sup_sig.params.len() {
        return Ok(false);
    }
    for (sub_param, sup_param) in sub_sig.params.iter().zip(sup_sig.params.iter()) {
        if let (Some(a), Some(b)) = (sub_param.ty, sup_param.ty)
            && !compatible_impl(model, a, b, false, depth + 1)?
        {
            return Ok(false);
        }
    }
    match (sub_sig.ret, sup_sig.ret) {
        (Some(a), Some(b)) => compatible_impl(model, a, b, true, depth + 1),
        _ => Ok(true),
    }
}

fn variable_values_of(model: &Model, id: GenericId) -> &[VariableValue] {
    model
        .node(id)
        .as_concrete()
        .map(|c| c.variable_values.as_slice())
        .unwrap_or(&[])
}

fn type_variable_values_compatible(model: &Model, g1: GenericId, g2: GenericId) -> bool {
    let a = variable_values_of(model, g1);
    let b = variable_values_of(model, g2);
    if a.is_empty() || b.is_empty() {
        return true;
    }
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).all(|(x, y)| {
        matches!(x, VariableValue::Var(_)) || matches!(y, VariableValue::Var(_)) || x == y
    })
}

/// Structural equality of two type expressions. Order of arguments matters;
/// nothing is reordered or canonicalized.
pub fn generic_types_equal(model: &Model, g1: GenericId, g2: GenericId) -> bool {
    if g1 == g2 {
        return true;
    }
    match (model.node(g1), model.node(g2)) {
        (TypeNode::Operation(a), TypeNode::Operation(b)) => {
            a.op == b.op
                && generic_types_equal(model, a.left, b.left)
                && generic_types_equal(model, a.right, b.right)
        }
        (TypeNode::Operation(_), _) | (_, TypeNode::Operation(_)) => false,
        (TypeNode::Parameter(a), TypeNode::Parameter(b)) => a.name == b.name,
        (TypeNode::Parameter(_), _) | (_, TypeNode::Parameter(_)) => false,
        (TypeNode::Concrete(a), TypeNode::Concrete(b)) => {
            // Tabular types have their own structural comparison
            if let RawType::Relation(rel_a) = a.raw {
                return match b.raw {
                    RawType::Relation(rel_b) => model.relations_equal(rel_a, rel_b),
                    _ => false,
                };
            }
            // Function types are often synthesized ad hoc: distinct raw-type
            // identities may still be structurally equal shapes
            let raws_equal = match (a.raw, b.raw) {
                (RawType::Class(x), RawType::Class(y)) => x == y,
                (RawType::Function(x), RawType::Function(y)) => {
                    x == y || function_sigs_equal(model, x, y)
                }
                _ => false,
            };
            raws_equal
                && a.mult_args.len() == b.mult_args.len()
                && a.mult_args
                    .iter()
                    .zip(b.mult_args.iter())
                    .all(|(x, y)| multiplicities_equal(x, y, true))
                && a.type_args.len() == b.type_args.len()
                && a.type_args
                    .iter()
                    .zip(b.type_args.iter())
                    .all(|(&x, &y)| generic_types_equal(model, x, y))
                && a.variable_values == b.variable_values
        }
    }
}

/// Structural equality of two ad-hoc function signatures.
pub fn function_sigs_equal(model: &Model, a: FunctionSigId, b: FunctionSigId) -> bool {
    let sig_a = model.graph.function_sig(a);
    let sig_b = model.graph.function_sig(b);
    sig_a.params.len() == sig_b.params.len()
        && sig_a
            .params
            .iter()
            .zip(sig_b.params.iter())
            .all(|(x, y)| {
                opt_generics_equal(model, x.ty, y.ty)
                    && opt_mults_equal(x.mult.as_ref(), y.mult.as_ref())
            })
        && opt_generics_equal(model, sig_a.ret, sig_b.ret)
        && opt_mults_equal(sig_a.ret_mult.as_ref(), sig_b.ret_mult.as_ref())
}

fn opt_generics_equal(model: &Model, a: Option<GenericId>, b: Option<GenericId>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => generic_types_equal(model, x, y),
        _ => false,
    }
}

fn opt_mults_equal(
    a: Option<&crate::multiplicity::Multiplicity>,
    b: Option<&crate::multiplicity::Multiplicity>,
) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => multiplicities_equal(x, y, true),
        _ => false,
    }
}

/// Raw-type nominal subtype check with the permissive null handling used
/// mid-inference: a missing subtype raw requires Top on the super side, a
/// missing supertype raw requires Bottom on the sub side.
// TODO check type arguments
pub fn sub_type_of(model: &Model, generic: GenericId, possible_super: GenericId) -> bool {
    let raw = model.raw_type_of(generic);
    let super_raw = model.raw_type_of(possible_super);
    match (raw, super_raw) {
        (None, sup) => sup.is_some_and(|s| model.raw_is_top(s)),
        (Some(r), None) => model.raw_is_bottom(r),
        (Some(r), Some(s)) => model.raw_subtype_of(r, s),
    }
}
