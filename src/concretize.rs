// src/concretize.rs
//
// The concretization engine: recursive substitution of type and
// multiplicity parameters through a type expression, as far as the
// available bindings permit. Never mutates an existing node; partially
// resolved results are fresh nodes to be re-resolved on a later pass.

use crate::binding::{MultBindings, TypeBindings};
use crate::copy::copy_generic_type;
use crate::errors::{Result, TypeAlgebraError};
use crate::model::{ClassId, Model};
use crate::printer;
use crate::span::to_source_span;
use crate::types::{
    Column, ConcreteType, FunctionParam, FunctionSig, GenericId, GenericIdVec, MultiplicityVec,
    OpKind, Origin, ParamRef, RawType, RelationShape, TypeNode,
};

/// Make a type argument as concrete as possible under the given substitution
/// environments. Absent input propagates to absent output (optional return
/// types mid-inference). An unresolved parameter is returned unchanged — a
/// valid state during partial inference, not an error.
pub fn make_type_argument_as_concrete_as_possible(
    model: &mut Model,
    type_arg: Option<GenericId>,
    type_env: &TypeBindings,
    mult_env: &MultBindings,
) -> Result<Option<GenericId>> {
    let Some(id) = type_arg else {
        return Ok(None);
    };
    tracing::trace!(
        type_arg = %printer::print(model, id),
        bindings = type_env.len(),
        "concretizing type argument"
    );
    concretize_node(model, id, type_env, mult_env, 0).map(Some)
}

pub(crate) fn concretize_node(
    model: &mut Model,
    id: GenericId,
    type_env: &TypeBindings,
    mult_env: &MultBindings,
    depth: usize,
) -> Result<GenericId> {
    if depth > model.max_type_depth() {
        return Err(TypeAlgebraError::TypeGraphTooDeep {
            type_expr: printer::print(model, id),
            span: to_source_span(model.node(id).span()),
        });
    }

    // Cycle guard: drop any binding whose value is this very node, so a
    // parameter bound to a bare reference to itself cannot substitute
    // forever. Identity here is node identity, not structural equality.
    let filtered_storage;
    let type_env = if type_env.values().any(|&v| v == id) {
        filtered_storage = type_env
            .iter()
            .filter(|(_, v)| **v != id)
            .map(|(k, v)| (k.clone(), *v))
            .collect::<TypeBindings>();
        &filtered_storage
    } else {
        type_env
    };

    let node = model.node(id).clone();
    match node {
        TypeNode::Operation(_) => resolve_operation(model, id, type_env, mult_env, depth),
        TypeNode::Parameter(p) => Ok(resolve_type_parameter(model, id, &p, type_env)),
        TypeNode::Concrete(c) => match c.raw {
            RawType::Relation(rel) => {
                rebuild_relation(model, &c, rel, type_env, mult_env, depth)
            }
            RawType::Function(sig) => {
                rebuild_function(model, &c, sig, type_env, mult_env, depth)
            }
            RawType::Class(_) => rebuild_class(model, &c, type_env, mult_env, depth),
        },
    }
}

/// Look up a bare parameter reference in the environment; absent bindings
/// leave the reference unchanged. A contravariant parameter bound to the top
/// type collapses to the bottom sentinel: contravariant positions default to
/// the most restrictive bound, not the least.
fn resolve_type_parameter(
    model: &mut Model,
    id: GenericId,
    param: &ParamRef,
    type_env: &TypeBindings,
) -> GenericId {
    let Some(&replacement) = type_env.get(&param.name) else {
        return id;
    };
    if param.contravariant
        && model
            .raw_type_of(replacement)
            .is_some_and(|raw| model.raw_is_top(raw))
    {
        return model.wrap_class(ClassId::BOTTOM);
    }
    replacement
}

/// Resolve anything as a bare lookup: parameters resolve through the
/// environment, every other node stands for itself.
fn resolve_bare(model: &mut Model, id: GenericId, type_env: &TypeBindings) -> GenericId {
    match model.node(id).clone() {
        TypeNode::Parameter(p) => resolve_type_parameter(model, id, &p, type_env),
        _ => id,
    }
}

fn resolve_operation(
    model: &mut Model,
    id: GenericId,
    type_env: &TypeBindings,
    mult_env: &MultBindings,
    depth: usize,
) -> Result<GenericId> {
    let Some(op) = model.node(id).as_operation().cloned() else {
        return Err(TypeAlgebraError::UnresolvableOperation {
            detail: format!(
                "operation resolution dispatched on a non-operation node: {}",
                printer::print(model, id)
            ),
        });
    };

    match op.op {
        // Equality and subset are predicates to evaluate elsewhere, not
        // types to materialize: concretize-and-copy both sides, no merging.
        OpKind::Equal | OpKind::Subset => {
            let left = concretize_node(model, op.left, type_env, mult_env, depth + 1)?;
            let left = copy_generic_type(model, left);
            let right = concretize_node(model, op.right, type_env, mult_env, depth + 1)?;
            let right = copy_generic_type(model, right);
            Ok(model.new_operation(op.op, left, right, op.span, Origin::Inferred))
        }
        OpKind::Union | OpKind::Difference => {
            let left = if model.node(op.left).as_operation().is_some() {
                resolve_operation(model, op.left, type_env, mult_env, depth + 1)?
            } else {
                let bare = resolve_bare(model, op.left, type_env);
                copy_generic_type(model, bare)
            };
            let right = concretize_node(model, op.right, type_env, mult_env, depth + 1)?;
            let right = copy_generic_type(model, right);

            if model.node(left).is_concrete() && model.node(right).is_concrete() {
                merge(model, op.op, left, right)
            } else {
                // Not resolvable yet; pair the partially-resolved sides for a
                // later pass.
                Ok(model.new_operation(op.op, left, right, op.span, Origin::Inferred))
            }
        }
    }
}

/// Merge two concrete tabular operands. Union concatenates the column lists
/// (duplicates retained, order preserved); difference removes the left
/// columns whose names appear on the right — names only, types are not
/// consulted.
fn merge(model: &mut Model, op: OpKind, left: GenericId, right: GenericId) -> Result<GenericId> {
    let left_rel = relation_operand(model, left)?;
    let right_rel = relation_operand(model, right)?;
    let left_shape = model.graph.relation(left_rel).clone();
    let right_shape = model.graph.relation(right_rel).clone();

    let mut columns = left_shape.columns.clone();
    match op {
        OpKind::Union => columns.extend(right_shape.columns.iter().cloned()),
        OpKind::Difference => {
            let removed: rustc_hash::FxHashSet<&str> = right_shape
                .columns
                .iter()
                .map(|c| c.name.as_str())
                .collect();
            columns.retain(|c| !removed.contains(c.name.as_str()));
        }
        OpKind::Equal | OpKind::Subset => {
            return Err(TypeAlgebraError::UnresolvableOperation {
                detail: "merge is only defined for union and difference".to_string(),
            });
        }
    }

    let merged = model.new_relation(columns, left_shape.span);
    Ok(model.new_concrete(
        RawType::Relation(merged),
        GenericIdVec::new(),
        MultiplicityVec::new(),
        None,
        Origin::Inferred,
    ))
}

fn relation_operand(model: &Model, id: GenericId) -> Result<crate::types::RelationId> {
    model
        .raw_type_of(id)
        .and_then(RawType::as_relation)
        .ok_or_else(|| TypeAlgebraError::UnresolvableOperation {
            detail: format!(
                "union/difference over a non-tabular operand: {}",
                printer::print(model, id)
            ),
        })
}

/// Rebuild a tabular type by concretizing each column's type, preserving
/// name, wildcard flag, multiplicity, and source position.
fn rebuild_relation(
    model: &mut Model,
    concrete: &ConcreteType,
    rel: crate::types::RelationId,
    type_env: &TypeBindings,
    mult_env: &MultBindings,
    depth: usize,
) -> Result<GenericId> {
    let shape = model.graph.relation(rel).clone();
    let mut columns = Vec::with_capacity(shape.columns.len());
    for col in &shape.columns {
        let ty = concretize_opt(model, col.ty, type_env, mult_env, depth)?;
        columns.push(Column {
            name: col.name.clone(),
            wildcard: col.wildcard,
            ty,
            mult: col.mult.clone(),
            span: col.span,
        });
    }
    let rebuilt = model.graph.alloc_relation(RelationShape {
        columns,
        span: shape.span,
    });
    Ok(model.new_concrete(
        RawType::Relation(rebuilt),
        GenericIdVec::new(),
        MultiplicityVec::new(),
        concrete.span,
        concrete.origin,
    ))
}

/// Rebuild a function type by concretizing each parameter's type and the
/// return type; multiplicities go through their own substitution.
fn rebuild_function(
    model: &mut Model,
    concrete: &ConcreteType,
    sig: crate::types::FunctionSigId,
    type_env: &TypeBindings,
    mult_env: &MultBindings,
    depth: usize,
) -> Result<GenericId> {
    let sig = model.graph.function_sig(sig).clone();
    let mut params = Vec::with_capacity(sig.params.len());
    for param in &sig.params {
        let ty = concretize_opt(model, param.ty, type_env, mult_env, depth)?;
        params.push(FunctionParam {
            name: param.name.clone(),
            ty,
            mult: param.mult.as_ref().map(|m| m.substitute(mult_env)),
        });
    }
    let ret = concretize_opt(model, sig.ret, type_env, mult_env, depth)?;
    let ret_mult = sig.ret_mult.as_ref().map(|m| m.substitute(mult_env));
    let raw = model.new_function_sig(FunctionSig {
        params,
        ret,
        ret_mult,
        span: sig.span,
    });
    Ok(model.new_concrete(
        raw,
        GenericIdVec::new(),
        MultiplicityVec::new(),
        concrete.span,
        concrete.origin,
    ))
}

/// Rebuild a plain class instantiation by concretizing each type argument
/// and substituting each multiplicity argument, keeping the raw type.
fn rebuild_class(
    model: &mut Model,
    concrete: &ConcreteType,
    type_env: &TypeBindings,
    mult_env: &MultBindings,
    depth: usize,
) -> Result<GenericId> {
    let mut type_args = GenericIdVec::with_capacity(concrete.type_args.len());
    for &arg in &concrete.type_args {
        type_args.push(concretize_node(model, arg, type_env, mult_env, depth + 1)?);
    }
    let mult_args: MultiplicityVec = concrete
        .mult_args
        .iter()
        .map(|m| m.substitute(mult_env))
        .collect();
    let rebuilt = model.graph.alloc(TypeNode::Concrete(ConcreteType {
        raw: concrete.raw,
        type_args,
        mult_args,
        variable_values: concrete.variable_values.clone(),
        span: concrete.span,
        origin: concrete.origin,
    }));
    Ok(rebuilt)
}

fn concretize_opt(
    model: &mut Model,
    arg: Option<GenericId>,
    type_env: &TypeBindings,
    mult_env: &MultBindings,
    depth: usize,
) -> Result<Option<GenericId>> {
    match arg {
        Some(id) => concretize_node(model, id, type_env, mult_env, depth + 1).map(Some),
        None => Ok(None),
    }
}
