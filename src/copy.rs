// src/copy.rs
//
// Structural copy of a type-expression graph: every reachable node is
// re-allocated, so the copy can be annotated or relocated without touching
// the original. Copies can relocate source positions and can be tagged as
// inferred so a later unbinding phase knows to strip them.

use crate::model::Model;
use crate::span::Span;
use crate::types::{
    Column, ConcreteType, FunctionParam, FunctionSig, GenericId, GenericIdVec, MultiplicityVec,
    Origin, ParamRef, RawType, RelationShape, TypeNode, TypeOperation,
};

/// Deep copy, keeping source positions and tagging the copy as user-written.
pub fn copy_generic_type(model: &mut Model, id: GenericId) -> GenericId {
    copy_impl(model, id, None, false)
}

/// Deep copy with every node's source position replaced.
pub fn copy_generic_type_with_span(
    model: &mut Model,
    id: GenericId,
    span: Option<Span>,
) -> GenericId {
    copy_impl(model, id, Some(span), false)
}

/// Deep copy tagged as inferred, keeping source positions.
pub fn copy_as_inferred(model: &mut Model, id: GenericId) -> GenericId {
    copy_impl(model, id, None, true)
}

/// Deep copy tagged as inferred with every node's source position replaced.
pub fn copy_as_inferred_with_span(
    model: &mut Model,
    id: GenericId,
    span: Option<Span>,
) -> GenericId {
    copy_impl(model, id, Some(span), true)
}

fn copy_impl(
    model: &mut Model,
    id: GenericId,
    replace_span: Option<Option<Span>>,
    inferred: bool,
) -> GenericId {
    let origin = if inferred {
        Origin::Inferred
    } else {
        Origin::UserWritten
    };
    let node = model.node(id).clone();
    match node {
        TypeNode::Operation(op) => {
            let right = copy_impl(model, op.right, replace_span, inferred);
            let left = copy_impl(model, op.left, replace_span, inferred);
            model.graph.alloc(TypeNode::Operation(TypeOperation {
                op: op.op,
                left,
                right,
                span: pick(replace_span, op.span),
                origin,
            }))
        }
        TypeNode::Concrete(c) => {
            let raw = copy_raw(model, c.raw, replace_span, inferred);
            let type_args: GenericIdVec = c
                .type_args
                .iter()
                .map(|&arg| copy_impl(model, arg, replace_span, inferred))
                .collect();
            let mult_args: MultiplicityVec =
                c.mult_args.iter().map(|m| m.copy(replace_span)).collect();
            model.graph.alloc(TypeNode::Concrete(ConcreteType {
                raw,
                type_args,
                mult_args,
                variable_values: c.variable_values.clone(),
                span: pick(replace_span, c.span),
                origin,
            }))
        }
        TypeNode::Parameter(p) => {
            let lower_bound = p
                .lower_bound
                .map(|b| copy_impl(model, b, replace_span, inferred));
            let upper_bound = p
                .upper_bound
                .map(|b| copy_impl(model, b, replace_span, inferred));
            model.graph.alloc(TypeNode::Parameter(ParamRef {
                name: p.name.clone(),
                contravariant: p.contravariant,
                lower_bound,
                upper_bound,
                span: pick(replace_span, p.span),
                origin,
            }))
        }
    }
}

fn copy_raw(
    model: &mut Model,
    raw: RawType,
    replace_span: Option<Option<Span>>,
    inferred: bool,
) -> RawType {
    match raw {
        // Class declarations are owned by the metamodel and shared by identity
        RawType::Class(class) => RawType::Class(class),
        RawType::Function(sig_id) => {
            let sig = model.graph.function_sig(sig_id).clone();
            let params = sig
                .params
                .iter()
                .map(|p| FunctionParam {
                    name: p.name.clone(),
                    ty: p.ty.map(|t| copy_impl(model, t, replace_span, inferred)),
                    mult: p.mult.as_ref().map(|m| m.copy(replace_span)),
                })
                .collect();
            let ret = sig.ret.map(|r| copy_impl(model, r, replace_span, inferred));
            let ret_mult = sig.ret_mult.as_ref().map(|m| m.copy(replace_span));
            model.new_function_sig(FunctionSig {
                params,
                ret,
                ret_mult,
                span: pick(replace_span, sig.span),
            })
        }
        RawType::Relation(rel_id) => {
            let shape = model.graph.relation(rel_id).clone();
            let columns = shape
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    wildcard: c.wildcard,
                    ty: c.ty.map(|t| copy_impl(model, t, replace_span, inferred)),
                    mult: c.mult.as_ref().map(|m| m.copy(replace_span)),
                    span: pick(replace_span, c.span),
                })
                .collect();
            RawType::Relation(model.graph.alloc_relation(RelationShape {
                columns,
                span: pick(replace_span, shape.span),
            }))
        }
    }
}

fn pick(replace: Option<Option<Span>>, original: Option<Span>) -> Option<Span> {
    match replace {
        Some(new_span) => new_span,
        None => original,
    }
}
