// src/common.rs
//
// Common-type inference: the most specific common supertype (covariant) or
// most general common subtype (contravariant) of a set of type expressions,
// as observed at branch points and in heterogeneous collection literals.
// Function-type sets synthesize a unified signature instead.

use crate::copy::{copy_generic_type, copy_generic_type_with_span};
use crate::errors::Result;
use crate::inheritance::{
    resolve_class_mult_params_via_inheritance, resolve_class_type_params_via_inheritance,
};
use crate::model::{ClassId, Model};
use crate::multiplicity::{Multiplicity, min_subsuming_multiplicity};
use crate::span::Span;
use crate::types::{
    FunctionParam, FunctionSig, GenericId, GenericIdVec, MultiplicityVec, Origin, RawType,
    TypeNode,
};

/// Most general common type of a set. Any absent member makes the result
/// absent: no common type exists across a missing type.
pub fn find_best_common_generic_type(
    model: &mut Model,
    type_set: &[Option<GenericId>],
    covariant: bool,
    is_function: bool,
) -> Result<Option<GenericId>> {
    tracing::debug!(
        members = type_set.len(),
        covariant,
        is_function,
        "inferring best common generic type"
    );
    common_impl(model, type_set, covariant, is_function, None, 0)
}

/// As [`find_best_common_generic_type`], relocating synthesized and copied
/// nodes to the given span.
pub fn find_best_common_generic_type_with_span(
    model: &mut Model,
    type_set: &[Option<GenericId>],
    covariant: bool,
    is_function: bool,
    span: Option<Span>,
) -> Result<Option<GenericId>> {
    common_impl(model, type_set, covariant, is_function, Some(span), 0)
}

/// Convenience wrapper for the common covariant case: an empty set is the
/// bottom type, a singleton is a straight copy (no hierarchy walk).
pub fn find_best_common_covariant_non_function_type(
    model: &mut Model,
    type_set: &[GenericId],
    span: Option<Span>,
) -> Result<GenericId> {
    match type_set {
        [] => Ok(wrap_sentinel(model, ClassId::BOTTOM, span.map(Some))),
        [single] => Ok(match span {
            Some(_) => copy_generic_type_with_span(model, *single, span),
            None => copy_generic_type(model, *single),
        }),
        _ => {
            let wrapped: Vec<Option<GenericId>> = type_set.iter().map(|&g| Some(g)).collect();
            let result = common_impl(model, &wrapped, true, false, span.map(Some), 0)?;
            Ok(match result {
                Some(found) => found,
                // No absent members went in, so nothing can come out absent;
                // fall back to the permissive top rather than failing.
                None => wrap_sentinel(model, ClassId::TOP, span.map(Some)),
            })
        }
    }
}

fn common_impl(
    model: &mut Model,
    type_set: &[Option<GenericId>],
    covariant: bool,
    is_function: bool,
    replace_span: Option<Option<Span>>,
    depth: usize,
) -> Result<Option<GenericId>> {
    if type_set.is_empty() || type_set.iter().any(Option::is_none) {
        return Ok(None);
    }
    let members: Vec<GenericId> = type_set.iter().filter_map(|&g| g).collect();

    if is_function {
        return synthesize_function_type(model, &members, covariant, replace_span, depth)
            .map(Some);
    }
    if covariant {
        best_covariant(model, &members, replace_span, depth)
    } else {
        best_contravariant(model, &members, replace_span)
    }
}

/// Synthesize the common signature of a set of function types: parameters
/// merge contravariantly, returns covariantly, multiplicities by their
/// min-subsuming bound. Mismatched arities are not an error — the set is
/// just maximally generic (covariant) or maximally specific (contravariant).
fn synthesize_function_type(
    model: &mut Model,
    members: &[GenericId],
    covariant: bool,
    replace_span: Option<Option<Span>>,
    depth: usize,
) -> Result<GenericId> {
    let Some(arity) = common_function_arity(model, members) else {
        let sentinel = if covariant {
            ClassId::TOP
        } else {
            ClassId::BOTTOM
        };
        return Ok(wrap_sentinel(model, sentinel, replace_span));
    };

    let sigs: Vec<FunctionSig> = members
        .iter()
        .filter_map(|&m| model.raw_type_of(m).and_then(RawType::as_function))
        .map(|sig| model.graph.function_sig(sig).clone())
        .collect();

    let mut params = Vec::with_capacity(arity);
    for i in 0..arity {
        let types: Vec<Option<GenericId>> = sigs.iter().map(|s| s.params[i].ty).collect();
        let ty = common_impl(model, &types, false, false, replace_span, depth + 1)?;
        let mult = min_subsuming_multiplicity(sigs.iter().map(|s| s.params[i].mult.as_ref()));
        params.push(FunctionParam {
            name: String::new(),
            ty,
            mult,
        });
    }

    let returns: Vec<Option<GenericId>> = sigs.iter().map(|s| s.ret).collect();
    let ret = common_impl(model, &returns, true, false, replace_span, depth + 1)?;
    let ret_mult = min_subsuming_multiplicity(sigs.iter().map(|s| s.ret_mult.as_ref()));

    let raw = model.new_function_sig(FunctionSig {
        params,
        ret,
        ret_mult,
        span: replace_span.flatten(),
    });
    Ok(model.new_concrete(
        raw,
        GenericIdVec::new(),
        MultiplicityVec::new(),
        replace_span.flatten(),
        Origin::Inferred,
    ))
}

/// The shared parameter count, or None when the members disagree (or are
/// not all function types).
fn common_function_arity(model: &Model, members: &[GenericId]) -> Option<usize> {
    let mut arity = None;
    for &member in members {
        let sig = model.raw_type_of(member)?.as_function()?;
        let count = model.graph.function_sig(sig).params.len();
        match arity {
            None => arity = Some(count),
            Some(existing) if existing != count => return None,
            Some(_) => {}
        }
    }
    arity
}

fn best_covariant(
    model: &mut Model,
    members: &[GenericId],
    replace_span: Option<Option<Span>>,
    depth: usize,
) -> Result<Option<GenericId>> {
    // A bare parameter member wins over everything else. Known to be wrong
    // for mixed concrete/parameter sets (the result should widen to the top
    // type), but downstream expectations encode this resolution; keep it.
    if let Some(&param) = members
        .iter()
        .find(|&&m| matches!(model.node(m), TypeNode::Parameter(_)))
    {
        return Ok(Some(copy_member(model, param, replace_span)));
    }

    if members[1..]
        .iter()
        .all(|&m| crate::compat::generic_types_equal(model, members[0], m))
    {
        return Ok(Some(copy_member(model, members[0], replace_span)));
    }

    // Non-class shapes have no nominal hierarchy to walk
    let classes: Option<Vec<ClassId>> = members
        .iter()
        .map(|&m| model.raw_type_of(m).and_then(RawType::as_class))
        .collect();
    let Some(classes) = classes else {
        return Ok(Some(wrap_sentinel(model, ClassId::TOP, replace_span)));
    };

    for candidate in model.linearization(classes[0]) {
        if !classes.iter().all(|&c| model.is_subclass_of(c, candidate)) {
            continue;
        }
        return instantiate_common_ancestor(model, members, candidate, replace_span, depth)
            .map(Some);
    }
    // Top is in every linearization and everything is its subclass
    Ok(Some(wrap_sentinel(model, ClassId::TOP, replace_span)))
}

/// Build the instantiation of the common ancestor, recursively merging each
/// member's binding of every declared parameter.
fn instantiate_common_ancestor(
    model: &mut Model,
    members: &[GenericId],
    ancestor: ClassId,
    replace_span: Option<Option<Span>>,
    depth: usize,
) -> Result<GenericId> {
    let type_params = model.class(ancestor).type_params.clone();
    let mult_params = model.class(ancestor).mult_params.clone();
    if type_params.is_empty() && mult_params.is_empty() {
        return Ok(wrap_sentinel(model, ancestor, replace_span));
    }

    let mut resolved = Vec::with_capacity(members.len());
    for &member in members {
        let target = model.wrap_class(ancestor);
        resolved.push(resolve_class_type_params_via_inheritance(model, member, target)?);
    }

    let mut type_args = GenericIdVec::with_capacity(type_params.len());
    for param in &type_params {
        let values: Vec<Option<GenericId>> = resolved
            .iter()
            .map(|r| r.as_ref().and_then(|b| b.argument(&param.name)))
            .collect();
        let direction = !param.contravariant;
        let merged = common_impl(model, &values, direction, false, replace_span, depth + 1)?;
        type_args.push(match merged {
            Some(arg) => arg,
            None => {
                let sentinel = if direction {
                    ClassId::TOP
                } else {
                    ClassId::BOTTOM
                };
                wrap_sentinel(model, sentinel, replace_span)
            }
        });
    }

    let mut mult_args = MultiplicityVec::with_capacity(mult_params.len());
    for name in &mult_params {
        let mut bindings = Vec::with_capacity(members.len());
        for &member in members {
            bindings.push(
                resolve_class_mult_params_via_inheritance(model, member, RawType::Class(ancestor))?
                    .and_then(|b| b.arguments.get(name).cloned()),
            );
        }
        let combined = min_subsuming_multiplicity(bindings.iter().map(Option::as_ref));
        // Unresolvable on a speculative path: fall back to the widest range
        mult_args.push(combined.unwrap_or_else(Multiplicity::zero_many));
    }

    Ok(model.new_concrete(
        RawType::Class(ancestor),
        type_args,
        mult_args,
        replace_span.flatten(),
        Origin::Inferred,
    ))
}

fn best_contravariant(
    model: &mut Model,
    members: &[GenericId],
    replace_span: Option<Option<Span>>,
) -> Result<Option<GenericId>> {
    // Mirror of the covariant parameter-wins resolution
    if let Some(&param) = members
        .iter()
        .find(|&&m| matches!(model.node(m), TypeNode::Parameter(_)))
    {
        return Ok(Some(copy_member(model, param, replace_span)));
    }

    if members[1..]
        .iter()
        .all(|&m| crate::compat::generic_types_equal(model, members[0], m))
    {
        return Ok(Some(copy_member(model, members[0], replace_span)));
    }

    let classes: Option<Vec<ClassId>> = members
        .iter()
        .map(|&m| model.raw_type_of(m).and_then(RawType::as_class))
        .collect();
    let Some(classes) = classes else {
        return Ok(Some(wrap_sentinel(model, ClassId::BOTTOM, replace_span)));
    };

    // The most general member that is a subtype of all the others, if any;
    // otherwise only the bottom type is below the whole set.
    for (i, &candidate) in classes.iter().enumerate() {
        if classes
            .iter()
            .all(|&other| model.is_subclass_of(candidate, other))
        {
            return Ok(Some(copy_member(model, members[i], replace_span)));
        }
    }
    Ok(Some(wrap_sentinel(model, ClassId::BOTTOM, replace_span)))
}

fn copy_member(
    model: &mut Model,
    member: GenericId,
    replace_span: Option<Option<Span>>,
) -> GenericId {
    match replace_span {
        Some(span) => copy_generic_type_with_span(model, member, span),
        None => copy_generic_type(model, member),
    }
}

fn wrap_sentinel(
    model: &mut Model,
    class: ClassId,
    replace_span: Option<Option<Span>>,
) -> GenericId {
    model.new_concrete(
        RawType::Class(class),
        GenericIdVec::new(),
        MultiplicityVec::new(),
        replace_span.flatten(),
        Origin::Inferred,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixture;
    use crate::printer::print;

    fn common(
        f: &mut Fixture,
        set: &[GenericId],
        covariant: bool,
        is_function: bool,
    ) -> Option<GenericId> {
        let wrapped: Vec<Option<GenericId>> = set.iter().map(|&g| Some(g)).collect();
        find_best_common_generic_type(&mut f.model, &wrapped, covariant, is_function).unwrap()
    }

    #[test]
    fn absent_member_yields_absent_result() {
        let mut f = Fixture::new();
        let cat = f.class_ty(f.cat);
        let result =
            find_best_common_generic_type(&mut f.model, &[Some(cat), None], true, false).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn singleton_returns_a_copy() {
        let mut f = Fixture::new();
        let cat = f.class_ty(f.cat);
        let result = find_best_common_covariant_non_function_type(&mut f.model, &[cat], None)
            .unwrap();
        assert_ne!(result, cat);
        assert_eq!(print(&f.model, result), "Cat");
    }

    #[test]
    fn empty_set_is_bottom() {
        let mut f = Fixture::new();
        let result =
            find_best_common_covariant_non_function_type(&mut f.model, &[], None).unwrap();
        assert_eq!(print(&f.model, result), "Nil");
    }

    #[test]
    fn siblings_meet_at_their_parent() {
        let mut f = Fixture::new();
        let cat = f.class_ty(f.cat);
        let dog = f.class_ty(f.dog);
        let result = common(&mut f, &[cat, dog], true, false).unwrap();
        assert_eq!(print(&f.model, result), "Animal");
    }

    #[test]
    fn unrelated_types_meet_at_top() {
        let mut f = Fixture::new();
        let cat = f.class_ty(f.cat);
        let integer = f.class_ty(crate::model::ClassId::INTEGER);
        let result = common(&mut f, &[cat, integer], true, false).unwrap();
        assert_eq!(print(&f.model, result), "Any");
    }

    #[test]
    fn type_arguments_merge_recursively() {
        let mut f = Fixture::new();
        let cat = f.class_ty(f.cat);
        let list_of_cat = f.generic_ty(f.list, vec![cat]);
        let dog = f.class_ty(f.dog);
        let list_of_dog = f.generic_ty(f.list, vec![dog]);

        let result = common(&mut f, &[list_of_cat, list_of_dog], true, false).unwrap();
        assert_eq!(print(&f.model, result), "List<Animal>");
    }

    #[test]
    fn parameter_member_wins_over_concrete_types() {
        let mut f = Fixture::new();
        // A branch producing a concrete type or Z resolves to Z. The widened
        // result would be Any; downstream expectations encode Z.
        let z = f.param("Z");
        let cat = f.class_ty(f.cat);
        let result = common(&mut f, &[cat, z], true, false).unwrap();
        assert_eq!(print(&f.model, result), "Z");

        let z = f.param("Z");
        let integer = f.class_ty(crate::model::ClassId::INTEGER);
        let result = common(&mut f, &[z, integer], true, false).unwrap();
        assert_eq!(print(&f.model, result), "Z");
    }

    #[test]
    fn contravariant_picks_the_common_subtype() {
        let mut f = Fixture::new();
        let animal = f.class_ty(f.animal);
        let cat = f.class_ty(f.cat);
        let result = common(&mut f, &[animal, cat], false, false).unwrap();
        assert_eq!(print(&f.model, result), "Cat");

        // Siblings share no subtype but Bottom
        let cat = f.class_ty(f.cat);
        let dog = f.class_ty(f.dog);
        let result = common(&mut f, &[cat, dog], false, false).unwrap();
        assert_eq!(print(&f.model, result), "Nil");
    }

    #[test]
    fn contravariant_class_parameters_flip_the_merge_direction() {
        let mut f = Fixture::new();
        // Sink declares a contravariant parameter, so the common supertype
        // of Sink<Cat> and Sink<Dog> narrows the argument instead of widening
        let cat = f.class_ty(f.cat);
        let sink_of_cat = f.generic_ty(f.sink, vec![cat]);
        let dog = f.class_ty(f.dog);
        let sink_of_dog = f.generic_ty(f.sink, vec![dog]);

        let result = common(&mut f, &[sink_of_cat, sink_of_dog], true, false).unwrap();
        assert_eq!(print(&f.model, result), "Sink<Nil>");
    }

    #[test]
    fn function_set_synthesizes_a_unified_signature() {
        let mut f = Fixture::new();
        let cat = f.class_ty(f.cat);
        let animal = f.class_ty(f.animal);
        let take_cat = f.func(
            vec![(cat, Multiplicity::one())],
            animal,
            Multiplicity::one(),
        );
        let dog = f.class_ty(f.dog);
        let animal = f.class_ty(f.animal);
        let take_dog = f.func(
            vec![(dog, Multiplicity::zero_one())],
            animal,
            Multiplicity::one(),
        );

        let result = common(&mut f, &[take_cat, take_dog], true, true).unwrap();
        // Parameters merge contravariantly (Cat ∧ Dog = Nil), multiplicities
        // to their min-subsuming bound, returns covariantly
        assert_eq!(print(&f.model, result), "{Nil[0..1]->Animal[1]}");
    }

    #[test]
    fn mismatched_arities_return_the_sentinel() {
        let mut f = Fixture::new();
        let cat = f.class_ty(f.cat);
        let animal = f.class_ty(f.animal);
        let unary = f.func(vec![(cat, Multiplicity::one())], animal, Multiplicity::one());
        let animal = f.class_ty(f.animal);
        let nullary = f.func(vec![], animal, Multiplicity::one());

        let covariant = common(&mut f, &[unary, nullary], true, true).unwrap();
        assert_eq!(print(&f.model, covariant), "Any");

        let contravariant = common(&mut f, &[unary, nullary], false, true).unwrap();
        assert_eq!(print(&f.model, contravariant), "Nil");
    }

    #[test]
    fn span_relocation_applies_to_the_result() {
        let mut f = Fixture::new();
        let cat = f.class_ty(f.cat);
        let dog = f.class_ty(f.dog);
        let span = crate::span::Span::new(7, 12, 2, 1);
        let result = find_best_common_generic_type_with_span(
            &mut f.model,
            &[Some(cat), Some(dog)],
            true,
            false,
            Some(span),
        )
        .unwrap()
        .unwrap();
        assert_eq!(f.model.node(result).span(), Some(span));
    }
}
