// src/inheritance.rs
//
// Walking the generalization tree from a source instantiation to a target
// class, composing parameter bindings along each path. When a diamond lets
// two paths reach the same target, their bindings must agree up to
// compatibility or compilation fails.

use rustc_hash::FxHashMap;

use crate::binding::{
    MultBindings, TypeBindings, bind_multiplicity_parameters, bind_type_parameters,
};
use crate::compat::compatible_impl;
use crate::concretize::{concretize_node, make_type_argument_as_concrete_as_possible};
use crate::errors::{Result, TypeAlgebraError};
use crate::model::{ClassId, ClassKind, Model};
use crate::multiplicity::Multiplicity;
use crate::printer;
use crate::span::to_source_span;
use crate::types::{FunctionSigId, GenericId, RawType, TypeNode};

/// A target instantiation found in the inheritance tree, with the target's
/// parameters bound to arguments as seen from the source.
#[derive(Debug, Clone)]
pub struct BoundTypeArguments {
    pub generic: GenericId,
    pub arguments: FxHashMap<String, GenericId>,
}

impl BoundTypeArguments {
    pub fn argument(&self, param: &str) -> Option<GenericId> {
        self.arguments.get(param).copied()
    }
}

/// Multiplicity-parameter counterpart of [`BoundTypeArguments`].
#[derive(Debug, Clone)]
pub struct BoundMultiplicityArguments {
    pub generic: GenericId,
    pub arguments: FxHashMap<String, Multiplicity>,
}

/// Resolve the type-parameter bindings of `target`'s class as seen from the
/// `source` instantiation, walking every inheritance path. Returns None when
/// the target is not an ancestor (or self) of the source's class.
///
/// When several paths reach the target, every pair of resolved bindings is
/// checked for mutual compatibility; a mismatch is a fatal
/// `DiamondInheritanceConflict`.
pub fn resolve_class_type_params_via_inheritance(
    model: &mut Model,
    source: GenericId,
    target: GenericId,
) -> Result<Option<BoundTypeArguments>> {
    let Some(target_raw) = model.raw_type_of(target) else {
        return Ok(None);
    };
    tracing::debug!(
        source = %printer::print(model, source),
        target = %printer::print(model, target),
        "resolving class type parameters through the inheritance tree"
    );

    let type_bindings =
        bind_type_parameters(model, source, &TypeBindings::default(), &MultBindings::default())?;
    let mult_bindings =
        bind_multiplicity_parameters(model, source, &MultBindings::default())?;

    let mut results = Vec::new();
    walk_type_arguments(
        model,
        source,
        type_bindings,
        mult_bindings,
        target_raw,
        &mut results,
        0,
    )?;

    if results.len() > 1 {
        for i in 0..results.len() {
            for j in 0..results.len() {
                if i != j {
                    check_found_bindings(model, &results[i], &results[j], source, target)?;
                }
            }
        }
    }
    Ok(results.into_iter().next())
}

fn walk_type_arguments(
    model: &mut Model,
    current: GenericId,
    type_bindings: TypeBindings,
    mult_bindings: MultBindings,
    target_raw: RawType,
    results: &mut Vec<BoundTypeArguments>,
    depth: usize,
) -> Result<()> {
    if depth > model.max_type_depth() {
        return Err(TypeAlgebraError::TypeGraphTooDeep {
            type_expr: printer::print(model, current),
            span: to_source_span(model.node(current).span()),
        });
    }
    let Some(raw) = model.raw_type_of(current) else {
        return Ok(());
    };
    if raw == target_raw {
        results.push(BoundTypeArguments {
            generic: current,
            arguments: type_bindings,
        });
        return Ok(());
    }
    let RawType::Class(class_id) = raw else {
        return Ok(());
    };
    let generalizations = model.class(class_id).generalizations.clone();
    for generalization in generalizations {
        // The generalization's arguments reference the current class's own
        // parameters; rebind them from the current instantiation first.
        let resolved = concretize_node(model, generalization, &type_bindings, &mult_bindings, 0)?;
        let next_types = bind_type_parameters(model, resolved, &type_bindings, &mult_bindings)?;
        let next_mults = bind_multiplicity_parameters(model, resolved, &mult_bindings)?;
        walk_type_arguments(
            model,
            resolved,
            next_types,
            next_mults,
            target_raw,
            results,
            depth + 1,
        )?;
    }
    Ok(())
}

fn check_found_bindings(
    model: &mut Model,
    first: &BoundTypeArguments,
    second: &BoundTypeArguments,
    source: GenericId,
    target: GenericId,
) -> Result<()> {
    let mut first_params: Vec<&String> = first.arguments.keys().collect();
    let mut second_params: Vec<&String> = second.arguments.keys().collect();
    first_params.sort();
    second_params.sort();
    if first_params != second_params {
        return Err(TypeAlgebraError::UnresolvableOperation {
            detail: format!(
                "inconsistent parameter sets resolved through inheritance: {first_params:?} / {second_params:?}"
            ),
        });
    }

    for (param, &g1) in &first.arguments {
        let g2 = second.arguments[param];
        if !compatible_impl(model, g1, g2, true, 0)? {
            return Err(TypeAlgebraError::DiamondInheritanceConflict {
                first: printer::print(model, g1),
                second: printer::print(model, g2),
                from_type: printer::print(model, source),
                to_type: printer::print(model, target),
                span: to_source_span(model.node(source).span()),
            });
        }
    }
    Ok(())
}

/// Resolve the multiplicity-parameter bindings of the target raw type as
/// seen from the `source` instantiation. No diamond check is applied here.
pub fn resolve_class_mult_params_via_inheritance(
    model: &mut Model,
    source: GenericId,
    target_raw: RawType,
) -> Result<Option<BoundMultiplicityArguments>> {
    let mult_bindings = bind_multiplicity_parameters(model, source, &MultBindings::default())?;
    let mut results = Vec::new();
    walk_mult_arguments(model, source, mult_bindings, target_raw, &mut results, 0)?;
    Ok(results.into_iter().next())
}

fn walk_mult_arguments(
    model: &mut Model,
    current: GenericId,
    mult_bindings: MultBindings,
    target_raw: RawType,
    results: &mut Vec<BoundMultiplicityArguments>,
    depth: usize,
) -> Result<()> {
    if depth > model.max_type_depth() {
        return Err(TypeAlgebraError::TypeGraphTooDeep {
            type_expr: printer::print(model, current),
            span: to_source_span(model.node(current).span()),
        });
    }
    let Some(raw) = model.raw_type_of(current) else {
        return Ok(());
    };
    if raw == target_raw {
        results.push(BoundMultiplicityArguments {
            generic: current,
            arguments: mult_bindings,
        });
        return Ok(());
    }
    let RawType::Class(class_id) = raw else {
        return Ok(());
    };
    let generalizations = model.class(class_id).generalizations.clone();
    for generalization in generalizations {
        let resolved = concretize_node(
            model,
            generalization,
            &TypeBindings::default(),
            &mult_bindings,
            0,
        )?;
        let next_mults = bind_multiplicity_parameters(model, resolved, &mult_bindings)?;
        walk_mult_arguments(model, resolved, next_mults, target_raw, results, depth + 1)?;
    }
    Ok(())
}

/// Concretize `value` under the parameter bindings of the `owner`
/// instantiation.
pub fn reprocess_type_parameters_using_owner_context(
    model: &mut Model,
    owner: GenericId,
    value: Option<GenericId>,
) -> Result<Option<GenericId>> {
    let type_bindings =
        bind_type_parameters(model, owner, &TypeBindings::default(), &MultBindings::default())?;
    let mult_bindings = bind_multiplicity_parameters(model, owner, &MultBindings::default())?;
    make_type_argument_as_concrete_as_possible(model, value, &type_bindings, &mult_bindings)
}

/// Resolve a property's declared return type in the context of an owning
/// class instantiation. A non-concrete return is first resolved by walking
/// from the instantiation to the property's owner (the first parameter of
/// its signature), then reprocessed under the owner's bindings.
pub fn resolve_property_return_type(
    model: &mut Model,
    class_generic: GenericId,
    property_sig: FunctionSigId,
) -> Result<Option<GenericId>> {
    let sig = model.graph.function_sig(property_sig).clone();
    let mut return_type = sig.ret;
    if let Some(ret) = return_type
        && !model.node(ret).is_concrete()
    {
        let owner = sig.params.first().and_then(|p| p.ty);
        let param_name = match model.node(ret) {
            TypeNode::Parameter(p) => Some(p.name.clone()),
            _ => None,
        };
        if let (Some(owner), Some(param_name)) = (owner, param_name)
            && let Some(resolved) =
                resolve_class_type_params_via_inheritance(model, class_generic, owner)?
        {
            return_type = resolved.argument(&param_name);
        }
    }
    reprocess_type_parameters_using_owner_context(model, class_generic, return_type)
}

/// Extract the underlying function signature of any `Function`-subtype
/// instantiation. Bottom short-circuits to None; a Top or non-function
/// binding of the signature parameter yields None (the erased
/// `Function<Any>` case); an instantiation that cannot reach `Function` at
/// all is a compilation error.
pub fn resolve_function_generic_type(
    model: &mut Model,
    generic: GenericId,
) -> Result<Option<FunctionSigId>> {
    if let Some(raw) = model.raw_type_of(generic)
        && model.raw_is_bottom(raw)
    {
        return Ok(None);
    }
    let function_target = model.wrap_class(ClassId::FUNCTION);
    let Some(resolved) =
        resolve_class_type_params_via_inheritance(model, generic, function_target)?
    else {
        return Err(TypeAlgebraError::UnresolvedFunctionType {
            type_expr: printer::print(model, generic),
            span: to_source_span(model.node(generic).span()),
        });
    };
    let Some(bound) = resolved.argument("T") else {
        return Ok(None);
    };
    match model.raw_type_of(bound) {
        Some(raw) if !model.raw_is_top(raw) => Ok(raw.as_function()),
        _ => Ok(None),
    }
}

/// Every supertype of the instantiation including itself, in linearization
/// order, each with its arguments as seen from the instantiation.
pub fn all_super_types_including_self(
    model: &mut Model,
    generic: GenericId,
) -> Result<Vec<GenericId>> {
    let mut result = vec![generic];
    let Some(RawType::Class(class_id)) = model.raw_type_of(generic) else {
        return Ok(result);
    };
    for ancestor in model.linearization(class_id).into_iter().skip(1) {
        let target = model.wrap_class(ancestor);
        if let Some(resolved) = resolve_class_type_params_via_inheritance(model, generic, target)? {
            result.push(resolved.generic);
        }
    }
    Ok(result)
}

/// Recursive probe for extended primitives (value-parameterized types like
/// sized decimals) anywhere in the expression's raw type or type arguments.
pub fn contains_extended_primitive_types(model: &Model, generic: GenericId) -> bool {
    let Some(concrete) = model.node(generic).as_concrete() else {
        return false;
    };
    if let RawType::Class(class_id) = concrete.raw {
        let def = model.class(class_id);
        if def.kind == ClassKind::Primitive && !def.type_variables.is_empty() {
            return true;
        }
    }
    concrete
        .type_args
        .iter()
        .any(|&arg| contains_extended_primitive_types(model, arg))
}
