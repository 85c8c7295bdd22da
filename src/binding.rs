// src/binding.rs
//
// Type/multiplicity parameter binding: given a concrete instantiation,
// build the mapping from each declared parameter name to its bound
// argument, concretized under an outer substitution so bindings compose
// through nested parameterization.

use rustc_hash::FxHashMap;

use crate::concretize::make_type_argument_as_concrete_as_possible;
use crate::errors::{Result, TypeAlgebraError};
use crate::model::Model;
use crate::multiplicity::Multiplicity;
use crate::printer;
use crate::span::to_source_span;
use crate::types::{GenericId, RawType};

/// Substitution environment for type parameters.
pub type TypeBindings = FxHashMap<String, GenericId>;

/// Substitution environment for multiplicity parameters.
pub type MultBindings = FxHashMap<String, Multiplicity>;

/// Bind a concrete instantiation's type parameters to its type arguments.
///
/// A bare parameter reference has nothing to bind and yields an empty map.
/// Each bound value is concretized under the supplied outer environments.
pub fn bind_type_parameters(
    model: &mut Model,
    generic: GenericId,
    source_binding: &TypeBindings,
    source_mult_binding: &MultBindings,
) -> Result<TypeBindings> {
    let Some(concrete) = model.node(generic).as_concrete().cloned() else {
        return Ok(TypeBindings::default());
    };
    // Ad-hoc function signatures and relation shapes declare no parameters
    let RawType::Class(class_id) = concrete.raw else {
        return Ok(TypeBindings::default());
    };

    let declared = model.class(class_id).type_params.clone();
    if declared.len() != concrete.type_args.len() {
        return Err(TypeAlgebraError::TypeArgumentCountMismatch {
            path: model.class(class_id).path(),
            instantiation: printer::print(model, generic),
            span: to_source_span(concrete.span),
        });
    }

    let mut result = TypeBindings::default();
    for (param, &arg) in declared.iter().zip(concrete.type_args.iter()) {
        if let Some(bound) = make_type_argument_as_concrete_as_possible(
            model,
            Some(arg),
            source_binding,
            source_mult_binding,
        )? {
            result.insert(param.name.clone(), bound);
        }
    }
    Ok(result)
}

/// Bind a concrete instantiation's multiplicity parameters to its
/// multiplicity arguments, substituted under the outer environment.
pub fn bind_multiplicity_parameters(
    model: &mut Model,
    generic: GenericId,
    source_binding: &MultBindings,
) -> Result<MultBindings> {
    let Some(concrete) = model.node(generic).as_concrete().cloned() else {
        return Ok(MultBindings::default());
    };
    let RawType::Class(class_id) = concrete.raw else {
        return Ok(MultBindings::default());
    };

    let declared = model.class(class_id).mult_params.clone();
    if declared.len() != concrete.mult_args.len() {
        return Err(TypeAlgebraError::MultiplicityArgumentCountMismatch {
            path: model.class(class_id).path(),
            instantiation: printer::print(model, generic),
            span: to_source_span(concrete.span),
        });
    }

    let mut result = MultBindings::default();
    for (name, mult) in declared.iter().zip(concrete.mult_args.iter()) {
        result.insert(name.clone(), mult.substitute(source_binding));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixture;
    use crate::model::ClassId;
    use crate::printer::print;

    #[test]
    fn binding_round_trip() {
        let mut f = Fixture::new();
        let integer = f.class_ty(ClassId::INTEGER);
        let list = f.generic_ty(f.list, vec![integer]);

        let bindings = bind_type_parameters(
            &mut f.model,
            list,
            &TypeBindings::default(),
            &MultBindings::default(),
        )
        .unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(print(&f.model, bindings["T"]), "Integer");
    }

    #[test]
    fn bare_parameter_binds_nothing() {
        let mut f = Fixture::new();
        let t = f.param("T");
        let bindings = bind_type_parameters(
            &mut f.model,
            t,
            &TypeBindings::default(),
            &MultBindings::default(),
        )
        .unwrap();
        assert!(bindings.is_empty());
    }

    #[test]
    fn nested_bindings_compose() {
        let mut f = Fixture::new();
        // List<List<T>> bound under {T -> Integer} must yield {T -> List<Integer>}
        let t = f.param("T");
        let inner = f.generic_ty(f.list, vec![t]);
        let outer = f.generic_ty(f.list, vec![inner]);

        let mut env = TypeBindings::default();
        let integer = f.class_ty(ClassId::INTEGER);
        env.insert("T".to_string(), integer);

        let bindings =
            bind_type_parameters(&mut f.model, outer, &env, &MultBindings::default()).unwrap();
        assert_eq!(print(&f.model, bindings["T"]), "List<Integer>");
    }

    #[test]
    fn argument_count_mismatch_is_deterministic() {
        let mut f = Fixture::new();
        let integer = f.class_ty(ClassId::INTEGER);
        let string = f.class_ty(ClassId::STRING);
        // List declares one parameter; give it two arguments
        let bad = f.generic_ty(f.list, vec![integer, string]);

        let err = bind_type_parameters(
            &mut f.model,
            bad,
            &TypeBindings::default(),
            &MultBindings::default(),
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("app::collections::List"), "{message}");
        assert!(message.contains("List<Integer, String>"), "{message}");
    }

    #[test]
    fn multiplicity_binding_substitutes_outer_parameters() {
        let mut f = Fixture::new();
        let integer = f.class_ty(ClassId::INTEGER);
        let col = f.generic_ty_m(f.col, vec![integer], vec![Multiplicity::parameter("n")]);

        let mut outer = MultBindings::default();
        outer.insert("n".to_string(), Multiplicity::zero_one());

        let bindings = bind_multiplicity_parameters(&mut f.model, col, &outer).unwrap();
        assert_eq!(bindings["m"], Multiplicity::zero_one());
    }

    #[test]
    fn multiplicity_count_mismatch_fails() {
        let mut f = Fixture::new();
        let integer = f.class_ty(ClassId::INTEGER);
        // Col declares one multiplicity parameter; give it none
        let bad = f.generic_ty(f.col, vec![integer]);
        let err = bind_multiplicity_parameters(&mut f.model, bad, &MultBindings::default())
            .unwrap_err();
        assert!(matches!(
            err,
            TypeAlgebraError::MultiplicityArgumentCountMismatch { .. }
        ));
    }
}
