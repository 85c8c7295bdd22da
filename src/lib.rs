// src/lib.rs
pub mod binding;
pub mod common;
pub mod compat;
pub mod concretize;
pub mod copy;
pub mod errors;
pub mod inheritance;
pub mod model;
pub mod multiplicity;
pub mod printer;
pub mod span;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use binding::{MultBindings, TypeBindings, bind_multiplicity_parameters, bind_type_parameters};
pub use common::{
    find_best_common_covariant_non_function_type, find_best_common_generic_type,
    find_best_common_generic_type_with_span,
};
pub use compat::{generic_types_equal, is_generic_compatible_with, sub_type_of};
pub use concretize::make_type_argument_as_concrete_as_possible;
pub use copy::{
    copy_as_inferred, copy_as_inferred_with_span, copy_generic_type, copy_generic_type_with_span,
};
pub use errors::{Result, TypeAlgebraError};
pub use inheritance::{
    BoundMultiplicityArguments, BoundTypeArguments, all_super_types_including_self,
    contains_extended_primitive_types, resolve_class_mult_params_via_inheritance,
    resolve_class_type_params_via_inheritance, resolve_function_generic_type,
    resolve_property_return_type, reprocess_type_parameters_using_owner_context,
};
pub use model::{ClassDef, ClassId, ClassKind, Model, TypeParamDecl};
pub use multiplicity::{Multiplicity, min_subsuming_multiplicity, multiplicities_equal};
pub use printer::{print, print_full_paths};
