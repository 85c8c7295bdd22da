// src/model/concreteness.rs
//
// Concreteness and definedness probes over type expressions. "Concrete"
// means the expression has a raw type; a concrete expression may still have
// non-concrete arguments, which is what the recursive variants check.

use crate::model::Model;
use crate::types::{GenericId, RawType, TypeNode};

impl Model {
    /// Whether all the expression's type arguments are concrete. Not
    /// recursive: the arguments' own arguments are not checked.
    pub fn has_concrete_type_arguments(&self, id: GenericId) -> bool {
        self.type_args_of(id)
            .iter()
            .all(|&arg| self.node(arg).is_concrete())
    }

    /// Whether all the expression's type arguments are fully concrete,
    /// recursively. The expression's own multiplicity arguments are not
    /// checked.
    pub fn has_fully_concrete_type_arguments(
        &self,
        id: GenericId,
        check_function_types: bool,
    ) -> bool {
        self.type_args_of(id)
            .iter()
            .all(|&arg| self.is_fully_concrete(arg, check_function_types))
    }

    /// Whether all the expression's multiplicity arguments are concrete.
    pub fn has_concrete_multiplicity_arguments(&self, id: GenericId) -> bool {
        self.mult_args_of(id).iter().all(|m| m.is_concrete())
    }

    /// Whether the expression is fully concrete: it has a raw type, all of
    /// its type arguments are fully concrete, and all of its multiplicity
    /// arguments are concrete. With `check_function_types`, function-type
    /// raws must themselves be fully concrete; relation shapes always are
    /// checked.
    pub fn is_fully_concrete(&self, id: GenericId, check_function_types: bool) -> bool {
        let Some(concrete) = self.node(id).as_concrete() else {
            return false;
        };
        match concrete.raw {
            RawType::Function(sig) if check_function_types => {
                let sig = self.graph.function_sig(sig);
                let params_ok = sig.params.iter().all(|p| {
                    p.ty
                        .is_some_and(|t| self.is_fully_concrete(t, check_function_types))
                        && p.mult.as_ref().is_some_and(|m| m.is_concrete())
                });
                if !params_ok
                    || !sig
                        .ret
                        .is_some_and(|r| self.is_fully_concrete(r, check_function_types))
                    || !sig.ret_mult.as_ref().is_some_and(|m| m.is_concrete())
                {
                    return false;
                }
            }
            RawType::Relation(rel) => {
                let shape = self.graph.relation(rel);
                let columns_ok = shape.columns.iter().all(|c| {
                    c.ty
                        .is_some_and(|t| self.is_fully_concrete(t, check_function_types))
                });
                if !columns_ok {
                    return false;
                }
            }
            _ => {}
        }
        self.has_concrete_multiplicity_arguments(id)
            && self.has_fully_concrete_type_arguments(id, check_function_types)
    }

    /// Whether every constituent part of the expression has been filled in,
    /// concretely or not. A bare parameter reference is fully defined; a
    /// function type with a missing parameter or return type is not.
    pub fn is_fully_defined(&self, id: GenericId) -> bool {
        match self.node(id) {
            TypeNode::Parameter(_) => true,
            TypeNode::Operation(op) => {
                self.is_fully_defined(op.left) && self.is_fully_defined(op.right)
            }
            TypeNode::Concrete(concrete) => {
                match concrete.raw {
                    RawType::Function(sig) => {
                        let sig = self.graph.function_sig(sig);
                        let params_ok = sig.params.iter().all(|p| {
                            p.ty.is_some_and(|t| self.is_fully_defined(t)) && p.mult.is_some()
                        });
                        if !params_ok
                            || !sig.ret.is_some_and(|r| self.is_fully_defined(r))
                            || sig.ret_mult.is_none()
                        {
                            return false;
                        }
                    }
                    RawType::Relation(rel) => {
                        let shape = self.graph.relation(rel);
                        let columns_ok = shape
                            .columns
                            .iter()
                            .all(|c| c.ty.is_some_and(|t| self.is_fully_defined(t)));
                        if !columns_ok {
                            return false;
                        }
                    }
                    RawType::Class(_) => {}
                }
                concrete
                    .type_args
                    .iter()
                    .all(|&arg| self.is_fully_defined(arg))
            }
        }
    }
}
