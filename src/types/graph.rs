// src/types/graph.rs
//
// Append-only arena for type-expression nodes, with u32 handles.
//
// Unlike an interning arena, structurally-equal nodes keep distinct handles:
// the concretization engine's self-substitution cycle guard relies on
// reference identity, which here is handle equality. Nodes are immutable
// after allocation; every "mutation" allocates a new node.

use crate::errors::{Result, TypeAlgebraError};
use crate::types::{FunctionSig, OpKind, RelationShape, TypeNode};

/// Handle to a type-expression node in the graph.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct GenericId(pub(crate) u32);

impl GenericId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Handle to an ad-hoc function signature.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct FunctionSigId(pub(crate) u32);

impl FunctionSigId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Handle to a tabular (relation) shape.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct RelationId(pub(crate) u32);

impl RelationId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// The node arena, plus side arenas for the two composite raw-type shapes
/// that are synthesized ad hoc and compared structurally.
#[derive(Default)]
pub struct TypeGraph {
    nodes: Vec<TypeNode>,
    function_sigs: Vec<FunctionSig>,
    relations: Vec<RelationShape>,
}

impl std::fmt::Debug for TypeGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeGraph")
            .field("node_count", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: TypeNode) -> GenericId {
        let id = GenericId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: GenericId) -> &TypeNode {
        &self.nodes[id.0 as usize]
    }

    pub fn alloc_function_sig(&mut self, sig: FunctionSig) -> FunctionSigId {
        let id = FunctionSigId(self.function_sigs.len() as u32);
        self.function_sigs.push(sig);
        id
    }

    pub fn function_sig(&self, id: FunctionSigId) -> &FunctionSig {
        &self.function_sigs[id.0 as usize]
    }

    pub fn alloc_relation(&mut self, shape: RelationShape) -> RelationId {
        let id = RelationId(self.relations.len() as u32);
        self.relations.push(shape);
        id
    }

    pub fn relation(&self, id: RelationId) -> &RelationShape {
        &self.relations[id.0 as usize]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The left operand of a Subset operation; errors on any other node kind.
    pub fn subset_left(&self, id: GenericId) -> Result<GenericId> {
        match self.node(id) {
            TypeNode::Operation(op) if op.op == OpKind::Subset => Ok(op.left),
            _ => Err(TypeAlgebraError::NotAnOperation { expected: "Subset" }),
        }
    }

    /// The right operand of a Subset operation — the set the left side is
    /// constrained to be drawn from.
    pub fn subset_right(&self, id: GenericId) -> Result<GenericId> {
        match self.node(id) {
            TypeNode::Operation(op) if op.op == OpKind::Subset => Ok(op.right),
            _ => Err(TypeAlgebraError::NotAnOperation { expected: "Subset" }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Origin, ParamRef, TypeOperation};

    fn param(name: &str) -> TypeNode {
        TypeNode::Parameter(ParamRef {
            name: name.to_string(),
            contravariant: false,
            lower_bound: None,
            upper_bound: None,
            span: None,
            origin: Origin::UserWritten,
        })
    }

    #[test]
    fn alloc_does_not_dedupe() {
        let mut graph = TypeGraph::new();
        let a = graph.alloc(param("T"));
        let b = graph.alloc(param("T"));
        // Identity is handle equality; structurally equal nodes stay distinct
        assert_ne!(a, b);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn subset_accessors() {
        let mut graph = TypeGraph::new();
        let left = graph.alloc(param("T"));
        let right = graph.alloc(param("U"));
        let subset = graph.alloc(TypeNode::Operation(TypeOperation {
            op: OpKind::Subset,
            left,
            right,
            span: None,
            origin: Origin::UserWritten,
        }));
        let union = graph.alloc(TypeNode::Operation(TypeOperation {
            op: OpKind::Union,
            left,
            right,
            span: None,
            origin: Origin::UserWritten,
        }));

        assert_eq!(graph.subset_left(subset).unwrap(), left);
        assert_eq!(graph.subset_right(subset).unwrap(), right);
        assert!(graph.subset_left(union).is_err());
        assert!(graph.subset_right(left).is_err());
    }
}
