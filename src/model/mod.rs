// src/model/mod.rs
//
// The metamodel façade: the class store, well-known classes, and node
// builders. The algebra components only consume this narrow query surface;
// the surrounding compiler owns everything else about class declarations.

pub mod concreteness;
pub mod hierarchy;
pub mod relation;

use crate::multiplicity::Multiplicity;
use crate::span::Span;
use crate::types::{
    Column, ConcreteType, FunctionSig, GenericId, GenericIdVec, MultiplicityVec, OpKind, Origin,
    ParamRef, RawType, RelationId, RelationShape, TypeGraph, TypeNode, TypeOperation,
};

/// Identity of a class declaration.
///
/// Low indices are reserved for the well-known classes and are guaranteed
/// to be registered at these positions by `Model::new()`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ClassId(u32);

impl ClassId {
    /// The top type: every type is a subtype of it
    pub const TOP: ClassId = ClassId(0);
    /// The bottom type: subtype of every type
    pub const BOTTOM: ClassId = ClassId(1);
    /// The nominal Function class; callables are its subtypes
    pub const FUNCTION: ClassId = ClassId(2);

    // Primitives
    pub const INTEGER: ClassId = ClassId(3);
    pub const FLOAT: ClassId = ClassId(4);
    pub const STRING: ClassId = ClassId(5);
    pub const BOOLEAN: ClassId = ClassId(6);
    pub const DATE: ClassId = ClassId(7);

    /// First non-reserved index
    pub const FIRST_DYNAMIC: u32 = 8;

    pub fn index(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_reserved(self) -> bool {
        self.0 < Self::FIRST_DYNAMIC
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Primitive,
    Top,
    Bottom,
}

/// A declared type parameter. Covariant unless flagged.
#[derive(Debug, Clone)]
pub struct TypeParamDecl {
    pub name: String,
    pub contravariant: bool,
}

impl TypeParamDecl {
    pub fn covariant(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contravariant: false,
        }
    }

    pub fn contravariant(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contravariant: true,
        }
    }
}

/// A class declaration: the binding template for instantiations of it.
#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: String,
    pub package: Vec<String>,
    pub kind: ClassKind,
    pub type_params: Vec<TypeParamDecl>,
    pub mult_params: Vec<String>,
    /// Declared value-level template variables (extended primitives only)
    pub type_variables: Vec<String>,
    /// Instantiations of the direct superclasses, in declaration order.
    /// Their type arguments may reference this class's own parameters.
    pub generalizations: Vec<GenericId>,
}

impl ClassDef {
    pub fn named(name: impl Into<String>, package: &[&str]) -> Self {
        Self {
            name: name.into(),
            package: package.iter().map(|s| s.to_string()).collect(),
            kind: ClassKind::Class,
            type_params: Vec::new(),
            mult_params: Vec::new(),
            type_variables: Vec::new(),
            generalizations: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_type_params(mut self, params: Vec<TypeParamDecl>) -> Self {
        self.type_params = params;
        self
    }

    pub fn with_mult_params(mut self, params: Vec<&str>) -> Self {
        self.mult_params = params.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_type_variables(mut self, vars: Vec<&str>) -> Self {
        self.type_variables = vars.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Fully-qualified path, `::`-separated.
    pub fn path(&self) -> String {
        let mut out = String::new();
        for segment in &self.package {
            out.push_str(segment);
            out.push_str("::");
        }
        out.push_str(&self.name);
        out
    }
}

pub const DEFAULT_MAX_TYPE_DEPTH: usize = 512;

/// The class table plus the type-expression graph, with the recursion limit
/// the engine enforces while walking it.
#[derive(Debug)]
pub struct Model {
    classes: Vec<ClassDef>,
    pub graph: TypeGraph,
    max_type_depth: usize,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Create a model with the well-known classes pre-registered at their
    /// reserved indices.
    pub fn new() -> Self {
        let mut model = Self {
            classes: Vec::new(),
            graph: TypeGraph::new(),
            max_type_depth: DEFAULT_MAX_TYPE_DEPTH,
        };

        // Registration order must match the ClassId constants.
        let top = model.add_class(ClassDef::named("Any", &["tessera"]).with_kind(ClassKind::Top));
        debug_assert_eq!(top, ClassId::TOP);
        let bottom =
            model.add_class(ClassDef::named("Nil", &["tessera"]).with_kind(ClassKind::Bottom));
        debug_assert_eq!(bottom, ClassId::BOTTOM);
        let function = model.add_class(
            ClassDef::named("Function", &["tessera"])
                .with_type_params(vec![TypeParamDecl::covariant("T")]),
        );
        debug_assert_eq!(function, ClassId::FUNCTION);

        let integer = model
            .add_class(ClassDef::named("Integer", &["tessera"]).with_kind(ClassKind::Primitive));
        debug_assert_eq!(integer, ClassId::INTEGER);
        let float =
            model.add_class(ClassDef::named("Float", &["tessera"]).with_kind(ClassKind::Primitive));
        debug_assert_eq!(float, ClassId::FLOAT);
        let string = model
            .add_class(ClassDef::named("String", &["tessera"]).with_kind(ClassKind::Primitive));
        debug_assert_eq!(string, ClassId::STRING);
        let boolean = model
            .add_class(ClassDef::named("Boolean", &["tessera"]).with_kind(ClassKind::Primitive));
        debug_assert_eq!(boolean, ClassId::BOOLEAN);
        let date =
            model.add_class(ClassDef::named("Date", &["tessera"]).with_kind(ClassKind::Primitive));
        debug_assert_eq!(date, ClassId::DATE);

        model
    }

    pub fn with_max_type_depth(mut self, depth: usize) -> Self {
        self.max_type_depth = depth;
        self
    }

    pub fn max_type_depth(&self) -> usize {
        self.max_type_depth
    }

    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(def);
        id
    }

    pub fn class(&self, id: ClassId) -> &ClassDef {
        &self.classes[id.0 as usize]
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Attach a direct superclass instantiation to a class.
    pub fn add_generalization(&mut self, class: ClassId, generalization: GenericId) {
        self.classes[class.0 as usize]
            .generalizations
            .push(generalization);
    }

    pub fn node(&self, id: GenericId) -> &TypeNode {
        self.graph.node(id)
    }

    /// The raw type of a type expression, or None for a bare parameter
    /// reference or an unresolved operation.
    pub fn raw_type_of(&self, id: GenericId) -> Option<RawType> {
        self.node(id).as_concrete().map(|c| c.raw)
    }

    pub fn raw_is_top(&self, raw: RawType) -> bool {
        matches!(raw, RawType::Class(c) if self.class(c).kind == ClassKind::Top)
    }

    pub fn raw_is_bottom(&self, raw: RawType) -> bool {
        matches!(raw, RawType::Class(c) if self.class(c).kind == ClassKind::Bottom)
    }

    // ========================================================================
    // Node builders - side-effect-free constructors returning fresh nodes
    // ========================================================================

    pub fn new_concrete(
        &mut self,
        raw: RawType,
        type_args: impl Into<GenericIdVec>,
        mult_args: impl Into<MultiplicityVec>,
        span: Option<Span>,
        origin: Origin,
    ) -> GenericId {
        self.graph.alloc(TypeNode::Concrete(ConcreteType {
            raw,
            type_args: type_args.into(),
            mult_args: mult_args.into(),
            variable_values: Vec::new(),
            span,
            origin,
        }))
    }

    /// Wrap a class as an argument-free concrete type expression. Used for
    /// engine-synthesized wrappers (sentinels, walk targets), so the node is
    /// tagged as inferred.
    pub fn wrap_class(&mut self, class: ClassId) -> GenericId {
        self.new_concrete(
            RawType::Class(class),
            GenericIdVec::new(),
            MultiplicityVec::new(),
            None,
            Origin::Inferred,
        )
    }

    pub fn new_parameter(
        &mut self,
        name: impl Into<String>,
        contravariant: bool,
        span: Option<Span>,
        origin: Origin,
    ) -> GenericId {
        self.graph.alloc(TypeNode::Parameter(ParamRef {
            name: name.into(),
            contravariant,
            lower_bound: None,
            upper_bound: None,
            span,
            origin,
        }))
    }

    pub fn new_operation(
        &mut self,
        op: OpKind,
        left: GenericId,
        right: GenericId,
        span: Option<Span>,
        origin: Origin,
    ) -> GenericId {
        self.graph.alloc(TypeNode::Operation(TypeOperation {
            op,
            left,
            right,
            span,
            origin,
        }))
    }

    pub fn new_function_sig(&mut self, sig: FunctionSig) -> RawType {
        RawType::Function(self.graph.alloc_function_sig(sig))
    }

    pub fn new_relation(&mut self, columns: Vec<Column>, span: Option<Span>) -> RelationId {
        self.graph.alloc_relation(RelationShape { columns, span })
    }

    /// Multiplicity arguments of a concrete type expression (empty otherwise).
    pub fn mult_args_of(&self, id: GenericId) -> &[Multiplicity] {
        self.node(id)
            .as_concrete()
            .map(|c| c.mult_args.as_slice())
            .unwrap_or(&[])
    }

    /// Type arguments of a concrete type expression (empty otherwise).
    pub fn type_args_of(&self, id: GenericId) -> &[GenericId] {
        self.node(id)
            .as_concrete()
            .map(|c| c.type_args.as_slice())
            .unwrap_or(&[])
    }
}
