// src/fixtures.rs
//
// Shared test universe: a small class hierarchy plus node-building helpers
// used by the unit tests across the crate.

use smallvec::SmallVec;

use crate::model::{ClassDef, ClassId, ClassKind, Model, TypeParamDecl};
use crate::multiplicity::Multiplicity;
use crate::span::Span;
use crate::types::{
    Column, ConcreteType, FunctionParam, FunctionSig, FunctionSigId, GenericId, GenericIdVec,
    MultiplicityVec, Origin, RawType, TypeNode, VariableValue,
};

pub(crate) struct Fixture {
    pub model: Model,
    pub animal: ClassId,
    pub cat: ClassId,
    pub dog: ClassId,
    pub siamese: ClassId,
    pub list: ClassId,
    pub pair: ClassId,
    pub col: ClassId,
    pub sink: ClassId,
    pub property: ClassId,
    pub decimal: ClassId,
    pub last_diamond_apex: ClassId,
}

impl Fixture {
    pub fn new() -> Self {
        let mut model = Model::new();

        let animal = model.add_class(ClassDef::named("Animal", &["app", "zoo"]));
        let cat = model.add_class(ClassDef::named("Cat", &["app", "zoo"]));
        let dog = model.add_class(ClassDef::named("Dog", &["app", "zoo"]));
        let siamese = model.add_class(ClassDef::named("Siamese", &["app", "zoo"]));
        let list = model.add_class(
            ClassDef::named("List", &["app", "collections"])
                .with_type_params(vec![TypeParamDecl::covariant("T")]),
        );
        let pair = model.add_class(ClassDef::named("Pair", &["app"]).with_type_params(vec![
            TypeParamDecl::covariant("T"),
            TypeParamDecl::covariant("U"),
        ]));
        let col = model.add_class(
            ClassDef::named("Col", &["app", "collections"])
                .with_type_params(vec![TypeParamDecl::covariant("T")])
                .with_mult_params(vec!["m"]),
        );
        let sink = model.add_class(
            ClassDef::named("Sink", &["app"])
                .with_type_params(vec![TypeParamDecl::contravariant("T")]),
        );
        let property = model.add_class(
            ClassDef::named("Property", &["app"])
                .with_type_params(vec![TypeParamDecl::covariant("T")]),
        );
        let decimal = model.add_class(
            ClassDef::named("Decimal", &["tessera"])
                .with_kind(ClassKind::Primitive)
                .with_type_variables(vec!["precision", "scale"]),
        );

        let mut fixture = Self {
            model,
            animal,
            cat,
            dog,
            siamese,
            list,
            pair,
            col,
            sink,
            property,
            decimal,
            last_diamond_apex: ClassId::TOP,
        };

        let top = fixture.class_ty(ClassId::TOP);
        fixture.model.add_generalization(animal, top);
        let animal_ty = fixture.class_ty(animal);
        fixture.model.add_generalization(cat, animal_ty);
        let animal_ty = fixture.class_ty(animal);
        fixture.model.add_generalization(dog, animal_ty);
        let cat_ty = fixture.class_ty(cat);
        fixture.model.add_generalization(siamese, cat_ty);

        // Property<T> is a callable: it extends Function<T>
        let t = fixture.param("T");
        let function_of_t = fixture.generic_ty(ClassId::FUNCTION, vec![t]);
        fixture.model.add_generalization(property, function_of_t);

        fixture
    }

    pub fn add_plain_class(&mut self, name: &str, package: &[&str]) -> ClassId {
        self.model.add_class(ClassDef::named(name, package))
    }

    /// Build a diamond: Apex<T>; two intermediate classes bind T to the two
    /// named primitives; a join class extends both intermediates.
    pub fn add_diamond(&mut self, left_arg: &str, right_arg: &str) -> (ClassId, ClassId) {
        let apex = self.model.add_class(
            ClassDef::named("Box", &["app"]).with_type_params(vec![TypeParamDecl::covariant("T")]),
        );
        let left = self.add_plain_class("DiamondLeft", &["app"]);
        let right = self.add_plain_class("DiamondRight", &["app"]);
        let join = self.add_plain_class("DiamondJoin", &["app"]);

        let left_binding = self.class_ty(Self::primitive_by_name(left_arg));
        let apex_left = self.generic_ty(apex, vec![left_binding]);
        self.model.add_generalization(left, apex_left);
        let right_binding = self.class_ty(Self::primitive_by_name(right_arg));
        let apex_right = self.generic_ty(apex, vec![right_binding]);
        self.model.add_generalization(right, apex_right);

        let left_ty = self.class_ty(left);
        self.model.add_generalization(join, left_ty);
        let right_ty = self.class_ty(right);
        self.model.add_generalization(join, right_ty);

        self.last_diamond_apex = apex;
        (join, apex)
    }

    fn primitive_by_name(name: &str) -> ClassId {
        match name {
            "Integer" => ClassId::INTEGER,
            "String" => ClassId::STRING,
            "Boolean" => ClassId::BOOLEAN,
            other => panic!("fixture has no primitive named {other}"),
        }
    }

    pub fn class_ty(&mut self, class: ClassId) -> GenericId {
        self.model.new_concrete(
            RawType::Class(class),
            GenericIdVec::new(),
            MultiplicityVec::new(),
            None,
            Origin::UserWritten,
        )
    }

    pub fn class_ty_with_span(&mut self, class: ClassId, span: Span) -> GenericId {
        self.model.new_concrete(
            RawType::Class(class),
            GenericIdVec::new(),
            MultiplicityVec::new(),
            Some(span),
            Origin::UserWritten,
        )
    }

    pub fn generic_ty(&mut self, class: ClassId, args: Vec<GenericId>) -> GenericId {
        self.model.new_concrete(
            RawType::Class(class),
            GenericIdVec::from_vec(args),
            MultiplicityVec::new(),
            None,
            Origin::UserWritten,
        )
    }

    pub fn generic_ty_m(
        &mut self,
        class: ClassId,
        args: Vec<GenericId>,
        mults: Vec<Multiplicity>,
    ) -> GenericId {
        self.model.new_concrete(
            RawType::Class(class),
            GenericIdVec::from_vec(args),
            MultiplicityVec::from_vec(mults),
            None,
            Origin::UserWritten,
        )
    }

    pub fn param(&mut self, name: &str) -> GenericId {
        self.model
            .new_parameter(name, false, None, Origin::UserWritten)
    }

    pub fn contraparam(&mut self, name: &str) -> GenericId {
        self.model
            .new_parameter(name, true, None, Origin::UserWritten)
    }

    /// An ad-hoc function signature wrapped as a concrete function-type node.
    pub fn func(
        &mut self,
        params: Vec<(GenericId, Multiplicity)>,
        ret: GenericId,
        ret_mult: Multiplicity,
    ) -> GenericId {
        let sig = self.sig_of(params, Some(ret), Some(ret_mult));
        self.model.new_concrete(
            RawType::Function(sig),
            GenericIdVec::new(),
            MultiplicityVec::new(),
            None,
            Origin::UserWritten,
        )
    }

    pub fn sig_of(
        &mut self,
        params: Vec<(GenericId, Multiplicity)>,
        ret: Option<GenericId>,
        ret_mult: Option<Multiplicity>,
    ) -> FunctionSigId {
        let params = params
            .into_iter()
            .map(|(ty, mult)| FunctionParam {
                name: String::new(),
                ty: Some(ty),
                mult: Some(mult),
            })
            .collect();
        self.model.graph.alloc_function_sig(FunctionSig {
            params,
            ret,
            ret_mult,
            span: None,
        })
    }

    /// A tabular type whose columns are `[1]`-multiplicity primitives.
    pub fn relation(&mut self, columns: &[(&str, ClassId)]) -> GenericId {
        let columns: Vec<(&str, Option<GenericId>)> = columns
            .iter()
            .map(|&(name, class)| (name, Some(self.class_ty(class))))
            .collect();
        self.relation_with_types(&columns)
    }

    pub fn relation_with_types(&mut self, columns: &[(&str, Option<GenericId>)]) -> GenericId {
        let columns = columns
            .iter()
            .map(|&(name, ty)| Column {
                name: name.to_string(),
                wildcard: false,
                ty,
                mult: Some(Multiplicity::one()),
                span: None,
            })
            .collect();
        let rel = self.model.new_relation(columns, None);
        self.model.new_concrete(
            RawType::Relation(rel),
            GenericIdVec::new(),
            MultiplicityVec::new(),
            None,
            Origin::UserWritten,
        )
    }

    pub fn relation_id_of(&self, id: GenericId) -> crate::types::RelationId {
        self.model
            .raw_type_of(id)
            .and_then(RawType::as_relation)
            .expect("fixture node is not a relation")
    }

    /// An extended primitive instantiation: Decimal(precision, scale).
    pub fn sized_decimal(&mut self, precision: i64, scale: i64) -> GenericId {
        self.model.graph.alloc(TypeNode::Concrete(ConcreteType {
            raw: RawType::Class(self.decimal),
            type_args: SmallVec::new(),
            mult_args: SmallVec::new(),
            variable_values: vec![VariableValue::Int(precision), VariableValue::Int(scale)],
            span: None,
            origin: Origin::UserWritten,
        }))
    }
}
