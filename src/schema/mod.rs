//! Read-only schema graph consumed by validation and coercion.
//!
//! A [`Schema`] is built once from SDL with [`SchemaBuilder`] and never
//! mutated afterwards. It is `Send + Sync`; concurrent validations share it
//! without locking.

mod builder;
mod error;
mod introspection;
mod meta;
mod scalar;

use std::collections::{BTreeSet, HashMap};

use smol_str::SmolStr;

use crate::ast::{OperationType, TypeRef};

pub use builder::SchemaBuilder;
pub use error::{SchemaError, SchemaResult};
pub use introspection::is_introspection_name;
pub use meta::{
    DeprecationStatus, DirectiveDef, DirectiveLocation, EnumType, EnumValueDef, FieldDef,
    InputObjectType, InputValueDef, InterfaceType, MetaType, ObjectType, ScalarParseFn,
    ScalarType, UnionType,
};
pub use scalar::BUILTIN_SCALARS;

use introspection::MetaFields;

/// A built GraphQL schema.
#[derive(Debug, Clone)]
pub struct Schema {
    types: HashMap<SmolStr, MetaType>,
    query_type: SmolStr,
    mutation_type: Option<SmolStr>,
    subscription_type: Option<SmolStr>,
    directives: HashMap<SmolStr, DirectiveDef>,
    possible_types: HashMap<SmolStr, BTreeSet<SmolStr>>,
    meta_fields: MetaFields,
}

impl Schema {
    /// Builds a schema from a single SDL source.
    pub fn parse(sdl: &str) -> SchemaResult<Self> {
        SchemaBuilder::new().sdl(sdl).build()
    }

    /// Returns a builder for schemas with several sources or custom scalars.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Looks up a named type.
    pub fn type_by_name(&self, name: &str) -> Option<&MetaType> {
        self.types.get(name)
    }

    /// Iterates over every named type, built-ins included, in no particular
    /// order.
    pub fn types(&self) -> impl Iterator<Item = &MetaType> {
        self.types.values()
    }

    /// Returns the root type name of an operation kind.
    pub fn root_type_name(&self, operation: OperationType) -> Option<&SmolStr> {
        match operation {
            OperationType::Query => Some(&self.query_type),
            OperationType::Mutation => self.mutation_type.as_ref(),
            OperationType::Subscription => self.subscription_type.as_ref(),
        }
    }

    /// Returns the root type of an operation kind.
    pub fn root_type(&self, operation: OperationType) -> Option<&MetaType> {
        self.root_type_name(operation)
            .and_then(|name| self.type_by_name(name))
    }

    /// Returns the query root type.
    pub fn query_type(&self) -> Option<&MetaType> {
        self.root_type(OperationType::Query)
    }

    /// Looks up a directive definition.
    pub fn directive(&self, name: &str) -> Option<&DirectiveDef> {
        self.directives.get(name)
    }

    /// Iterates over every directive definition.
    pub fn directives(&self) -> impl Iterator<Item = &DirectiveDef> {
        self.directives.values()
    }

    /// Resolves a field selected on `parent`.
    ///
    /// `__typename` resolves on every composite type; `__schema` and `__type`
    /// only on the query root.
    pub fn field<'s>(&'s self, parent: &'s MetaType, name: &str) -> Option<&'s FieldDef> {
        match name {
            "__typename" if parent.is_composite() => Some(&self.meta_fields.typename),
            "__schema" | "__type" if parent.name() == &self.query_type => Some(if name == "__schema" {
                &self.meta_fields.schema
            } else {
                &self.meta_fields.type_
            }),
            _ => parent.field(name),
        }
    }

    /// Returns the innermost named type of a type reference.
    pub fn named_type(&self, ty: &TypeRef) -> Option<&MetaType> {
        self.type_by_name(ty.named_type())
    }

    /// True when the named type of `ty` exists and is an input type.
    pub fn is_input_type(&self, ty: &TypeRef) -> bool {
        self.named_type(ty).is_some_and(MetaType::is_input)
    }

    /// True when the named type of `ty` exists and is an output type.
    pub fn is_output_type(&self, ty: &TypeRef) -> bool {
        self.named_type(ty).is_some_and(MetaType::is_output)
    }

    /// Concrete object types a value of `name` can be, sorted by name.
    ///
    /// An object type is its only possible type; leaf and input types have
    /// none.
    pub fn possible_types(&self, name: &str) -> impl Iterator<Item = &SmolStr> {
        self.possible_types.get(name).into_iter().flatten()
    }

    /// True when the object type `object` is a possible type of
    /// `abstract_type`.
    pub fn is_possible_type(&self, abstract_type: &str, object: &str) -> bool {
        self.possible_types
            .get(abstract_type)
            .is_some_and(|set| set.contains(object))
    }

    /// True when `maybe_sub` is a member of the union `abstract_type`, or an
    /// object or interface implementing the interface `abstract_type`.
    pub fn is_sub_type(&self, abstract_type: &MetaType, maybe_sub: &MetaType) -> bool {
        match abstract_type {
            MetaType::Union(union) => union.members.contains(maybe_sub.name()),
            MetaType::Interface(interface) => maybe_sub.interfaces().contains(&interface.name),
            _ => false,
        }
    }

    /// Covariant type compatibility: a value of `maybe_sub` may be used where
    /// `super_type` is expected.
    pub fn is_type_sub_type_of(&self, maybe_sub: &TypeRef, super_type: &TypeRef) -> bool {
        if maybe_sub == super_type {
            return true;
        }
        match (maybe_sub, super_type) {
            (TypeRef::NonNull(sub), TypeRef::NonNull(sup)) => self.is_type_sub_type_of(sub, sup),
            (_, TypeRef::NonNull(_)) => false,
            (TypeRef::NonNull(sub), sup) => self.is_type_sub_type_of(sub, sup),
            (TypeRef::List(sub), TypeRef::List(sup)) => self.is_type_sub_type_of(sub, sup),
            (_, TypeRef::List(_)) | (TypeRef::List(_), _) => false,
            (TypeRef::Named(sub), TypeRef::Named(sup)) => {
                match (self.type_by_name(sub), self.type_by_name(sup)) {
                    (Some(sub), Some(sup)) => {
                        sup.is_abstract()
                            && matches!(sub, MetaType::Object(_) | MetaType::Interface(_))
                            && self.is_sub_type(sup, sub)
                    }
                    _ => false,
                }
            }
        }
    }

    /// True when some concrete object type is possible for both `a` and `b`.
    pub fn do_types_overlap(&self, a: &MetaType, b: &MetaType) -> bool {
        if a.name() == b.name() {
            return true;
        }
        match (a.is_abstract(), b.is_abstract()) {
            (true, true) => self
                .possible_types(b.name())
                .any(|object| self.is_possible_type(a.name(), object)),
            (true, false) => self.is_possible_type(a.name(), b.name()),
            (false, true) => self.is_possible_type(b.name(), a.name()),
            (false, false) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SDL: &str = r#"
        interface Pet { name: String }
        interface Named { name: String }
        type Dog implements Pet & Named { name: String barks: Boolean }
        type Cat implements Pet { name: String meows: Boolean }
        type Human implements Named { name: String }
        union CatOrDog = Cat | Dog
        union HumanOrAlien = Human
        type Query { dog: Dog pet: Pet }
    "#;

    fn schema() -> Schema {
        Schema::parse(SDL).expect("schema builds")
    }

    fn ty<'s>(schema: &'s Schema, name: &str) -> &'s MetaType {
        schema.type_by_name(name).expect("type exists")
    }

    #[test]
    fn includes_builtins() {
        let schema = schema();
        for scalar in BUILTIN_SCALARS {
            assert!(schema.type_by_name(scalar).is_some(), "{scalar}");
        }
        for directive in ["skip", "include", "deprecated", "specifiedBy", "oneOf"] {
            assert!(schema.directive(directive).is_some(), "{directive}");
        }
        assert!(schema.type_by_name("__Type").is_some());
    }

    #[test]
    fn resolves_meta_fields() {
        let schema = schema();
        let query = ty(&schema, "Query");
        let dog = ty(&schema, "Dog");
        assert!(schema.field(dog, "__typename").is_some());
        assert!(schema.field(query, "__schema").is_some());
        assert!(schema.field(dog, "__schema").is_none());
        assert_eq!(
            schema.field(query, "__type").map(|f| f.arguments.len()),
            Some(1)
        );
    }

    #[test]
    fn possible_types_are_sorted_objects() {
        let schema = schema();
        let pets: Vec<_> = schema.possible_types("Pet").map(|s| s.as_str()).collect();
        assert_eq!(pets, vec!["Cat", "Dog"]);
        let dogs: Vec<_> = schema.possible_types("Dog").map(|s| s.as_str()).collect();
        assert_eq!(dogs, vec!["Dog"]);
        assert_eq!(schema.possible_types("String").count(), 0);
    }

    #[test]
    fn overlap_between_abstract_types() {
        let schema = schema();
        assert!(schema.do_types_overlap(ty(&schema, "Pet"), ty(&schema, "CatOrDog")));
        assert!(schema.do_types_overlap(ty(&schema, "Named"), ty(&schema, "Dog")));
        assert!(!schema.do_types_overlap(ty(&schema, "CatOrDog"), ty(&schema, "HumanOrAlien")));
        assert!(!schema.do_types_overlap(ty(&schema, "Cat"), ty(&schema, "Dog")));
    }

    #[test]
    fn sub_type_rules() {
        let schema = schema();
        let named = |name: &str| TypeRef::named(name);
        assert!(schema.is_type_sub_type_of(&named("Int").non_null(), &named("Int")));
        assert!(!schema.is_type_sub_type_of(&named("Int"), &named("Int").non_null()));
        assert!(schema.is_type_sub_type_of(&named("Dog"), &named("Pet")));
        assert!(schema.is_type_sub_type_of(
            &named("Dog").non_null().list(),
            &named("Pet").list()
        ));
        assert!(!schema.is_type_sub_type_of(&named("Int").list(), &named("Int")));
        assert!(!schema.is_type_sub_type_of(&named("Pet"), &named("Dog")));
    }

    #[test]
    fn default_roots_and_schema_definition() {
        let schema = schema();
        assert_eq!(schema.query_type().map(|t| t.name().as_str()), Some("Query"));
        assert!(schema.root_type(OperationType::Mutation).is_none());

        let custom = Schema::parse("schema { query: Root } type Root { a: Int }").expect("builds");
        assert_eq!(
            custom.root_type_name(OperationType::Query).map(|s| s.as_str()),
            Some("Root")
        );
    }

    #[test]
    fn extensions_merge_fields() {
        let schema = Schema::parse("type Query { a: Int } extend type Query { b: String }")
            .expect("builds");
        let query = ty(&schema, "Query");
        assert!(query.field("a").is_some());
        assert!(query.field("b").is_some());
    }

    #[test]
    fn deprecation_and_one_of_are_applied() {
        let schema = Schema::parse(
            r#"
            type Query { old: Int @deprecated new: Int @deprecated(reason: "use newer") }
            input Pick @oneOf { a: Int b: String }
            "#,
        )
        .expect("builds");
        let query = ty(&schema, "Query");
        assert_eq!(
            query.field("old").map(|f| f.deprecation.clone()),
            Some(DeprecationStatus::Deprecated(Some("No longer supported".into())))
        );
        assert_eq!(
            query.field("new").map(|f| f.deprecation.clone()),
            Some(DeprecationStatus::Deprecated(Some("use newer".into())))
        );
        assert!(ty(&schema, "Pick").is_one_of());
    }

    #[test]
    fn build_errors() {
        assert!(matches!(
            Schema::parse("type Query { a: Int } type Query { b: Int }"),
            Err(SchemaError::DuplicateType(name)) if name == "Query"
        ));
        assert!(matches!(
            Schema::parse("type Query { a: Missing }"),
            Err(SchemaError::UnknownType { name, .. }) if name == "Missing"
        ));
        assert!(matches!(
            Schema::parse("type Foo { a: Int }"),
            Err(SchemaError::MissingQueryRoot)
        ));
        assert!(matches!(
            Schema::parse("type Query { a(arg: Query): Int }"),
            Err(SchemaError::NotInputType { .. })
        ));
        assert!(matches!(
            Schema::parse("input In { a: Int } type Query { a: In }"),
            Err(SchemaError::NotOutputType { .. })
        ));
        assert!(matches!(
            Schema::parse("type Query { a: Int"),
            Err(SchemaError::Syntax { .. })
        ));
    }

    #[test]
    fn custom_scalar_parse_fn_is_used() {
        let schema = Schema::builder()
            .sdl("scalar Even type Query { n: Even }")
            .register_scalar("Even", |value| match value {
                crate::ast::ConstValue::Int(i) if i % 2 == 0 => Ok(value.clone()),
                _ => Err("odd".to_string()),
            })
            .build()
            .expect("builds");
        let MetaType::Scalar(even) = ty(&schema, "Even") else {
            panic!("Even is a scalar");
        };
        assert!(even.parse_value(&crate::ast::ConstValue::Int(2)).is_ok());
        assert!(even.parse_value(&crate::ast::ConstValue::Int(3)).is_err());
    }

    #[test]
    fn schema_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Schema>();
    }
}
