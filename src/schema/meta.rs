//! Types used to describe a GraphQL schema.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::ast::{ConstValue, TypeRef, Value};

/// Parse function of a scalar type.
///
/// Receives the input already converted to a [`ConstValue`] and returns the
/// internal value, or a reason why the input is not acceptable.
pub type ScalarParseFn = Arc<dyn Fn(&ConstValue) -> Result<ConstValue, String> + Send + Sync>;

/// Whether a field or enum value is deprecated, with context.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeprecationStatus {
    /// Not deprecated.
    #[default]
    Current,
    /// Deprecated, with an optional reason.
    Deprecated(Option<String>),
}

impl DeprecationStatus {
    /// If this deprecation status indicates the item is deprecated.
    pub fn is_deprecated(&self) -> bool {
        matches!(self, DeprecationStatus::Deprecated(_))
    }
}

/// Scalar type metadata.
#[derive(Clone)]
pub struct ScalarType {
    pub name: SmolStr,
    pub description: Option<String>,
    pub specified_by_url: Option<String>,
    pub(crate) parse: ScalarParseFn,
}

impl ScalarType {
    /// Runs the scalar's parse function.
    pub fn parse_value(&self, value: &ConstValue) -> Result<ConstValue, String> {
        (self.parse)(value)
    }
}

impl fmt::Debug for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarType")
            .field("name", &self.name)
            .field("specified_by_url", &self.specified_by_url)
            .finish_non_exhaustive()
    }
}

/// Object type metadata.
#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: SmolStr,
    pub description: Option<String>,
    pub interfaces: Vec<SmolStr>,
    pub fields: Vec<FieldDef>,
}

/// Interface type metadata.
#[derive(Debug, Clone)]
pub struct InterfaceType {
    pub name: SmolStr,
    pub description: Option<String>,
    pub interfaces: Vec<SmolStr>,
    pub fields: Vec<FieldDef>,
}

/// Union type metadata.
#[derive(Debug, Clone)]
pub struct UnionType {
    pub name: SmolStr,
    pub description: Option<String>,
    pub members: Vec<SmolStr>,
}

/// Enum type metadata.
#[derive(Debug, Clone)]
pub struct EnumType {
    pub name: SmolStr,
    pub description: Option<String>,
    pub values: Vec<EnumValueDef>,
}

impl EnumType {
    /// Looks up a value by name.
    pub fn value(&self, name: &str) -> Option<&EnumValueDef> {
        self.values.iter().find(|value| value.name == name)
    }
}

/// Input object type metadata.
#[derive(Debug, Clone)]
pub struct InputObjectType {
    pub name: SmolStr,
    pub description: Option<String>,
    pub fields: Vec<InputValueDef>,
    /// Set by `@oneOf`: exactly one field must be given, and it must not be null.
    pub one_of: bool,
}

impl InputObjectType {
    /// Looks up an input field by name.
    pub fn field(&self, name: &str) -> Option<&InputValueDef> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Generic type metadata.
///
/// Closed over the six named type kinds; list and non-null wrapping lives in
/// [`TypeRef`].
#[derive(Debug, Clone)]
pub enum MetaType {
    Scalar(ScalarType),
    Object(ObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    Enum(EnumType),
    InputObject(InputObjectType),
}

impl MetaType {
    /// Returns the type name.
    pub fn name(&self) -> &SmolStr {
        match self {
            MetaType::Scalar(t) => &t.name,
            MetaType::Object(t) => &t.name,
            MetaType::Interface(t) => &t.name,
            MetaType::Union(t) => &t.name,
            MetaType::Enum(t) => &t.name,
            MetaType::InputObject(t) => &t.name,
        }
    }

    /// Returns the description, if any.
    pub fn description(&self) -> Option<&str> {
        match self {
            MetaType::Scalar(t) => t.description.as_deref(),
            MetaType::Object(t) => t.description.as_deref(),
            MetaType::Interface(t) => t.description.as_deref(),
            MetaType::Union(t) => t.description.as_deref(),
            MetaType::Enum(t) => t.description.as_deref(),
            MetaType::InputObject(t) => t.description.as_deref(),
        }
    }

    /// Returns the kind keyword used in messages, e.g. `object`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            MetaType::Scalar(_) => "scalar",
            MetaType::Object(_) => "object",
            MetaType::Interface(_) => "interface",
            MetaType::Union(_) => "union",
            MetaType::Enum(_) => "enum",
            MetaType::InputObject(_) => "input object",
        }
    }

    /// Objects, interfaces and unions: types that take a selection set.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            MetaType::Object(_) | MetaType::Interface(_) | MetaType::Union(_)
        )
    }

    /// Scalars and enums.
    pub fn is_leaf(&self) -> bool {
        matches!(self, MetaType::Scalar(_) | MetaType::Enum(_))
    }

    /// Types usable as argument, variable and input field types.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            MetaType::Scalar(_) | MetaType::Enum(_) | MetaType::InputObject(_)
        )
    }

    /// Types usable as field types.
    pub fn is_output(&self) -> bool {
        !matches!(self, MetaType::InputObject(_))
    }

    /// Interfaces and unions.
    pub fn is_abstract(&self) -> bool {
        matches!(self, MetaType::Interface(_) | MetaType::Union(_))
    }

    /// Returns true for object types.
    pub fn is_object(&self) -> bool {
        matches!(self, MetaType::Object(_))
    }

    /// Returns the output fields of objects and interfaces.
    pub fn fields(&self) -> Option<&[FieldDef]> {
        match self {
            MetaType::Object(t) => Some(&t.fields),
            MetaType::Interface(t) => Some(&t.fields),
            _ => None,
        }
    }

    /// Looks up an output field by name. Meta-fields are resolved by
    /// [`super::Schema::field`], not here.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields()?.iter().find(|field| field.name == name)
    }

    /// Returns the interfaces an object or interface implements.
    pub fn interfaces(&self) -> &[SmolStr] {
        match self {
            MetaType::Object(t) => &t.interfaces,
            MetaType::Interface(t) => &t.interfaces,
            _ => &[],
        }
    }

    /// Returns the input object metadata.
    pub fn as_input_object(&self) -> Option<&InputObjectType> {
        match self {
            MetaType::InputObject(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the enum metadata.
    pub fn as_enum(&self) -> Option<&EnumType> {
        match self {
            MetaType::Enum(t) => Some(t),
            _ => None,
        }
    }

    /// Returns true for a `@oneOf` input object.
    pub fn is_one_of(&self) -> bool {
        self.as_input_object().is_some_and(|t| t.one_of)
    }
}

/// An output field.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: SmolStr,
    pub description: Option<String>,
    pub arguments: Vec<InputValueDef>,
    pub ty: TypeRef,
    pub deprecation: DeprecationStatus,
}

impl FieldDef {
    /// Creates a field without arguments.
    pub fn new(name: impl Into<SmolStr>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: Vec::new(),
            ty,
            deprecation: DeprecationStatus::Current,
        }
    }

    /// Adds an argument.
    pub fn argument(mut self, argument: InputValueDef) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Looks up an argument by name.
    pub fn arg(&self, name: &str) -> Option<&InputValueDef> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}

/// An argument or input field.
///
/// The default value is kept as the literal from the SDL and coerced when
/// used.
#[derive(Debug, Clone)]
pub struct InputValueDef {
    pub name: SmolStr,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub default_value: Option<Value>,
}

impl InputValueDef {
    /// Creates an input value without a default.
    pub fn new(name: impl Into<SmolStr>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
            default_value: None,
        }
    }

    /// A non-null input without a default must always be provided.
    pub fn is_required(&self) -> bool {
        self.ty.is_non_null() && self.default_value.is_none()
    }
}

/// An enum value.
#[derive(Debug, Clone)]
pub struct EnumValueDef {
    pub name: SmolStr,
    pub description: Option<String>,
    pub deprecation: DeprecationStatus,
}

/// A directive definition.
#[derive(Debug, Clone)]
pub struct DirectiveDef {
    pub name: SmolStr,
    pub description: Option<String>,
    pub arguments: Vec<InputValueDef>,
    pub locations: Vec<DirectiveLocation>,
    pub repeatable: bool,
}

impl DirectiveDef {
    /// Looks up an argument by name.
    pub fn arg(&self, name: &str) -> Option<&InputValueDef> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}

/// Where a directive may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,
    Schema,
    Scalar,
    Object,
    FieldDefinition,
    ArgumentDefinition,
    Interface,
    Union,
    Enum,
    EnumValue,
    InputObject,
    InputFieldDefinition,
}

impl DirectiveLocation {
    /// Returns the SDL spelling, e.g. `FRAGMENT_SPREAD`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectiveLocation::Query => "QUERY",
            DirectiveLocation::Mutation => "MUTATION",
            DirectiveLocation::Subscription => "SUBSCRIPTION",
            DirectiveLocation::Field => "FIELD",
            DirectiveLocation::FragmentDefinition => "FRAGMENT_DEFINITION",
            DirectiveLocation::FragmentSpread => "FRAGMENT_SPREAD",
            DirectiveLocation::InlineFragment => "INLINE_FRAGMENT",
            DirectiveLocation::VariableDefinition => "VARIABLE_DEFINITION",
            DirectiveLocation::Schema => "SCHEMA",
            DirectiveLocation::Scalar => "SCALAR",
            DirectiveLocation::Object => "OBJECT",
            DirectiveLocation::FieldDefinition => "FIELD_DEFINITION",
            DirectiveLocation::ArgumentDefinition => "ARGUMENT_DEFINITION",
            DirectiveLocation::Interface => "INTERFACE",
            DirectiveLocation::Union => "UNION",
            DirectiveLocation::Enum => "ENUM",
            DirectiveLocation::EnumValue => "ENUM_VALUE",
            DirectiveLocation::InputObject => "INPUT_OBJECT",
            DirectiveLocation::InputFieldDefinition => "INPUT_FIELD_DEFINITION",
        }
    }
}

impl FromStr for DirectiveLocation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "QUERY" => DirectiveLocation::Query,
            "MUTATION" => DirectiveLocation::Mutation,
            "SUBSCRIPTION" => DirectiveLocation::Subscription,
            "FIELD" => DirectiveLocation::Field,
            "FRAGMENT_DEFINITION" => DirectiveLocation::FragmentDefinition,
            "FRAGMENT_SPREAD" => DirectiveLocation::FragmentSpread,
            "INLINE_FRAGMENT" => DirectiveLocation::InlineFragment,
            "VARIABLE_DEFINITION" => DirectiveLocation::VariableDefinition,
            "SCHEMA" => DirectiveLocation::Schema,
            "SCALAR" => DirectiveLocation::Scalar,
            "OBJECT" => DirectiveLocation::Object,
            "FIELD_DEFINITION" => DirectiveLocation::FieldDefinition,
            "ARGUMENT_DEFINITION" => DirectiveLocation::ArgumentDefinition,
            "INTERFACE" => DirectiveLocation::Interface,
            "UNION" => DirectiveLocation::Union,
            "ENUM" => DirectiveLocation::Enum,
            "ENUM_VALUE" => DirectiveLocation::EnumValue,
            "INPUT_OBJECT" => DirectiveLocation::InputObject,
            "INPUT_FIELD_DEFINITION" => DirectiveLocation::InputFieldDefinition,
            _ => return Err(()),
        })
    }
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_object(one_of: bool) -> MetaType {
        MetaType::InputObject(InputObjectType {
            name: "Filter".into(),
            description: None,
            fields: vec![InputValueDef::new("id", TypeRef::named("ID"))],
            one_of,
        })
    }

    #[test]
    fn capability_predicates() {
        let union = MetaType::Union(UnionType {
            name: "CatOrDog".into(),
            description: None,
            members: vec!["Cat".into(), "Dog".into()],
        });
        assert!(union.is_composite());
        assert!(union.is_abstract());
        assert!(union.is_output());
        assert!(!union.is_input());
        assert!(!union.is_leaf());

        let input = input_object(false);
        assert!(input.is_input());
        assert!(!input.is_output());
        assert!(!input.is_composite());
        assert_eq!(input.kind_name(), "input object");
    }

    #[test]
    fn one_of_flag() {
        assert!(input_object(true).is_one_of());
        assert!(!input_object(false).is_one_of());
    }

    #[test]
    fn required_inputs() {
        let required = InputValueDef::new("id", TypeRef::named("ID").non_null());
        assert!(required.is_required());
        let mut defaulted = required.clone();
        defaulted.default_value = Some(Value::String("1".into()));
        assert!(!defaulted.is_required());
    }

    #[test]
    fn directive_locations_round_trip_names() {
        for name in ["QUERY", "FRAGMENT_SPREAD", "INPUT_FIELD_DEFINITION"] {
            let location: DirectiveLocation = name.parse().expect("known location");
            assert_eq!(location.to_string(), name);
        }
        assert!("NOWHERE".parse::<DirectiveLocation>().is_err());
    }
}
