//! Builds a [`Schema`] from SDL.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use smol_str::SmolStr;
use tracing::debug;

use crate::ast::{
    ConstValue, Directive, DirectiveDefinition, EnumValueDefinition, FieldDefinition,
    InputValueDefinition, OperationType, TypeDefinition, TypeDefinitionKind, TypeRef,
    TypeSystemDefinition, Value,
};
use crate::parser::parse_type_system;

use super::error::{SchemaError, SchemaResult};
use super::introspection::{MetaFields, PRELUDE_SDL};
use super::meta::{
    DeprecationStatus, DirectiveDef, DirectiveLocation, EnumType, EnumValueDef, FieldDef,
    InputObjectType, InputValueDef, InterfaceType, MetaType, ObjectType, ScalarParseFn,
    ScalarType, UnionType,
};
use super::scalar::{builtin_parse_fn, identity_parse_fn};
use super::Schema;

const DEFAULT_DEPRECATION_REASON: &str = "No longer supported";

/// Collects SDL sources and custom scalar parse functions, then builds an
/// immutable [`Schema`].
///
/// ```
/// use graphql_validator::ast::ConstValue;
/// use graphql_validator::schema::SchemaBuilder;
///
/// let schema = SchemaBuilder::new()
///     .sdl("scalar Date type Query { today: Date }")
///     .register_scalar("Date", |value| match value {
///         ConstValue::String(s) if s.len() == 10 => Ok(value.clone()),
///         _ => Err("expected YYYY-MM-DD".to_string()),
///     })
///     .build()
///     .expect("valid schema");
/// assert!(schema.type_by_name("Date").is_some());
/// ```
#[derive(Default)]
pub struct SchemaBuilder {
    sources: Vec<String>,
    scalars: HashMap<SmolStr, ScalarParseFn>,
}

impl SchemaBuilder {
    /// Creates an empty builder. Built-in scalars, directives and
    /// introspection types are always added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an SDL source. Sources are merged; extensions may refer to types
    /// from earlier or later sources.
    pub fn sdl(mut self, source: impl Into<String>) -> Self {
        self.sources.push(source.into());
        self
    }

    /// Registers the parse function of a custom scalar. Scalars without one
    /// accept any value.
    pub fn register_scalar<F>(mut self, name: impl Into<SmolStr>, parse: F) -> Self
    where
        F: Fn(&ConstValue) -> Result<ConstValue, String> + Send + Sync + 'static,
    {
        self.scalars.insert(name.into(), Arc::new(parse));
        self
    }

    /// Builds the schema.
    pub fn build(self) -> SchemaResult<Schema> {
        let mut definitions = Vec::new();
        for source in std::iter::once(PRELUDE_SDL).chain(self.sources.iter().map(String::as_str)) {
            let (parsed, diagnostics) = parse_type_system(source);
            if let Some(first) = diagnostics.iter().find(|diag| diag.is_error()) {
                return Err(SchemaError::Syntax {
                    message: first.message.clone(),
                    diagnostics,
                });
            }
            definitions.extend(parsed);
        }

        let mut type_defs: Vec<TypeDefinition> = Vec::new();
        let mut extensions = Vec::new();
        let mut directive_defs = Vec::new();
        let mut roots: HashMap<OperationType, SmolStr> = HashMap::new();

        for definition in definitions {
            match definition {
                TypeSystemDefinition::Type(ty) if ty.extend => extensions.push(ty),
                TypeSystemDefinition::Type(ty) => {
                    if type_defs.iter().any(|existing| existing.name.node == ty.name.node) {
                        return Err(SchemaError::DuplicateType(ty.name.node));
                    }
                    type_defs.push(ty);
                }
                TypeSystemDefinition::Directive(directive) => {
                    if directive_defs
                        .iter()
                        .any(|existing: &DirectiveDefinition| existing.name.node == directive.name.node)
                    {
                        return Err(SchemaError::DuplicateDirective(directive.name.node));
                    }
                    directive_defs.push(directive);
                }
                TypeSystemDefinition::Schema(schema) => {
                    for (operation, name) in schema.root_operations {
                        roots.insert(operation, name.node);
                    }
                }
            }
        }

        for extension in extensions {
            let target = type_defs
                .iter_mut()
                .find(|ty| ty.name.node == extension.name.node)
                .ok_or_else(|| SchemaError::ExtensionOfUnknownType(extension.name.node.clone()))?;
            apply_extension(target, extension)?;
        }

        let mut types = HashMap::with_capacity(type_defs.len());
        for definition in type_defs {
            let meta = self.convert_type(definition);
            types.insert(meta.name().clone(), meta);
        }

        let mut directives = HashMap::with_capacity(directive_defs.len());
        for definition in directive_defs {
            let directive = convert_directive(definition)?;
            directives.insert(directive.name.clone(), directive);
        }

        check_references(&types, &directives)?;

        let root = |operation: OperationType, default: &str| -> SchemaResult<Option<SmolStr>> {
            let name = match roots.get(&operation) {
                Some(name) => name.clone(),
                None if types.contains_key(default) => SmolStr::new(default),
                None => return Ok(None),
            };
            match types.get(&name) {
                Some(MetaType::Object(_)) => Ok(Some(name)),
                Some(_) => Err(SchemaError::InvalidRootType {
                    operation: operation_keyword(operation),
                    name,
                }),
                None => Err(SchemaError::UnknownType {
                    name,
                    referenced_by: "schema".to_string(),
                }),
            }
        };
        let query_type = root(OperationType::Query, "Query")?.ok_or(SchemaError::MissingQueryRoot)?;
        let mutation_type = root(OperationType::Mutation, "Mutation")?;
        let subscription_type = root(OperationType::Subscription, "Subscription")?;

        let possible_types = collect_possible_types(&types);

        debug!(
            types = types.len(),
            directives = directives.len(),
            query = %query_type,
            "schema built"
        );

        Ok(Schema {
            types,
            query_type,
            mutation_type,
            subscription_type,
            directives,
            possible_types,
            meta_fields: MetaFields::new(),
        })
    }

    fn convert_type(&self, definition: TypeDefinition) -> MetaType {
        let TypeDefinition {
            description,
            name,
            directives,
            kind,
            ..
        } = definition;
        let name = name.node;

        match kind {
            TypeDefinitionKind::Scalar => {
                let parse = self
                    .scalars
                    .get(&name)
                    .cloned()
                    .or_else(|| builtin_parse_fn(&name))
                    .unwrap_or_else(identity_parse_fn);
                MetaType::Scalar(ScalarType {
                    specified_by_url: string_argument(&directives, "specifiedBy", "url"),
                    name,
                    description,
                    parse,
                })
            }
            TypeDefinitionKind::Object { implements, fields } => MetaType::Object(ObjectType {
                name,
                description,
                interfaces: implements.into_iter().map(|i| i.node).collect(),
                fields: fields.into_iter().map(convert_field).collect(),
            }),
            TypeDefinitionKind::Interface { implements, fields } => {
                MetaType::Interface(InterfaceType {
                    name,
                    description,
                    interfaces: implements.into_iter().map(|i| i.node).collect(),
                    fields: fields.into_iter().map(convert_field).collect(),
                })
            }
            TypeDefinitionKind::Union { members } => MetaType::Union(UnionType {
                name,
                description,
                members: members.into_iter().map(|m| m.node).collect(),
            }),
            TypeDefinitionKind::Enum { values } => MetaType::Enum(EnumType {
                name,
                description,
                values: values.into_iter().map(convert_enum_value).collect(),
            }),
            TypeDefinitionKind::InputObject { fields } => MetaType::InputObject(InputObjectType {
                one_of: directives.iter().any(|d| d.name.node == "oneOf"),
                name,
                description,
                fields: fields.into_iter().map(convert_input_value).collect(),
            }),
        }
    }
}

fn operation_keyword(operation: OperationType) -> &'static str {
    match operation {
        OperationType::Query => "query",
        OperationType::Mutation => "mutation",
        OperationType::Subscription => "subscription",
    }
}

fn apply_extension(target: &mut TypeDefinition, extension: TypeDefinition) -> SchemaResult<()> {
    target.directives.extend(extension.directives);
    match (&mut target.kind, extension.kind) {
        (TypeDefinitionKind::Scalar, TypeDefinitionKind::Scalar) => {}
        (
            TypeDefinitionKind::Object { implements, fields },
            TypeDefinitionKind::Object {
                implements: more_implements,
                fields: more_fields,
            },
        )
        | (
            TypeDefinitionKind::Interface { implements, fields },
            TypeDefinitionKind::Interface {
                implements: more_implements,
                fields: more_fields,
            },
        ) => {
            implements.extend(more_implements);
            fields.extend(more_fields);
        }
        (TypeDefinitionKind::Union { members }, TypeDefinitionKind::Union { members: more }) => {
            members.extend(more)
        }
        (TypeDefinitionKind::Enum { values }, TypeDefinitionKind::Enum { values: more }) => {
            values.extend(more)
        }
        (
            TypeDefinitionKind::InputObject { fields },
            TypeDefinitionKind::InputObject { fields: more },
        ) => fields.extend(more),
        (kind, other) => {
            return Err(SchemaError::InvalidExtension {
                name: target.name.node.clone(),
                actual: kind.keyword(),
                extension: other.keyword(),
            });
        }
    }
    Ok(())
}

fn convert_field(field: FieldDefinition) -> FieldDef {
    FieldDef {
        deprecation: deprecation(&field.directives),
        name: field.name.node,
        description: field.description,
        arguments: field.arguments.into_iter().map(convert_input_value).collect(),
        ty: field.ty.node,
    }
}

fn convert_input_value(value: InputValueDefinition) -> InputValueDef {
    InputValueDef {
        name: value.name.node,
        description: value.description,
        ty: value.ty.node,
        default_value: value.default_value.map(|v| v.node),
    }
}

fn convert_enum_value(value: EnumValueDefinition) -> EnumValueDef {
    EnumValueDef {
        deprecation: deprecation(&value.directives),
        name: value.name.node,
        description: value.description,
    }
}

fn convert_directive(definition: DirectiveDefinition) -> SchemaResult<DirectiveDef> {
    let locations = definition
        .locations
        .into_iter()
        .map(|location| {
            location
                .node
                .parse::<DirectiveLocation>()
                .map_err(|()| SchemaError::UnknownDirectiveLocation(location.node.clone()))
        })
        .collect::<SchemaResult<Vec<_>>>()?;

    Ok(DirectiveDef {
        name: definition.name.node,
        description: definition.description,
        arguments: definition.arguments.into_iter().map(convert_input_value).collect(),
        locations,
        repeatable: definition.repeatable,
    })
}

fn deprecation(directives: &[Directive]) -> DeprecationStatus {
    if !directives.iter().any(|d| d.name.node == "deprecated") {
        return DeprecationStatus::Current;
    }
    let reason = string_argument(directives, "deprecated", "reason")
        .unwrap_or_else(|| DEFAULT_DEPRECATION_REASON.to_string());
    DeprecationStatus::Deprecated(Some(reason))
}

fn string_argument(directives: &[Directive], directive: &str, argument: &str) -> Option<String> {
    let directive = directives.iter().find(|d| d.name.node == directive)?;
    match &directive.argument(argument)?.value.node {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn check_references(
    types: &HashMap<SmolStr, MetaType>,
    directives: &HashMap<SmolStr, DirectiveDef>,
) -> SchemaResult<()> {
    let lookup = |ty: &TypeRef, referenced_by: &dyn Fn() -> String| {
        types
            .get(ty.named_type())
            .ok_or_else(|| SchemaError::UnknownType {
                name: ty.named_type().clone(),
                referenced_by: referenced_by(),
            })
    };
    let check_input = |ty: &TypeRef, coordinate: &dyn Fn() -> String| -> SchemaResult<()> {
        if lookup(ty, coordinate)?.is_input() {
            Ok(())
        } else {
            Err(SchemaError::NotInputType {
                coordinate: coordinate(),
                ty: ty.to_string(),
            })
        }
    };

    for meta in types.values() {
        let type_name = meta.name();
        if let Some(fields) = meta.fields() {
            for field in fields {
                let coordinate = || format!("{type_name}.{}", field.name);
                if !lookup(&field.ty, &coordinate)?.is_output() {
                    return Err(SchemaError::NotOutputType {
                        coordinate: coordinate(),
                        ty: field.ty.to_string(),
                    });
                }
                for arg in &field.arguments {
                    check_input(&arg.ty, &|| format!("{type_name}.{}({}:)", field.name, arg.name))?;
                }
            }
            for interface in meta.interfaces() {
                match types.get(interface) {
                    Some(MetaType::Interface(_)) => {}
                    Some(_) => {
                        return Err(SchemaError::InvalidImplementation {
                            ty: type_name.clone(),
                            interface: interface.clone(),
                        });
                    }
                    None => {
                        return Err(SchemaError::UnknownType {
                            name: interface.clone(),
                            referenced_by: type_name.to_string(),
                        });
                    }
                }
            }
        }

        match meta {
            MetaType::Union(union) => {
                for member in &union.members {
                    match types.get(member) {
                        Some(MetaType::Object(_)) => {}
                        Some(_) => {
                            return Err(SchemaError::InvalidUnionMember {
                                union: type_name.clone(),
                                member: member.clone(),
                            });
                        }
                        None => {
                            return Err(SchemaError::UnknownType {
                                name: member.clone(),
                                referenced_by: type_name.to_string(),
                            });
                        }
                    }
                }
            }
            MetaType::InputObject(input) => {
                for field in &input.fields {
                    check_input(&field.ty, &|| format!("{type_name}.{}", field.name))?;
                }
            }
            _ => {}
        }
    }

    for directive in directives.values() {
        for arg in &directive.arguments {
            check_input(&arg.ty, &|| format!("@{}({}:)", directive.name, arg.name))?;
        }
    }

    Ok(())
}

fn collect_possible_types(types: &HashMap<SmolStr, MetaType>) -> HashMap<SmolStr, BTreeSet<SmolStr>> {
    let mut possible: HashMap<SmolStr, BTreeSet<SmolStr>> = HashMap::new();
    for meta in types.values() {
        match meta {
            MetaType::Object(object) => {
                possible
                    .entry(object.name.clone())
                    .or_default()
                    .insert(object.name.clone());
                for interface in &object.interfaces {
                    possible
                        .entry(interface.clone())
                        .or_default()
                        .insert(object.name.clone());
                }
            }
            MetaType::Union(union) => {
                possible
                    .entry(union.name.clone())
                    .or_default()
                    .extend(union.members.iter().cloned());
            }
            MetaType::Interface(interface) => {
                possible.entry(interface.name.clone()).or_default();
            }
            _ => {}
        }
    }
    possible
}
