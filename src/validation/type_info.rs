//! Type context tracked while walking a document.

use crate::ast::{Node, TypeRef, Value};
use crate::schema::{DirectiveDef, FieldDef, InputValueDef, MetaType, Schema};

/// Tracks the schema types surrounding the node being visited.
///
/// [`TypeInfo::enter`] must be called before rule callbacks for a node and
/// [`TypeInfo::leave`] after them. Every push on enter has a matching pop on
/// leave. Names that do not resolve push `None` so that rules can tell "no
/// definition" apart from "not in scope".
#[derive(Debug, Clone)]
pub struct TypeInfo<'a> {
    schema: &'a Schema,
    type_stack: Vec<Option<TypeRef>>,
    parent_type_stack: Vec<Option<&'a MetaType>>,
    field_def_stack: Vec<Option<&'a FieldDef>>,
    input_type_stack: Vec<Option<TypeRef>>,
    default_value_stack: Vec<bool>,
    in_directive: bool,
    directive: Option<&'a DirectiveDef>,
    argument: Option<&'a InputValueDef>,
}

impl<'a> TypeInfo<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            type_stack: Vec::new(),
            parent_type_stack: Vec::new(),
            field_def_stack: Vec::new(),
            input_type_stack: Vec::new(),
            default_value_stack: Vec::new(),
            in_directive: false,
            directive: None,
            argument: None,
        }
    }

    /// The output type of the current position, e.g. the type of the field
    /// being visited.
    pub fn current_type(&self) -> Option<&TypeRef> {
        self.type_stack.last().and_then(Option::as_ref)
    }

    /// The composite type whose selection set is being visited.
    pub fn parent_type(&self) -> Option<&'a MetaType> {
        self.parent_type_stack.last().copied().flatten()
    }

    /// The definition of the field being visited.
    pub fn field_def(&self) -> Option<&'a FieldDef> {
        self.field_def_stack.last().copied().flatten()
    }

    /// The expected type of the input value being visited.
    pub fn input_type(&self) -> Option<&TypeRef> {
        self.input_type_stack.last().and_then(Option::as_ref)
    }

    /// The expected type of the input value enclosing the current one.
    pub fn parent_input_type(&self) -> Option<&TypeRef> {
        let len = self.input_type_stack.len();
        len.checked_sub(2)
            .and_then(|index| self.input_type_stack[index].as_ref())
    }

    /// Whether the current input position (argument or input field) declares
    /// a default value.
    pub fn has_default_value(&self) -> bool {
        self.default_value_stack.last().copied().unwrap_or(false)
    }

    /// The directive being visited, if it is defined.
    pub fn directive(&self) -> Option<&'a DirectiveDef> {
        self.directive
    }

    /// Whether a directive, known or not, is being visited.
    pub fn in_directive(&self) -> bool {
        self.in_directive
    }

    /// The definition of the argument being visited.
    pub fn argument(&self) -> Option<&'a InputValueDef> {
        self.argument
    }

    fn named(&self, ty: Option<&TypeRef>) -> Option<&'a MetaType> {
        self.schema.type_by_name(ty?.named_type())
    }

    fn output_type(&self, ty: TypeRef) -> Option<TypeRef> {
        self.schema.is_output_type(&ty).then_some(ty)
    }

    fn input(&self, ty: TypeRef) -> Option<TypeRef> {
        self.schema.is_input_type(&ty).then_some(ty)
    }

    pub fn enter(&mut self, node: Node<'a>) {
        match node {
            Node::SelectionSet(_) => {
                let parent = self
                    .named(self.current_type())
                    .filter(|ty| ty.is_composite());
                self.parent_type_stack.push(parent);
            }
            Node::Field(field) => {
                let definition = self
                    .parent_type()
                    .and_then(|parent| self.schema.field(parent, &field.name.node));
                self.field_def_stack.push(definition);
                self.type_stack.push(definition.map(|def| def.ty.clone()));
            }
            Node::Directive(directive) => {
                self.in_directive = true;
                self.directive = self.schema.directive(&directive.name.node);
            }
            Node::OperationDefinition(operation) => {
                let root = self
                    .schema
                    .root_type_name(operation.operation)
                    .map(|name| TypeRef::Named(name.clone()));
                self.type_stack.push(root);
            }
            Node::InlineFragment(fragment) => {
                let ty = match &fragment.type_condition {
                    Some(condition) => Some(TypeRef::Named(condition.node.clone())),
                    None => self.current_type().map(|ty| TypeRef::Named(ty.named_type().clone())),
                };
                let ty = ty.and_then(|ty| self.output_type(ty));
                self.type_stack.push(ty);
            }
            Node::FragmentDefinition(fragment) => {
                let ty = self.output_type(TypeRef::Named(fragment.type_condition.node.clone()));
                self.type_stack.push(ty);
            }
            Node::VariableDefinition(definition) => {
                let ty = self.input(definition.ty.node.clone());
                self.input_type_stack.push(ty);
            }
            Node::Argument(argument) => {
                let definition = if self.in_directive {
                    self.directive
                        .and_then(|directive| directive.arg(&argument.name.node))
                } else {
                    self.field_def()
                        .and_then(|field| field.arg(&argument.name.node))
                };
                self.argument = definition;
                self.default_value_stack
                    .push(definition.is_some_and(|def| def.default_value.is_some()));
                let ty = definition.and_then(|def| self.input(def.ty.clone()));
                self.input_type_stack.push(ty);
            }
            Node::Value(value) => {
                if let Value::List(_) = value.node {
                    // Items of a list in a non-list position are unresolved.
                    let item = self.input_type().and_then(|ty| ty.list_item().cloned());
                    self.default_value_stack.push(false);
                    let item = item.and_then(|ty| self.input(ty));
                    self.input_type_stack.push(item);
                }
            }
            Node::ObjectField(field) => {
                let definition = self
                    .named(self.input_type())
                    .and_then(MetaType::as_input_object)
                    .and_then(|object| object.field(&field.name.node));
                self.default_value_stack
                    .push(definition.is_some_and(|def| def.default_value.is_some()));
                let ty = definition.and_then(|def| self.input(def.ty.clone()));
                self.input_type_stack.push(ty);
            }
            Node::Document(_) | Node::FragmentSpread(_) | Node::TypeSystemDefinition(_) => {}
        }
    }

    pub fn leave(&mut self, node: Node<'a>) {
        match node {
            Node::SelectionSet(_) => {
                self.parent_type_stack.pop();
            }
            Node::Field(_) => {
                self.field_def_stack.pop();
                self.type_stack.pop();
            }
            Node::Directive(_) => {
                self.in_directive = false;
                self.directive = None;
            }
            Node::OperationDefinition(_)
            | Node::InlineFragment(_)
            | Node::FragmentDefinition(_) => {
                self.type_stack.pop();
            }
            Node::VariableDefinition(_) => {
                self.input_type_stack.pop();
            }
            Node::Argument(_) => {
                self.argument = None;
                self.default_value_stack.pop();
                self.input_type_stack.pop();
            }
            Node::Value(value) => {
                if let Value::List(_) = value.node {
                    self.default_value_stack.pop();
                    self.input_type_stack.pop();
                }
            }
            Node::ObjectField(_) => {
                self.default_value_stack.pop();
                self.input_type_stack.pop();
            }
            Node::Document(_) | Node::FragmentSpread(_) | Node::TypeSystemDefinition(_) => {}
        }
    }
}
