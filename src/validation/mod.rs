//! Document validation against a schema.
//!
//! [`DocumentValidator`] runs a list of [`ValidationRule`]s over a parsed
//! [`Document`] in a single depth-first walk. Every rule that does not opt out
//! contributes a visitor; type information is tracked once and shared by all
//! of them through the [`ValidationContext`].
//!
//! Validation never fails: findings are collected as [`ValidationError`]s in
//! detection order and returned together in a [`ValidationResult`].
//!
//! # Cached documents
//!
//! A document that already passed validation only needs the rules whose
//! outcome depends on the request. Marking a [`ValidationRequest`] as
//! [`cached`](ValidationRequest::cached) runs the rules with
//! [`RuleScope::Request`] by default; [`DocumentValidator::with_cached_rules`]
//! overrides that subset.

mod config;
mod context;
mod error;
mod rule;
pub mod rules;
mod suggestion;
mod type_info;

use std::sync::Arc;

use miette::Report;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, trace};

use crate::ast::Document;
use crate::ast::visit::walk_document;
use crate::coercion::VariableValues;
use crate::diag::{Diag, SourceFile, convert_diagnostics_to_reports};
use crate::schema::Schema;

pub use config::ValidationConfig;
pub use context::{UsageScope, ValidationContext, VariableUsage};
pub use error::ValidationError;
pub use rule::{BoxedVisitor, RuleScope, ValidationRule, Visitor};
pub use rules::default_rules;
pub use suggestion::{did_you_mean, quoted_or_list, suggestion_list};
pub use type_info::TypeInfo;

use rule::CompositeVisitor;

/// One validation request: what to validate, and against what.
#[derive(Debug, Clone, Copy)]
pub struct ValidationRequest<'a> {
    pub schema: &'a Schema,
    pub document: &'a Document,
    /// Raw variable values supplied with the request.
    pub variables: Option<&'a Map<String, JsonValue>>,
    /// Name of the operation to run, when the document has several.
    pub operation_name: Option<&'a str>,
    /// Whether the document already passed validation earlier.
    pub cached: bool,
}

impl<'a> ValidationRequest<'a> {
    pub fn new(schema: &'a Schema, document: &'a Document) -> Self {
        Self {
            schema,
            document,
            variables: None,
            operation_name: None,
            cached: false,
        }
    }

    /// Attaches raw request variables.
    pub fn with_variables(mut self, variables: &'a Map<String, JsonValue>) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Selects the operation to run.
    pub fn with_operation_name(mut self, name: &'a str) -> Self {
        self.operation_name = Some(name);
        self
    }

    /// Marks the document as previously validated.
    pub fn cached(mut self, cached: bool) -> Self {
        self.cached = cached;
        self
    }
}

/// Outcome of a validation run.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// Errors in detection order.
    pub errors: Vec<ValidationError>,
    /// Coerced variables of the selected operation, when request variables
    /// were supplied and coerced successfully.
    pub variables: Option<VariableValues>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts the errors into diagnostics for miette rendering.
    pub fn to_diagnostics(&self) -> Vec<Diag> {
        self.errors.iter().map(ValidationError::to_diag).collect()
    }

    /// Renders the errors as miette reports against the validated source.
    pub fn to_reports(&self, source: &str) -> Vec<Report> {
        convert_diagnostics_to_reports(&self.to_diagnostics(), &SourceFile::new(source))
    }
}

/// Runs validation rules over documents.
///
/// A validator is immutable once built and can be shared between threads;
/// each run keeps its state in a fresh [`ValidationContext`].
#[derive(Clone)]
pub struct DocumentValidator {
    config: ValidationConfig,
    rules: Vec<Arc<dyn ValidationRule>>,
    cached_rules: Option<Vec<Arc<dyn ValidationRule>>>,
}

impl Default for DocumentValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentValidator {
    /// Creates a validator running every built-in rule with default
    /// configuration.
    pub fn new() -> Self {
        Self::with_config(ValidationConfig::default())
    }

    /// Creates a validator with custom configuration.
    pub fn with_config(config: ValidationConfig) -> Self {
        Self {
            config,
            rules: default_rules(),
            cached_rules: None,
        }
    }

    /// Replaces the rule list. Rules run, and report, in the given order.
    pub fn with_rules(mut self, rules: Vec<Arc<dyn ValidationRule>>) -> Self {
        self.rules = rules;
        self
    }

    /// Sets the rules run for cached documents.
    pub fn with_cached_rules(mut self, rules: Vec<Arc<dyn ValidationRule>>) -> Self {
        self.cached_rules = Some(rules);
        self
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Rules that apply to `request`.
    fn rules_for(&self, request: &ValidationRequest<'_>) -> Vec<Arc<dyn ValidationRule>> {
        if !request.cached {
            return self.rules.clone();
        }
        match &self.cached_rules {
            Some(rules) => rules.clone(),
            None => self
                .rules
                .iter()
                .filter(|rule| rule.scope() == RuleScope::Request)
                .cloned()
                .collect(),
        }
    }

    fn context<'a>(&self, request: &ValidationRequest<'a>) -> ValidationContext<'a> {
        ValidationContext::new(
            request.schema,
            request.document,
            self.config.clone(),
            request.variables,
            request.operation_name,
        )
    }

    /// Validates a document.
    pub fn validate(&self, request: &ValidationRequest<'_>) -> ValidationResult {
        let rules = self.rules_for(request);
        debug!(rules = rules.len(), cached = request.cached, "validation started");

        let ctx = self.context(request);
        let mut visitors = Vec::with_capacity(rules.len());
        for rule in &rules {
            match rule.create_visitor(&ctx) {
                Some(visitor) => visitors.push(visitor),
                None => trace!(rule = rule.name(), "rule opted out"),
            }
        }

        self.run(ctx, visitors, request.document)
    }

    /// Validates a document, awaiting each rule's visitor construction.
    pub async fn validate_async(&self, request: &ValidationRequest<'_>) -> ValidationResult {
        let rules = self.rules_for(request);
        debug!(rules = rules.len(), cached = request.cached, "validation started");

        let ctx = self.context(request);
        let mut visitors = Vec::with_capacity(rules.len());
        for rule in &rules {
            match rule.create_visitor_async(&ctx).await {
                Some(visitor) => visitors.push(visitor),
                None => trace!(rule = rule.name(), "rule opted out"),
            }
        }

        self.run(ctx, visitors, request.document)
    }

    fn run<'a>(
        &self,
        ctx: ValidationContext<'a>,
        visitors: Vec<BoxedVisitor<'a>>,
        document: &'a Document,
    ) -> ValidationResult {
        let mut composite = CompositeVisitor { ctx, visitors };
        walk_document(&mut composite, document);

        let (mut errors, variables) = composite.ctx.into_parts();
        if let Some(max) = self.config.max_errors {
            errors.truncate(max);
        }
        debug!(errors = errors.len(), "validation finished");

        ValidationResult { errors, variables }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SDL: &str = r#"
        type Dog { name: String nickname: String barkVolume(loud: Boolean): Int }
        type Query { dog: Dog field(a: String, b: String): String }
    "#;

    fn schema() -> Schema {
        Schema::parse(SDL).expect("schema builds")
    }

    fn document(source: &str) -> Document {
        crate::parse(source).ast.expect("document parses")
    }

    #[test]
    fn valid_document_has_no_errors() {
        let schema = schema();
        let document = document("{ dog { name nickname } }");
        let result = DocumentValidator::new().validate(&ValidationRequest::new(&schema, &document));
        assert!(result.is_valid());
        assert!(result.errors.is_empty());
        assert!(result.variables.is_none());
    }

    #[test]
    fn validation_is_deterministic() {
        let schema = schema();
        let document = document("query Q($a: String) { dog { fido: name fido: nickname unknown } ...Missing }");
        let validator = DocumentValidator::new();
        let request = ValidationRequest::new(&schema, &document);
        let first = validator.validate(&request);
        let second = validator.validate(&request);
        assert!(!first.is_valid());
        assert_eq!(first.errors, second.errors);
    }

    #[test]
    fn max_errors_truncates() {
        let schema = schema();
        let document = document("{ a b c }");
        let validator =
            DocumentValidator::with_config(ValidationConfig::default().with_max_errors(2));
        let result = validator.validate(&ValidationRequest::new(&schema, &document));
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn cached_documents_skip_document_rules() {
        let schema = schema();
        let document = document("query($a: String) { missing }");
        let variables = Map::new();
        let request = ValidationRequest::new(&schema, &document)
            .with_variables(&variables)
            .cached(true);
        let result = DocumentValidator::new().validate(&request);
        assert!(result.is_valid());
        assert!(result.variables.is_some());
    }

    #[test]
    fn cached_rules_override() {
        let schema = schema();
        let document = document("{ missing }");
        let request = ValidationRequest::new(&schema, &document).cached(true);
        let validator = DocumentValidator::new()
            .with_cached_rules(vec![Arc::new(rules::FieldsOnCorrectType)]);
        let result = validator.validate(&request);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, "FIELDS_ON_CORRECT_TYPE");
    }

    #[test]
    fn async_validation_matches_sync() {
        let schema = schema();
        let document = document("{ dog { name(x: 1) } ...F }");
        let validator = DocumentValidator::new();
        let request = ValidationRequest::new(&schema, &document);
        let sync = validator.validate(&request);
        let asynchronous = futures::executor::block_on(validator.validate_async(&request));
        assert_eq!(sync.errors, asynchronous.errors);
    }

    #[test]
    fn errors_convert_to_diagnostics() {
        let schema = schema();
        let document = document("{ cat }");
        let result = DocumentValidator::new().validate(&ValidationRequest::new(&schema, &document));
        let diagnostics = result.to_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code.as_deref(), Some("FIELDS_ON_CORRECT_TYPE"));
        assert_eq!(diagnostics[0].labels.len(), 1);
    }

    #[test]
    fn validator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DocumentValidator>();
    }
}
