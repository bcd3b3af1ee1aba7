//! Common test utilities
//!
//! Shared fixtures and helpers for the integration tests.
//!
//! # Parsing Helpers
//! - [`parse_cleanly`] - Parse a document, panicking on diagnostics
//! - [`format_diagnostics`] - Format diagnostics for assertion messages
//!
//! # Validation Helpers
//! - [`schema`] - The shared pet-store schema
//! - [`validate_source`] - Parse and validate with every built-in rule
//! - [`validate_with`] - Parse and validate with an explicit validator and request options
//! - [`assert_no_validation_errors`] - Assert that a document is valid
//! - [`messages`] / [`codes`] - Project the error list for comparisons

#![allow(dead_code)]

use graphql_validator::{
    Document, DocumentValidator, Schema, ValidationError, ValidationRequest, ValidationResult,
    parse,
};
use serde_json::{Map, Value as JsonValue};

pub const SDL: &str = r#"
    interface Pet { name: String }

    enum DogCommand { SIT HEEL DOWN }

    type Dog implements Pet {
      name: String
      nickname: String
      barkVolume: Int
      doesKnowCommand(dogCommand: DogCommand!): Boolean
      isAtLocation(x: Int, y: Int): Boolean
      owner: Human
    }

    type Cat implements Pet {
      name: String
      meows: Boolean
    }

    union CatOrDog = Cat | Dog

    type Human {
      name(surname: Boolean): String
      pets: [Pet]
    }

    input Location { lat: Float! lon: Float! radius: Int = 10 }

    input PetFilter @oneOf { name: String minBarkVolume: Int }

    type QueryRoot {
      dog: Dog
      cat: Cat
      pet: Pet
      catOrDog: CatOrDog
      human(id: ID!): Human
      field(a: String, b: String): String
      stringArg(value: String): String
      nearby(location: Location!, limit: Int = 5): [Pet]
      findPet(filter: PetFilter): Pet
    }

    type SubscriptionRoot { newPet: Pet lostPet: Pet }

    schema { query: QueryRoot subscription: SubscriptionRoot }
"#;

/// Builds the shared schema.
pub fn schema() -> Schema {
    Schema::parse(SDL).expect("shared schema builds")
}

/// Format diagnostics for display in assertion messages.
pub fn format_diagnostics(diags: &[miette::Report]) -> String {
    diags
        .iter()
        .map(|diag| format!("{diag:?}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse source and return the document, panicking on any diagnostic.
pub fn parse_cleanly(source: &str) -> Document {
    let result = parse(source);
    assert!(
        result.diagnostics.is_empty(),
        "unexpected diagnostics for `{source}`:\n{}",
        format_diagnostics(&result.diagnostics)
    );
    result.ast.expect("parser should produce a document")
}

/// Parse source and validate it against the shared schema with every
/// built-in rule.
pub fn validate_source(source: &str) -> ValidationResult {
    let schema = schema();
    let document = parse_cleanly(source);
    graphql_validator::validate(&schema, &document)
}

/// Parse source and validate it with `validator`, optionally with request
/// variables.
pub fn validate_with(
    validator: &DocumentValidator,
    source: &str,
    variables: Option<JsonValue>,
) -> ValidationResult {
    let schema = schema();
    let document = parse_cleanly(source);
    let variables: Option<Map<String, JsonValue>> = variables.map(|value| match value {
        JsonValue::Object(map) => map,
        other => panic!("variables must be a JSON object, got {other}"),
    });

    let mut request = ValidationRequest::new(&schema, &document);
    if let Some(variables) = &variables {
        request = request.with_variables(variables);
    }
    validator.validate(&request)
}

/// Assert that the result holds no errors.
pub fn assert_no_validation_errors(result: &ValidationResult, source: &str) {
    assert!(
        result.is_valid(),
        "unexpected validation errors for `{source}`:\n{:#?}",
        messages(&result.errors)
    );
}

pub fn messages(errors: &[ValidationError]) -> Vec<&str> {
    errors.iter().map(|error| error.message.as_str()).collect()
}

pub fn codes(errors: &[ValidationError]) -> Vec<&'static str> {
    errors.iter().map(|error| error.code).collect()
}

/// The (line, column) pairs of an error.
pub fn locations(error: &ValidationError) -> Vec<(usize, usize)> {
    error
        .locations
        .iter()
        .map(|pos| (pos.line, pos.column))
        .collect()
}
