//! Built-in validation rules.
//!
//! Each rule is a unit struct implementing [`ValidationRule`]; the per-run
//! state lives in a private visitor. Rules are grouped by the part of the
//! document they check.

use std::sync::Arc;

use super::ValidationRule;

/// Declares a unit rule struct with its name and error code.
///
/// The plain form creates the rule's visitor with `Default`; the closure form
/// decides per run, and may opt out by returning `None`.
macro_rules! declare_rule {
    ($(#[$meta:meta])* $rule:ident, $code:literal, $visitor:ident) => {
        declare_rule!($(#[$meta])* $rule, $code, |_ctx| Some(Box::new($visitor::default())));
    };
    ($(#[$meta:meta])* $rule:ident, $code:literal, |$ctx:ident| $body:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $rule;

        impl $rule {
            pub const CODE: &'static str = $code;
        }

        impl $crate::validation::ValidationRule for $rule {
            fn name(&self) -> &'static str {
                stringify!($rule)
            }

            fn code(&self) -> &'static str {
                Self::CODE
            }

            fn create_visitor<'a>(
                &self,
                $ctx: &$crate::validation::ValidationContext<'a>,
            ) -> Option<$crate::validation::BoxedVisitor<'a>> {
                $body
            }
        }
    };
}

mod arguments;
mod directives;
mod fragments;
mod operations;
mod overlapping_fields;
mod types;
mod values;
mod variables;

pub use arguments::{
    ArgumentsOfCorrectType, KnownArgumentNames, ProvidedRequiredArguments, UniqueArgumentNames,
};
pub use directives::{KnownDirectives, UniqueDirectivesPerLocation};
pub use fragments::{
    KnownFragmentNames, NoFragmentCycles, NoUnusedFragments, PossibleFragmentSpreads,
    UniqueFragmentNames,
};
pub use operations::{
    ExecutableDefinitions, LoneAnonymousOperation, SingleRootFieldSubscriptions,
    UniqueOperationNames,
};
pub use overlapping_fields::OverlappingFieldsCanBeMerged;
pub use types::{
    FieldsOnCorrectType, FragmentsOnCompositeTypes, KnownTypeNames, ScalarLeafs,
    VariablesAreInputTypes,
};
pub use values::{DefaultValuesOfCorrectType, UniqueInputFieldNames, ValuesOfCorrectType};
pub use variables::{
    NoUndefinedVariables, NoUnusedVariables, UniqueVariableNames, VariableValuesOfCorrectType,
    VariablesInAllowedPosition,
};

/// Every built-in rule, in registration order.
pub fn default_rules() -> Vec<Arc<dyn ValidationRule>> {
    vec![
        Arc::new(ExecutableDefinitions),
        Arc::new(UniqueOperationNames),
        Arc::new(LoneAnonymousOperation),
        Arc::new(SingleRootFieldSubscriptions),
        Arc::new(KnownTypeNames),
        Arc::new(FragmentsOnCompositeTypes),
        Arc::new(VariablesAreInputTypes),
        Arc::new(ScalarLeafs),
        Arc::new(FieldsOnCorrectType),
        Arc::new(UniqueFragmentNames),
        Arc::new(KnownFragmentNames),
        Arc::new(NoUnusedFragments),
        Arc::new(PossibleFragmentSpreads),
        Arc::new(NoFragmentCycles),
        Arc::new(UniqueVariableNames),
        Arc::new(NoUndefinedVariables),
        Arc::new(NoUnusedVariables),
        Arc::new(KnownDirectives),
        Arc::new(UniqueDirectivesPerLocation),
        Arc::new(KnownArgumentNames),
        Arc::new(UniqueArgumentNames),
        Arc::new(ArgumentsOfCorrectType),
        Arc::new(ValuesOfCorrectType),
        Arc::new(ProvidedRequiredArguments),
        Arc::new(DefaultValuesOfCorrectType),
        Arc::new(VariablesInAllowedPosition),
        Arc::new(OverlappingFieldsCanBeMerged),
        Arc::new(UniqueInputFieldNames),
        Arc::new(VariableValuesOfCorrectType),
    ]
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared harness for rule unit tests.

    use std::sync::Arc;

    use crate::schema::Schema;
    use crate::validation::{
        DocumentValidator, ValidationConfig, ValidationError, ValidationRequest, ValidationRule,
    };

    pub const SDL: &str = r#"
        interface Being { name(surname: Boolean): String }
        interface Pet implements Being { name(surname: Boolean): String }
        interface Canine implements Pet & Being { name(surname: Boolean): String }

        enum DogCommand { SIT HEEL DOWN }
        enum FurColor { BROWN BLACK TAN SPOTTED }

        type Dog implements Being & Pet & Canine {
          name(surname: Boolean): String
          nickname: String
          barkVolume: Int
          barks: Boolean
          doesKnowCommand(dogCommand: DogCommand): Boolean
          isHouseTrained(atOtherHomes: Boolean = true): Boolean
          isAtLocation(x: Int, y: Int): Boolean
        }

        type Cat implements Being & Pet {
          name(surname: Boolean): String
          nickname: String
          meows: Boolean
          meowsVolume: Int
          furColor: FurColor
        }

        union CatOrDog = Cat | Dog

        type Human implements Being {
          name(surname: Boolean): String
          pets: [Pet]
          relatives: [Human]
          iq: Int
        }

        type Alien implements Being {
          name(surname: Boolean): String
          numEyes: Int
        }

        union DogOrHuman = Dog | Human
        union HumanOrAlien = Human | Alien

        input ComplexInput {
          requiredField: Boolean!
          nonNullField: Boolean! = false
          intField: Int
          stringField: String
          booleanField: Boolean
          stringListField: [String]
        }

        input OneOfInput @oneOf { stringField: String intField: Int }

        type ComplicatedArgs {
          intArgField(intArg: Int): String
          nonNullIntArgField(nonNullIntArg: Int!): String
          stringArgField(stringArg: String): String
          booleanArgField(booleanArg: Boolean): String
          enumArgField(enumArg: FurColor): String
          floatArgField(floatArg: Float): String
          idArgField(idArg: ID): String
          stringListArgField(stringListArg: [String]): String
          stringListNonNullArgField(stringListNonNullArg: [String!]): String
          complexArgField(complexArg: ComplexInput): String
          oneOfArgField(oneOfArg: OneOfInput): String
          multipleReqs(req1: Int!, req2: Int!): String
          nonNullFieldWithDefault(arg: Int! = 0): String
          multipleOpts(opt1: Int = 0, opt2: Int = 0): String
          multipleOptAndReq(req1: Int!, req2: Int!, opt1: Int = 0, opt2: Int = 0): String
        }

        type QueryRoot {
          human(id: ID): Human
          alien: Alien
          dog: Dog
          cat: Cat
          pet: Pet
          catOrDog: CatOrDog
          dogOrHuman: DogOrHuman
          humanOrAlien: HumanOrAlien
          complicatedArgs: ComplicatedArgs
        }

        type SubscriptionRoot { importantEmails: [String] notImportantEmails: [String] }

        schema { query: QueryRoot subscription: SubscriptionRoot }

        directive @onField on FIELD
        directive @onQuery on QUERY
        directive @repeatableOnField repeatable on FIELD
    "#;

    pub fn schema() -> Schema {
        Schema::parse(SDL).expect("harness schema builds")
    }

    fn run(rule: Arc<dyn ValidationRule>, config: ValidationConfig, source: &str) -> Vec<ValidationError> {
        let schema = schema();
        let document = crate::parse(source).ast.expect("document parses");
        DocumentValidator::with_config(config)
            .with_rules(vec![rule])
            .validate(&ValidationRequest::new(&schema, &document))
            .errors
    }

    /// Runs one rule and returns its error messages.
    pub fn messages<R: ValidationRule + 'static>(rule: R, source: &str) -> Vec<String> {
        errors(rule, source).into_iter().map(|e| e.message).collect()
    }

    /// Runs one rule and returns its errors.
    pub fn errors<R: ValidationRule + 'static>(rule: R, source: &str) -> Vec<ValidationError> {
        run(Arc::new(rule), ValidationConfig::default(), source)
    }

    /// Runs one rule with a custom configuration.
    pub fn errors_with<R: ValidationRule + 'static>(
        rule: R,
        config: ValidationConfig,
        source: &str,
    ) -> Vec<ValidationError> {
        run(Arc::new(rule), config, source)
    }

    /// Line and column of each location of `error`.
    pub fn locations(error: &ValidationError) -> Vec<(usize, usize)> {
        error
            .locations
            .iter()
            .map(|pos| (pos.line, pos.column))
            .collect()
    }
}
