//! Coerced values tagged with where they came from.

use std::collections::BTreeMap;

use smol_str::SmolStr;

use crate::ast::ConstValue;

/// Where a coerced value came from. Execution relies on this tag for
/// defaulting semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// Written as a literal in the document.
    Literal,
    /// Supplied by the request variables.
    Variable,
    /// The variable was omitted and its declared default was used.
    VariableDefault,
    /// The argument was omitted (or its variable had no value) and the
    /// argument's schema default was used.
    FieldDefault,
}

/// A coerced variable value.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableValue {
    pub value: ConstValue,
    /// `Variable` or `VariableDefault`.
    pub provenance: Provenance,
}

/// Coerced variable values of one operation.
///
/// Variables that were omitted and have no default are absent, which is
/// distinct from an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableValues {
    values: BTreeMap<SmolStr, VariableValue>,
}

impl VariableValues {
    /// Creates an empty set of values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a value.
    pub fn insert(&mut self, name: impl Into<SmolStr>, value: ConstValue, provenance: Provenance) {
        self.values.insert(name.into(), VariableValue { value, provenance });
    }

    /// Looks up a variable.
    pub fn get(&self, name: &str) -> Option<&VariableValue> {
        self.values.get(name)
    }

    /// Looks up a variable's value.
    pub fn value(&self, name: &str) -> Option<&ConstValue> {
        self.get(name).map(|variable| &variable.value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over variables sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &VariableValue)> {
        self.values.iter()
    }

    /// Converts the values into a JSON object.
    pub fn to_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.values
            .iter()
            .map(|(name, variable)| (name.to_string(), variable.value.to_json()))
            .collect()
    }
}

/// A coerced argument value.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedArgument {
    pub value: ConstValue,
    pub provenance: Provenance,
}

/// Coerced arguments of a field or directive, keyed by argument name.
/// Omitted optional arguments without defaults are absent.
pub type CoercedArguments = BTreeMap<SmolStr, CoercedArgument>;
