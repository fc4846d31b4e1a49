//! Declarative record layout
//!
//! The legacy files store every record under one top-level variable, and two
//! of its array fields carry an extra wrapper dimension that generic squeezing
//! leaves in place. Which fields those are is a property of the dataset, not
//! something derivable from the data, so it is listed here as a table of
//! per-field rules rather than inferred.

/// Top-level variable holding the record in the legacy files
pub const DEFAULT_VARIABLE: &str = "data";

/// Fields stored with an extra wrapper dimension in the legacy files
pub const DEFAULT_FLATTEN_FIELDS: [&str; 2] = ["spikes", "channel"];

/// Shape normalization applied to one field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalize {
    /// Single element → scalar, otherwise keep the stored shape
    #[default]
    Generic,
    /// Always a one-dimensional array, whatever the stored shape
    Flatten,
}

/// Rule for a named field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub name: String,
    pub normalize: Normalize,
}

/// Where a record lives in the file and how its fields are normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    variable: String,
    rules: Vec<FieldRule>,
}

impl RecordSchema {
    /// Schema with no field rules; every field is [`Normalize::Generic`]
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            rules: Vec::new(),
        }
    }

    /// The legacy spike-sorting layout: record under `data`, `spikes` and
    /// `channel` flattened
    pub fn spike_sorting() -> Self {
        Self::new(DEFAULT_VARIABLE).with_flatten_fields(DEFAULT_FLATTEN_FIELDS)
    }

    /// Add or replace the rule for `name`
    pub fn with_rule(mut self, name: impl Into<String>, normalize: Normalize) -> Self {
        let name = name.into();
        match self.rules.iter_mut().find(|rule| rule.name == name) {
            Some(rule) => rule.normalize = normalize,
            None => self.rules.push(FieldRule { name, normalize }),
        }
        self
    }

    /// Replace the rule table with `Flatten` rules for `fields`
    pub fn with_flatten_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.clear();
        for field in fields {
            self = self.with_rule(field, Normalize::Flatten);
        }
        self
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Explicit rules; every one names a field the record must declare
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Rule for `field`, [`Normalize::Generic`] when not listed
    pub fn rule_for(&self, field: &str) -> Normalize {
        self.rules
            .iter()
            .find(|rule| rule.name == field)
            .map(|rule| rule.normalize)
            .unwrap_or_default()
    }
}

impl Default for RecordSchema {
    fn default() -> Self {
        Self::spike_sorting()
    }
}
