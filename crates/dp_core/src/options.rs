//! The option system (§4.1): name-keyed, phase-gated configuration
//! shared by every `Primitive`. Grounded on the original engine's
//! `options/all_options.cpp` grouping (options become available in waves as
//! earlier ones are set) and a validate-then-store registry pattern for
//! named, typed parameters.

use crate::errors::CoreError;
use std::collections::{BTreeMap, BTreeSet};

/// When an option may be set. `PreFit` options (e.g. which columns to
/// consider) must be set before `Primitive::fit`; `PostFit` options (e.g.
/// a distance threshold) only become available afterward, mirroring the
/// original engine's staged option availability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum OptionPhase {
    PreFit,
    PostFit,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    UIntList(Vec<u64>),
    Enum(String),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            OptionValue::UInt(u) => Some(*u),
            OptionValue::Int(i) if *i >= 0 => Some(*i as u64),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            OptionValue::Float(f) => Some(*f),
            OptionValue::Int(i) => Some(*i as f64),
            OptionValue::UInt(u) => Some(*u as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) | OptionValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_uint_list(&self) -> Option<&[u64]> {
        match self {
            OptionValue::UIntList(v) => Some(v),
            _ => None,
        }
    }

    /// Case-insensitive enum match, per the original engine's string-keyed
    /// enum option parsing.
    pub fn as_enum_matching(&self, choices: &[&str]) -> Option<String> {
        let raw = self.as_str()?;
        choices
            .iter()
            .find(|c| c.eq_ignore_ascii_case(raw))
            .map(|c| c.to_string())
    }
}

pub type Validator = fn(&OptionValue) -> Result<(), String>;

#[derive(Clone)]
pub struct OptionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub phase: OptionPhase,
    pub default: Option<OptionValue>,
    pub validator: Option<Validator>,
}

impl OptionSpec {
    pub fn new(name: &'static str, description: &'static str, phase: OptionPhase) -> Self {
        Self { name, description, phase, default: None, validator: None }
    }

    pub fn with_default(mut self, default: OptionValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }
}

/// Registry of declared options for one `Primitive`. Options are declared
/// once up front; `make_available` opens a wave of previously-hidden
/// options (called by the primitive itself once a prerequisite option has
/// been set), matching the original engine's "option becomes visible after
/// its dependency is set" behavior.
#[derive(Default)]
pub struct OptionsRegistry {
    specs: BTreeMap<&'static str, OptionSpec>,
    available: BTreeSet<&'static str>,
    values: BTreeMap<&'static str, OptionValue>,
}

impl OptionsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: OptionSpec) {
        let name = spec.name;
        let available = spec.phase == OptionPhase::PreFit;
        if let Some(default) = spec.default.clone() {
            self.values.insert(name, default);
        }
        self.specs.insert(name, spec);
        if available {
            self.available.insert(name);
        }
    }

    pub fn make_available(&mut self, name: &'static str) {
        if self.specs.contains_key(name) {
            self.available.insert(name);
        }
    }

    pub fn is_available(&self, name: &str) -> bool {
        self.available.contains(name)
    }

    pub fn set(&mut self, name: &str, value: OptionValue) -> Result<(), CoreError> {
        let spec = self
            .specs
            .get(name)
            .ok_or_else(|| CoreError::UnknownOption(name.to_string()))?;
        if !self.available.contains(name) {
            return Err(CoreError::OptionUnavailable(name.to_string()));
        }
        if let Some(validate) = spec.validator {
            validate(&value).map_err(|reason| CoreError::InvalidValue {
                name: name.to_string(),
                reason,
            })?;
        }
        self.values.insert(spec.name, value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_negative(v: &OptionValue) -> Result<(), String> {
        match v.as_float() {
            Some(f) if f >= 0.0 => Ok(()),
            Some(_) => Err("must be non-negative".to_string()),
            None => Err("expected a number".to_string()),
        }
    }

    #[test]
    fn prefit_option_available_immediately() {
        let mut reg = OptionsRegistry::new();
        reg.register(OptionSpec::new("lhs_columns", "columns to consider", OptionPhase::PreFit));
        assert!(reg.is_available("lhs_columns"));
        assert!(reg.set("lhs_columns", OptionValue::UIntList(vec![0, 1])).is_ok());
    }

    #[test]
    fn postfit_option_unavailable_until_opened() {
        let mut reg = OptionsRegistry::new();
        reg.register(OptionSpec::new("threshold", "distance threshold", OptionPhase::PostFit));
        let err = reg.set("threshold", OptionValue::Float(0.1)).unwrap_err();
        assert!(matches!(err, CoreError::OptionUnavailable(_)));
        reg.make_available("threshold");
        assert!(reg.set("threshold", OptionValue::Float(0.1)).is_ok());
    }

    #[test]
    fn validator_rejects_bad_value() {
        let mut reg = OptionsRegistry::new();
        reg.register(
            OptionSpec::new("threshold", "distance threshold", OptionPhase::PreFit)
                .with_validator(non_negative),
        );
        let err = reg.set("threshold", OptionValue::Float(-1.0)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidValue { .. }));
    }

    #[test]
    fn unknown_option_rejected() {
        let mut reg = OptionsRegistry::new();
        let err = reg.set("nope", OptionValue::Bool(true)).unwrap_err();
        assert!(matches!(err, CoreError::UnknownOption(_)));
    }

    #[test]
    fn enum_matching_is_case_insensitive() {
        let v = OptionValue::Enum("Brute".to_string());
        assert_eq!(v.as_enum_matching(&["brute", "approx"]).as_deref(), Some("brute"));
    }
}
