//! # Restriction rules
//!
//! Restrictions add extra keywords to a generated field schema: `maxLength`
//! for bounded strings, `enum` for enumerations, `format` for date and time
//! types. Rules are registered per type class and applied by walking the
//! matched class's inheritance chain; every registered ancestor along the
//! chain fires, not just the most specific one. An enumeration column, for
//! instance, picks up `enum` from its own class and `maxLength` from the
//! `String` ancestor when a length is declared.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};
use tabula_model::{NativeType, TypeClass};

/// A rule mutating the in-progress field schema for one type class.
pub type RestrictionRule = fn(&NativeType, &mut Map<String, Value>);

/// Adds `maxLength` for string types that declare a length.
pub fn string_max_length(native: &NativeType, field: &mut Map<String, Value>) {
    if let Some(length) = native.length() {
        field.insert("maxLength".to_string(), json!(length));
    }
}

/// Adds the ordered `enum` list of an enumeration type.
pub fn enum_values(native: &NativeType, field: &mut Map<String, Value>) {
    if let Some(values) = native.enum_values() {
        field.insert("enum".to_string(), json!(values));
    }
}

/// Marks a datetime field with `format: date-time`.
pub fn datetime_format(_native: &NativeType, field: &mut Map<String, Value>) {
    field.insert("format".to_string(), json!("date-time"));
}

/// Marks a date field with `format: date`.
pub fn date_format(_native: &NativeType, field: &mut Map<String, Value>) {
    field.insert("format".to_string(), json!("date"));
}

/// Marks a time field with `format: time`.
pub fn time_format(_native: &NativeType, field: &mut Map<String, Value>) {
    field.insert("format".to_string(), json!("time"));
}

/// The built-in rule table.
pub fn default_rules() -> BTreeMap<TypeClass, RestrictionRule> {
    BTreeMap::from([
        (TypeClass::String, string_max_length as RestrictionRule),
        (TypeClass::Enum, enum_values as RestrictionRule),
        (TypeClass::DateTime, datetime_format as RestrictionRule),
        (TypeClass::Date, date_format as RestrictionRule),
        (TypeClass::Time, time_format as RestrictionRule),
    ])
}

/// Registered restriction rules, keyed by type class.
#[derive(Debug, Clone)]
pub struct Restrictions {
    rules: BTreeMap<TypeClass, RestrictionRule>,
}

impl Default for Restrictions {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

impl Restrictions {
    pub fn new(rules: BTreeMap<TypeClass, RestrictionRule>) -> Self {
        Self { rules }
    }

    /// Adds or replaces the rule for one type class.
    pub fn with_rule(mut self, class: TypeClass, rule: RestrictionRule) -> Self {
        self.rules.insert(class, rule);
        self
    }

    /// Applies every rule registered for `matched` or one of its ancestors.
    ///
    /// `matched` is the class the classifier resolved, so restriction
    /// lookups start where classification stopped.
    pub fn apply(&self, matched: TypeClass, native: &NativeType, field: &mut Map<String, Value>) {
        for ancestor in matched.ancestors() {
            if let Some(rule) = self.rules.get(ancestor) {
                rule(native, field);
            }
        }
    }
}
