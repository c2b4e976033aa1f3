//! Directory attributes with RFC2849 option support
//!
//! An attribute name may carry additional descriptors ("options") separated
//! by semicolons, e.g. `userCertificate;binary` or `description;lang-en`.
//! [`LdapAttribute`] holds the attribute id, its values, and the option set.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{DirSourceError, DirSourceResult};

/// A single attribute value, either textual or binary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// A UTF-8 string value.
    Str(String),
    /// A raw binary value.
    Binary(Vec<u8>),
}

impl AttributeValue {
    /// Get as a string if this is a textual value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Str(s) => Some(s),
            AttributeValue::Binary(_) => None,
        }
    }

    /// Get the raw bytes of the value.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            AttributeValue::Str(s) => s.as_bytes(),
            AttributeValue::Binary(b) => b,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Str(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Str(s)
    }
}

impl From<Vec<u8>> for AttributeValue {
    fn from(b: Vec<u8>) -> Self {
        AttributeValue::Binary(b)
    }
}

impl From<&[u8]> for AttributeValue {
    fn from(b: &[u8]) -> Self {
        AttributeValue::Binary(b.to_vec())
    }
}

/// A directory attribute: an id, zero or more values, and a set of RFC2849
/// options.
///
/// Values are either order-significant or not, chosen at construction.
/// Options are backed by a `HashSet<String>`; duplicates collapse and
/// insertion order is irrelevant. The option set is never absent — it starts
/// empty and callers may replace it wholesale via
/// [`set_options`](LdapAttribute::set_options).
///
/// The attribute is not synchronized; concurrent mutation is the caller's
/// responsibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapAttribute {
    id: String,
    values: Vec<AttributeValue>,
    ordered: bool,
    options: HashSet<String>,
}

impl LdapAttribute {
    /// Create an unordered attribute with the given id and no values.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: Vec::new(),
            ordered: false,
            options: HashSet::new(),
        }
    }

    /// Create an attribute whose values are order-significant.
    pub fn ordered(id: impl Into<String>) -> Self {
        Self {
            ordered: true,
            ..Self::new(id)
        }
    }

    /// Parse an RFC2849 attribute description such as `cn;binary;lang-en`
    /// into an attribute with the trailing segments as options.
    pub fn parse_description(description: &str) -> DirSourceResult<Self> {
        let mut segments = description.split(';');
        let id = segments.next().unwrap_or("").trim();
        if id.is_empty() {
            return Err(DirSourceError::invalid_configuration(
                "attribute description must start with an attribute id",
            ));
        }

        let mut attribute = Self::new(id);
        for segment in segments {
            let segment = segment.trim();
            if !segment.is_empty() {
                attribute.options.insert(segment.to_string());
            }
        }
        Ok(attribute)
    }

    /// Append a value, builder style.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<AttributeValue>) -> Self {
        self.values.push(value.into());
        self
    }

    /// Append values, builder style.
    #[must_use]
    pub fn with_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<AttributeValue>,
    {
        self.values.extend(values.into_iter().map(Into::into));
        self
    }

    /// Seed the option set, builder style.
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.extend(options.into_iter().map(Into::into));
        self
    }

    /// Get the attribute id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the values are order-significant.
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    /// Get the first value, if any.
    pub fn value(&self) -> Option<&AttributeValue> {
        self.values.first()
    }

    /// Get all values.
    pub fn values(&self) -> &[AttributeValue] {
        &self.values
    }

    /// Append a value.
    pub fn add_value(&mut self, value: impl Into<AttributeValue>) {
        self.values.push(value.into());
    }

    /// Check whether the given value is present.
    pub fn contains_value(&self, value: &AttributeValue) -> bool {
        self.values.contains(value)
    }

    /// Remove the first occurrence of the given value.
    ///
    /// Returns whether it was present.
    pub fn remove_value(&mut self, value: &AttributeValue) -> bool {
        match self.values.iter().position(|v| v == value) {
            Some(index) => {
                self.values.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the attribute has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the option set.
    ///
    /// This is the live set, not a copy.
    pub fn options(&self) -> &HashSet<String> {
        &self.options
    }

    /// Get mutable access to the option set.
    pub fn options_mut(&mut self) -> &mut HashSet<String> {
        &mut self.options
    }

    /// Replace the option set wholesale.
    pub fn set_options(&mut self, options: HashSet<String>) {
        self.options = options;
    }

    /// Add an option.
    ///
    /// Returns false if the option was already present.
    pub fn add_option(&mut self, option: impl Into<String>) -> bool {
        self.options.insert(option.into())
    }

    /// Add every option in the iterator.
    ///
    /// Returns whether the set changed.
    pub fn add_options<I, S>(&mut self, options: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut changed = false;
        for option in options {
            changed |= self.options.insert(option.into());
        }
        changed
    }

    /// Clear all stored options.
    pub fn clear_options(&mut self) {
        self.options.clear();
    }

    /// Check for the presence of a particular option.
    pub fn contains_option(&self, option: &str) -> bool {
        self.options.contains(option)
    }

    /// Check that every option in the iterator is present.
    pub fn contains_all_options<'a, I>(&self, options: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        options.into_iter().all(|o| self.options.contains(o))
    }

    /// Whether any options are set.
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// Remove an option.
    ///
    /// Returns whether it was present.
    pub fn remove_option(&mut self, option: &str) -> bool {
        self.options.remove(option)
    }

    /// Remove every option in the iterator.
    ///
    /// Returns whether the set changed.
    pub fn remove_options<'a, I>(&mut self, options: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut changed = false;
        for option in options {
            changed |= self.options.remove(option);
        }
        changed
    }

    /// Drop any option not listed in the iterator.
    ///
    /// Returns whether the set changed.
    pub fn retain_options<'a, I>(&mut self, options: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keep: HashSet<&str> = options.into_iter().collect();
        let before = self.options.len();
        self.options.retain(|o| keep.contains(o.as_str()));
        self.options.len() != before
    }

    /// Render the RFC2849 attribute description: the id followed by the
    /// options joined with `;`, options sorted for deterministic output.
    pub fn description(&self) -> String {
        if self.options.is_empty() {
            return self.id.clone();
        }
        let mut options: Vec<&str> = self.options.iter().map(String::as_str).collect();
        options.sort_unstable();
        format!("{};{}", self.id, options.join(";"))
    }
}

impl PartialEq for LdapAttribute {
    fn eq(&self, other: &Self) -> bool {
        if self.id != other.id || self.options != other.options {
            return false;
        }
        if self.values.len() != other.values.len() {
            return false;
        }
        if self.ordered || other.ordered {
            return self.values == other.values;
        }
        // unordered: compare as a multiset
        let mut remaining: Vec<&AttributeValue> = other.values.iter().collect();
        for value in &self.values {
            match remaining.iter().position(|r| *r == value) {
                Some(index) => {
                    remaining.swap_remove(index);
                }
                None => return false,
            }
        }
        true
    }
}

impl Eq for LdapAttribute {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_empty_options() {
        let attr = LdapAttribute::new("cn");
        assert_eq!(attr.id(), "cn");
        assert!(!attr.has_options());
        assert!(attr.is_empty());
        assert!(!attr.is_ordered());
    }

    #[test]
    fn test_builder_constructors() {
        let attr = LdapAttribute::ordered("member")
            .with_value("cn=a,dc=example,dc=com")
            .with_value("cn=b,dc=example,dc=com")
            .with_options(["binary"]);

        assert!(attr.is_ordered());
        assert_eq!(attr.len(), 2);
        assert_eq!(
            attr.value().and_then(AttributeValue::as_str),
            Some("cn=a,dc=example,dc=com")
        );
        assert!(attr.contains_option("binary"));
    }

    #[test]
    fn test_add_option_then_contains() {
        let mut attr = LdapAttribute::new("userCertificate");
        assert!(attr.add_option("binary"));
        assert!(attr.contains_option("binary"));
    }

    #[test]
    fn test_add_option_idempotence() {
        let mut attr = LdapAttribute::new("cn");
        assert!(attr.add_option("lang-en"));
        assert!(!attr.add_option("lang-en"));
        assert_eq!(attr.options().len(), 1);
    }

    #[test]
    fn test_clear_options() {
        let mut attr = LdapAttribute::new("cn").with_options(["a", "b"]);
        assert!(attr.has_options());
        attr.clear_options();
        assert!(!attr.has_options());
    }

    #[test]
    fn test_retain_options() {
        let mut attr = LdapAttribute::new("cn");
        assert!(attr.add_options(["a", "b"]));
        assert!(attr.retain_options(["a"]));
        assert!(attr.contains_option("a"));
        assert!(!attr.contains_option("b"));
        assert_eq!(attr.options().len(), 1);
    }

    #[test]
    fn test_remove_option_returns_presence() {
        let mut attr = LdapAttribute::new("cn").with_options(["binary"]);
        assert!(attr.remove_option("binary"));
        assert!(!attr.remove_option("binary"));
    }

    #[test]
    fn test_remove_and_contains_all() {
        let mut attr = LdapAttribute::new("cn").with_options(["a", "b", "c"]);
        assert!(attr.contains_all_options(["a", "b"]));
        assert!(!attr.contains_all_options(["a", "z"]));
        assert!(attr.remove_options(["a", "b"]));
        assert!(!attr.remove_options(["a", "b"]));
        assert_eq!(attr.options().len(), 1);
    }

    #[test]
    fn test_set_options_replaces_wholesale() {
        let mut attr = LdapAttribute::new("cn").with_options(["old"]);
        let replacement: HashSet<String> = ["new".to_string()].into_iter().collect();
        attr.set_options(replacement);
        assert!(attr.contains_option("new"));
        assert!(!attr.contains_option("old"));
    }

    #[test]
    fn test_parse_description() {
        let attr = LdapAttribute::parse_description("userCertificate;binary").unwrap();
        assert_eq!(attr.id(), "userCertificate");
        assert!(attr.contains_option("binary"));

        let plain = LdapAttribute::parse_description("cn").unwrap();
        assert_eq!(plain.id(), "cn");
        assert!(!plain.has_options());

        assert!(LdapAttribute::parse_description(";binary").is_err());
        assert!(LdapAttribute::parse_description("").is_err());
    }

    #[test]
    fn test_description_is_deterministic() {
        let attr = LdapAttribute::new("description").with_options(["lang-en", "binary"]);
        assert_eq!(attr.description(), "description;binary;lang-en");
        assert_eq!(LdapAttribute::new("cn").description(), "cn");
    }

    #[test]
    fn test_value_removal() {
        let mut attr = LdapAttribute::new("cn").with_values(["a", "b", "a"]);
        assert!(attr.remove_value(&"a".into()));
        assert_eq!(attr.len(), 2);
        assert!(attr.contains_value(&"a".into()));
        assert!(!attr.remove_value(&"z".into()));
    }

    #[test]
    fn test_unordered_equality_ignores_value_order() {
        let left = LdapAttribute::new("cn").with_values(["a", "b"]);
        let right = LdapAttribute::new("cn").with_values(["b", "a"]);
        assert_eq!(left, right);
    }

    #[test]
    fn test_ordered_equality_respects_value_order() {
        let left = LdapAttribute::ordered("cn").with_values(["a", "b"]);
        let right = LdapAttribute::ordered("cn").with_values(["b", "a"]);
        assert_ne!(left, right);
    }

    #[test]
    fn test_equality_includes_options() {
        let left = LdapAttribute::new("cn").with_options(["binary"]);
        let right = LdapAttribute::new("cn");
        assert_ne!(left, right);
    }

    #[test]
    fn test_binary_values() {
        let attr = LdapAttribute::new("userCertificate")
            .with_value(vec![0xde, 0xad, 0xbe, 0xef])
            .with_options(["binary"]);
        assert_eq!(attr.value().map(AttributeValue::as_bytes), Some(&[0xde, 0xad, 0xbe, 0xef][..]));
        assert_eq!(attr.value().and_then(AttributeValue::as_str), None);
    }

    #[test]
    fn test_serialization_round_trip() {
        let attr = LdapAttribute::new("cn")
            .with_value("admin")
            .with_options(["lang-en"]);
        let json = serde_json::to_string(&attr).unwrap();
        let parsed: LdapAttribute = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, attr);
    }
}
