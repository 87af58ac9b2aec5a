//! Datatype model and registry
//!
//! Datatypes are named type definitions referenced by fields. A datatype can
//! extend another one and narrow it with a [`DatatypeRestriction`], modelled
//! after the facets of XML Schema Part 2.

use super::Options;
use super::error::{ConstructionError, ItemKind, Result, SchemaError};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Ids of the standard scalar datatypes, in registry order
pub const STANDARD_TYPE_IDS: [&str; 10] = [
    "string",
    "integer",
    "number",
    "boolean",
    "date",
    "time",
    "datetime",
    "year",
    "yearmonth",
    "monthday",
];

/// Datatype assigned to fields that do not name one
pub const DEFAULT_DATATYPE: &str = "string";

/// How white space (line feeds, tabs, spaces, carriage returns) is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhitespaceRestriction {
    Preserve,
    Replace,
    Collapse,
}

/// Value restriction attached to a datatype
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatatypeRestriction {
    /// Exclusive lower bound for numeric values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_exclusive: Option<f64>,
    /// Inclusive lower bound for numeric values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_inclusive: Option<f64>,
    /// Exclusive upper bound for numeric values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_exclusive: Option<f64>,
    /// Inclusive upper bound for numeric values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_inclusive: Option<f64>,
    /// Total number of digits allowed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_digits: Option<u32>,
    /// Maximum number of fractional digits allowed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraction_digits: Option<u32>,
    /// Exact length of a string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// Regular expression a string value must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Allowed values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub white_space: Option<WhitespaceRestriction>,
}

impl DatatypeRestriction {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns a copy where every facet unset here is taken from `base`
    pub fn inherit(&self, base: &DatatypeRestriction) -> DatatypeRestriction {
        DatatypeRestriction {
            min_exclusive: self.min_exclusive.or(base.min_exclusive),
            min_inclusive: self.min_inclusive.or(base.min_inclusive),
            max_exclusive: self.max_exclusive.or(base.max_exclusive),
            max_inclusive: self.max_inclusive.or(base.max_inclusive),
            total_digits: self.total_digits.or(base.total_digits),
            fraction_digits: self.fraction_digits.or(base.fraction_digits),
            length: self.length.or(base.length),
            min_length: self.min_length.or(base.min_length),
            max_length: self.max_length.or(base.max_length),
            pattern: self.pattern.clone().or_else(|| base.pattern.clone()),
            enumeration: self.enumeration.clone().or_else(|| base.enumeration.clone()),
            white_space: self.white_space.or(base.white_space),
        }
    }
}

/// A named datatype
///
/// Identity is the `id` alone: two datatypes with the same id compare equal
/// and hash identically regardless of their other attributes.
///
/// # Example
///
/// ```rust
/// use tabular_schema::models::{Datatype, DatatypeRestriction};
///
/// let postcode = Datatype::new("postcode").with_restriction(DatatypeRestriction {
///     max_length: Some(8),
///     ..Default::default()
/// });
/// assert_eq!(postcode, Datatype::new("postcode"));
/// ```
#[derive(Debug, Clone)]
pub struct Datatype {
    id: String,
    description: Option<String>,
    extends: Option<Box<Datatype>>,
    restriction: Option<DatatypeRestriction>,
    options: Options,
}

impl Datatype {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
            extends: None,
            restriction: None,
            options: Options::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the datatype this one extends
    pub fn with_extends(mut self, base: Datatype) -> Self {
        self.extends = Some(Box::new(base));
        self
    }

    pub fn with_restriction(mut self, restriction: DatatypeRestriction) -> Self {
        self.restriction = Some(restriction);
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn extends(&self) -> Option<&Datatype> {
        self.extends.as_deref()
    }

    pub fn restriction(&self) -> Option<&DatatypeRestriction> {
        self.restriction.as_ref()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Iterate over the `extends` chain, nearest ancestor first
    pub fn ancestors(&self) -> impl Iterator<Item = &Datatype> {
        std::iter::successors(self.extends(), |dt| dt.extends())
    }

    /// The root of the `extends` chain (the datatype itself if it extends nothing)
    pub fn base(&self) -> &Datatype {
        self.ancestors().last().unwrap_or(self)
    }

    /// Restriction merged along the whole `extends` chain.
    ///
    /// The nearest definition of each facet wins. Returns `None` when no
    /// datatype in the chain restricts anything.
    pub fn effective_restriction(&self) -> Option<DatatypeRestriction> {
        let merged = std::iter::once(self)
            .chain(self.ancestors())
            .filter_map(Datatype::restriction)
            .fold(DatatypeRestriction::default(), |acc, r| acc.inherit(r));
        (!merged.is_empty()).then_some(merged)
    }
}

impl PartialEq for Datatype {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Datatype {}

impl Hash for Datatype {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl AsRef<str> for Datatype {
    fn as_ref(&self) -> &str {
        &self.id
    }
}

/// Fresh instances of the ten standard scalar datatypes
pub fn standard_types() -> Vec<Datatype> {
    STANDARD_TYPE_IDS.iter().map(|id| Datatype::new(*id)).collect()
}

/// Ordered collection of datatypes with unique ids
#[derive(Debug, Clone)]
pub struct DatatypeRegistry {
    datatypes: Vec<Datatype>,
}

impl Default for DatatypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl DatatypeRegistry {
    /// Registry seeded with the standard scalar types
    pub fn standard() -> Self {
        Self {
            datatypes: standard_types(),
        }
    }

    /// Registry without any datatype, for callers supplying their own set
    pub fn empty() -> Self {
        Self {
            datatypes: Vec::new(),
        }
    }

    /// Build a registry from a replacement type collection, in order
    pub fn from_datatypes(datatypes: impl IntoIterator<Item = Datatype>) -> Result<Self> {
        let mut registry = Self::empty();
        for datatype in datatypes {
            registry.register(datatype)?;
        }
        Ok(registry)
    }

    /// Register a datatype.
    ///
    /// The id must be new and any datatype it extends must already be
    /// registered.
    pub fn register(&mut self, datatype: Datatype) -> Result<&Datatype> {
        if self.contains(datatype.id()) {
            return Err(ConstructionError::DuplicateId {
                kind: ItemKind::Datatype,
                id: datatype.id.clone(),
                container: "datatype registry".to_string(),
            }
            .into());
        }
        if let Some(base) = datatype.extends()
            && !self.contains(base.id())
        {
            return Err(ConstructionError::UnknownExtends {
                id: datatype.id.clone(),
                extends: base.id.clone(),
            }
            .into());
        }
        self.datatypes.push(datatype);
        Ok(&self.datatypes[self.datatypes.len() - 1])
    }

    /// Register `datatype` as an extension of the registered datatype `base_id`
    pub fn register_extending(&mut self, datatype: Datatype, base_id: &str) -> Result<&Datatype> {
        let base = self
            .datatypes
            .iter()
            .find(|dt| dt.id == base_id)
            .cloned()
            .ok_or_else(|| ConstructionError::UnknownExtends {
                id: datatype.id.clone(),
                extends: base_id.to_string(),
            })?;
        self.register(datatype.with_extends(base))
    }

    pub fn get(&self, id: &str) -> Result<&Datatype> {
        self.datatypes
            .iter()
            .find(|dt| dt.id == id)
            .ok_or_else(|| SchemaError::not_found(ItemKind::Datatype, id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.datatypes.iter().any(|dt| dt.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Datatype> {
        self.datatypes.iter()
    }

    pub fn as_slice(&self) -> &[Datatype] {
        &self.datatypes
    }

    pub fn len(&self) -> usize {
        self.datatypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datatypes.is_empty()
    }
}

impl<'a> IntoIterator for &'a DatatypeRegistry {
    type Item = &'a Datatype;
    type IntoIter = std::slice::Iter<'a, Datatype>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
