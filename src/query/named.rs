//! Names for facet, group and highlight sub-queries
//!
//! The engine reports facet, group and highlight results keyed by a name. For
//! facets the parser asks for a synthetic key (`{!key=f0}cat`) so the result
//! can be traced back to the exact facet definition that produced it; group commands
//! and highlight fields cannot be aliased, so the name is the literal string
//! the engine echoes back. Groups and highlights are reported in separate
//! response sections, so each kind of sub-query has its own name space. The
//! association lives for one request.

use super::criteria::Criteria;
use super::facet::{FacetField, FacetRange, PivotField};
use super::highlight::HighlightField;
use super::models::GroupSpec;

/// A sub-query that results are reported for by name
#[derive(Debug, Clone, PartialEq)]
pub enum NamedObject {
    FacetField(FacetField),
    Pivot(PivotField),
    Range(FacetRange),
    FacetQuery(Criteria),
    Group(GroupSpec),
    Highlight(HighlightField),
}

/// Response section a named sub-query is reported in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameSpace {
    Facet,
    Group,
    Highlight,
}

impl NamedObject {
    pub fn name_space(&self) -> NameSpace {
        match self {
            Self::FacetField(_) | Self::Pivot(_) | Self::Range(_) | Self::FacetQuery(_) => {
                NameSpace::Facet
            }
            Self::Group(_) => NameSpace::Group,
            Self::Highlight(_) => NameSpace::Highlight,
        }
    }
}

/// Name → sub-query association for one request/response cycle
#[derive(Debug, Clone, Default)]
pub struct NamedObjects {
    enabled: bool,
    entries: Vec<(String, NamedObject)>,
    sequence: usize,
}

impl NamedObjects {
    /// Association that hands out synthetic names
    pub fn new() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// No-op association: sub-queries keep their plain names
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Allocate a fresh synthetic name `<prefix><n>` for `object`.
    ///
    /// Returns `None` when disabled.
    pub fn assign(&mut self, prefix: &str, object: NamedObject) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let name = loop {
            let candidate = format!("{}{}", prefix, self.sequence);
            self.sequence += 1;
            if self.get(&candidate).is_none() {
                break candidate;
            }
        };
        self.entries.push((name.clone(), object));
        Some(name)
    }

    /// Record an engine-chosen name. Within one name space the first object
    /// bound to a name wins.
    ///
    /// Returns `false` if the name was already taken or the association is disabled.
    pub fn bind(&mut self, name: impl Into<String>, object: NamedObject) -> bool {
        if !self.enabled {
            return false;
        }
        let name = name.into();
        if self.get_in(object.name_space(), &name).is_some() {
            return false;
        }
        self.entries.push((name, object));
        true
    }

    /// First object named `name`, in any name space
    pub fn get(&self, name: &str) -> Option<&NamedObject> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, o)| o)
    }

    pub fn get_in(&self, space: NameSpace, name: &str) -> Option<&NamedObject> {
        self.entries
            .iter()
            .find(|(n, o)| n == name && o.name_space() == space)
            .map(|(_, o)| o)
    }

    /// Entries in the order they were named
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NamedObject)> {
        self.entries.iter().map(|(n, o)| (n.as_str(), o))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn facet_field(&self, name: &str) -> Option<&FacetField> {
        match self.get_in(NameSpace::Facet, name) {
            Some(NamedObject::FacetField(field)) => Some(field),
            _ => None,
        }
    }

    pub fn pivot(&self, name: &str) -> Option<&PivotField> {
        match self.get_in(NameSpace::Facet, name) {
            Some(NamedObject::Pivot(pivot)) => Some(pivot),
            _ => None,
        }
    }

    pub fn range(&self, name: &str) -> Option<&FacetRange> {
        match self.get_in(NameSpace::Facet, name) {
            Some(NamedObject::Range(range)) => Some(range),
            _ => None,
        }
    }

    pub fn facet_query(&self, name: &str) -> Option<&Criteria> {
        match self.get_in(NameSpace::Facet, name) {
            Some(NamedObject::FacetQuery(query)) => Some(query),
            _ => None,
        }
    }

    pub fn group(&self, name: &str) -> Option<&GroupSpec> {
        match self.get_in(NameSpace::Group, name) {
            Some(NamedObject::Group(spec)) => Some(spec),
            _ => None,
        }
    }

    pub fn highlight(&self, name: &str) -> Option<&HighlightField> {
        match self.get_in(NameSpace::Highlight, name) {
            Some(NamedObject::Highlight(field)) => Some(field),
            _ => None,
        }
    }
}

/// Prefix a parameter value with a `key` local param when a name was assigned
pub fn keyed(name: Option<&str>, value: &str) -> String {
    match name {
        Some(name) => format!("{{!key={}}}{}", name, value),
        None => value.to_string(),
    }
}
