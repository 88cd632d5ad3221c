//! Object table: documented symbols (functions, classes, modules, ...).
//!
//! Names are stored split at the last `.` into a namespace prefix and a
//! short name, mirroring how the persisted format groups them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DocId;
use crate::error::DsError;

/// Kind of documented symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectRole {
    Function,
    Subroutine,
    Method,
    Attribute,
    Class,
    Type,
    Module,
    Variable,
    Data,
    Exception,
}

impl ObjectRole {
    pub const ALL: [Self; 10] = [
        Self::Function,
        Self::Subroutine,
        Self::Method,
        Self::Attribute,
        Self::Class,
        Self::Type,
        Self::Module,
        Self::Variable,
        Self::Data,
        Self::Exception,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Subroutine => "subroutine",
            Self::Method => "method",
            Self::Attribute => "attribute",
            Self::Class => "class",
            Self::Type => "type",
            Self::Module => "module",
            Self::Variable => "variable",
            Self::Data => "data",
            Self::Exception => "exception",
        }
    }
}

impl fmt::Display for ObjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectRole {
    type Err = DsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DsError::Format(format!("unknown object role '{s}'")))
    }
}

/// Search priority of an object. Hidden objects are never indexed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectPriority {
    Important,
    #[default]
    Default,
    Unimportant,
    Hidden,
}

impl ObjectPriority {
    #[must_use]
    pub const fn as_i8(self) -> i8 {
        match self {
            Self::Important => 0,
            Self::Default => 1,
            Self::Unimportant => 2,
            Self::Hidden => -1,
        }
    }

    #[must_use]
    pub const fn from_i8(value: i8) -> Option<Self> {
        match value {
            0 => Some(Self::Important),
            1 => Some(Self::Default),
            2 => Some(Self::Unimportant),
            -1 => Some(Self::Hidden),
            _ => None,
        }
    }
}

/// Object type descriptor: `(domain, role, label)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectType {
    pub domain: String,
    pub role: ObjectRole,
    pub label: String,
}

impl ObjectType {
    /// Descriptor with the conventional label, e.g. `Python function`.
    #[must_use]
    pub fn new(domain: impl Into<String>, role: ObjectRole) -> Self {
        let domain = domain.into();
        let label = format!("{} {role}", domain_label(&domain));
        Self {
            domain,
            role,
            label,
        }
    }

    /// `domain:role`, as stored in `objtypes`.
    #[must_use]
    pub fn tag(&self) -> String {
        format!("{}:{}", self.domain, self.role)
    }
}

fn domain_label(domain: &str) -> String {
    match domain {
        "py" => "Python".to_string(),
        "c" => "C".to_string(),
        "cpp" => "C++".to_string(),
        "js" => "JavaScript".to_string(),
        "f" | "fortran" => "Fortran".to_string(),
        "rst" => "reStructuredText".to_string(),
        other => other.to_uppercase(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Namespace before the last `.`; empty for top-level names
    pub prefix: String,
    pub name: String,
    pub doc: DocId,
    pub type_index: u32,
    pub priority: ObjectPriority,
    /// `""` links to the full name, `"-"` means no anchor
    pub anchor: String,
}

impl ObjectEntry {
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.prefix.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.prefix, self.name)
        }
    }

    /// Fragment to append to the owning document's link, if any.
    #[must_use]
    pub fn resolved_anchor(&self) -> Option<String> {
        match self.anchor.as_str() {
            "" => Some(self.full_name()),
            "-" => None,
            anchor => Some(anchor.to_string()),
        }
    }
}

/// Split a dotted name at the last `.`.
#[must_use]
pub fn split_name(full_name: &str) -> (&str, &str) {
    full_name.rsplit_once('.').unwrap_or(("", full_name))
}

/// Immutable object table with its dense type numbering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectTable {
    types: Vec<ObjectType>,
    entries: BTreeMap<String, BTreeMap<String, ObjectEntry>>,
}

impl ObjectTable {
    pub(crate) fn from_parts(
        types: Vec<ObjectType>,
        entries: BTreeMap<String, BTreeMap<String, ObjectEntry>>,
    ) -> Self {
        Self { types, entries }
    }

    #[must_use]
    pub fn types(&self) -> &[ObjectType] {
        &self.types
    }

    #[must_use]
    pub fn object_type(&self, index: u32) -> Option<&ObjectType> {
        self.types.get(index as usize)
    }

    /// Look up by fully-qualified name.
    #[must_use]
    pub fn get(&self, full_name: &str) -> Option<&ObjectEntry> {
        let (prefix, name) = split_name(full_name);
        self.entries.get(prefix)?.get(name)
    }

    /// Entries in (prefix, name) order.
    pub fn iter(&self) -> impl Iterator<Item = &ObjectEntry> {
        self.entries.values().flat_map(BTreeMap::values)
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
