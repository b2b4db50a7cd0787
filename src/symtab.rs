//! Symbol table shared by the scanner and the translation actions
//!
//! The scanner inserts one entry per distinct identifier; the type
//! propagator later fills in the declared type. One table lives for one
//! compilation unit.

use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Source-level types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SourceType {
    /// The built-in integer type
    Int,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Int => write!(f, "int"),
        }
    }
}

/// One identifier's record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolEntry {
    /// Identifier text
    pub name: String,
    /// Declared type, absent until the declaration is reduced
    pub ty: Option<SourceType>,
    /// Constant value (not computed by this backend)
    pub value: Option<i64>,
}

impl SymbolEntry {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ty: None,
            value: None,
        }
    }
}

/// Identifier table keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SymbolTable {
    entries: BTreeMap<String, SymbolEntry>,
}

/// Handle through which translation actions share one table
pub type SymbolTableRef = Rc<RefCell<SymbolTable>>;

impl SymbolTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the table in a shareable handle
    pub fn into_shared(self) -> SymbolTableRef {
        Rc::new(RefCell::new(self))
    }

    /// Whether `name` has an entry
    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Insert an entry for `name` unless one exists. Returns true if inserted.
    pub fn add(&mut self, name: &str) -> bool {
        if self.has(name) {
            return false;
        }
        self.entries.insert(name.to_string(), SymbolEntry::new(name));
        true
    }

    /// Look up an entry
    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.entries.get(name)
    }

    /// Look up an entry for update
    pub fn get_mut(&mut self, name: &str) -> Option<&mut SymbolEntry> {
        self.entries.get_mut(name)
    }

    /// Declared type of `name`, if the entry exists and has been typed
    pub fn type_of(&self, name: &str) -> Option<SourceType> {
        self.get(name).and_then(|entry| entry.ty)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in name order
    pub fn iter(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.entries.values()
    }
}
