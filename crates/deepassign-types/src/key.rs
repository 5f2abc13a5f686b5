//! Record keys: plain names and identity-compared symbols.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// A unique record key that is never equal to any name or to any other symbol.
///
/// Clones of a symbol compare equal to each other; two symbols created
/// separately never do, even with the same description.
///
/// # Example
///
/// ```
/// use deepassign_types::Symbol;
///
/// let a = Symbol::new("meta");
/// let b = Symbol::new("meta");
/// assert_eq!(a, a.clone());
/// assert_ne!(a, b);
/// assert_eq!(a.description(), "meta");
/// ```
#[derive(Clone)]
pub struct Symbol {
    id: u64,
    description: Arc<str>,
}

impl Symbol {
    /// Create a new unique symbol.
    pub fn new(description: impl AsRef<str>) -> Self {
        Self {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: Arc::from(description.as_ref()),
        }
    }

    /// The human-readable description given at creation.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})#{}", self.description, self.id)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description)
    }
}

/// A record key.
///
/// Named keys are addressable by string paths; symbol keys are only reachable
/// by holding the symbol itself, but merge and copy treat both identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A plain string key
    Name(String),
    /// A unique symbol key
    Symbol(Symbol),
}

impl Key {
    /// Get the key name, if this is a named key.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Name(name) => Some(name),
            Key::Symbol(_) => None,
        }
    }

    /// Whether this key is a symbol.
    pub fn is_symbol(&self) -> bool {
        matches!(self, Key::Symbol(_))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => write!(f, "{}", name),
            Key::Symbol(symbol) => write!(f, "{}", symbol),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Key::Name(name.clone())
    }
}

impl From<Symbol> for Key {
    fn from(symbol: Symbol) -> Self {
        Key::Symbol(symbol)
    }
}
