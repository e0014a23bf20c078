use serde::{Deserialize, Serialize};

/// Symbols listed under `NS_ :`, deduplicated, in first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameSpace {
    symbols: Vec<String>,
}

impl NameSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `symbol` unless already present; returns whether it was added.
    pub fn insert(&mut self, symbol: impl Into<String>) -> bool {
        let symbol: String = symbol.into();
        if self.contains(&symbol) {
            return false;
        }
        self.symbols.push(symbol);
        true
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    /// Appends the symbols of `other` that are not already present.
    pub fn merge(&mut self, other: &NameSpace) {
        for symbol in &other.symbols {
            self.insert(symbol.as_str());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.symbols.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
