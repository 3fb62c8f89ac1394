//! Per-artifact table of external symbols and their local aliases.
//!
//! Every item generated code pulls in from another module (message types,
//! tonic stubs, runtime helpers) is resolved through a [`ReferenceTable`].
//! The table hands out one alias per `(namespace, symbol)` pair and later
//! renders the matching `use` declarations at the top of the artifact.
//!
//! ## Alias Assignment
//!
//! The first pair to claim a symbol name gets it bare. A later pair with the
//! same symbol from a different namespace gets the smallest free numeric
//! suffix (`Request1`, `Request2`, ...). Names reserved for local items are
//! never handed out. Assignment depends only on the order of first
//! resolution, so identical input always yields identical aliases.
//!
//! ## Examples
//!
//! ```
//! use stubgen_gen::references::ReferenceTable;
//!
//! let mut refs = ReferenceTable::new();
//! let a = refs.resolve("crate::echo", "Request");
//! let b = refs.resolve("crate::admin", "Request");
//! assert_eq!(a, "Request");
//! assert_eq!(b, "Request1");
//! assert_eq!(refs.resolve("crate::echo", "Request"), "Request");
//! ```

use std::collections::{BTreeMap, BTreeSet};

use proc_macro2::{Ident, TokenStream};
use quote::quote;

use crate::naming::{path_tokens, to_ident};

/// One resolved external symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Rust module path the symbol lives in (e.g. `tonic::transport`).
    pub namespace: String,
    /// Name of the symbol within `namespace`.
    pub symbol: String,
    /// Name generated code uses for it.
    pub alias: String,
}

/// Deterministic interning map from external symbols to local aliases.
///
/// A table belongs to exactly one artifact; it is created at the start of
/// that artifact's generation and dropped with it.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    entries: Vec<Reference>,
    index: BTreeMap<(String, String), usize>,
    taken: BTreeSet<String>,
}

impl ReferenceTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` as used by an item defined in the artifact itself.
    ///
    /// Reserved names are never given out as aliases. Reserve local names
    /// before resolving anything that could clash with them.
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.taken.insert(name.into());
    }

    /// Returns the alias for `symbol` in `namespace`, assigning one on first use.
    pub fn resolve(&mut self, namespace: &str, symbol: &str) -> String {
        let key = (namespace.to_string(), symbol.to_string());
        if let Some(&idx) = self.index.get(&key) {
            return self.entries[idx].alias.clone();
        }

        let alias = self.free_alias(symbol);
        self.taken.insert(alias.clone());
        self.index.insert(key, self.entries.len());
        self.entries.push(Reference {
            namespace: namespace.to_string(),
            symbol: symbol.to_string(),
            alias: alias.clone(),
        });
        alias
    }

    /// [`resolve`](Self::resolve), returned as an identifier ready for `quote!`.
    pub fn ident(&mut self, namespace: &str, symbol: &str) -> Ident {
        to_ident(&self.resolve(namespace, symbol))
    }

    /// All references in first-resolution order.
    pub fn references(&self) -> &[Reference] {
        &self.entries
    }

    /// Number of distinct references resolved.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders one `use` declaration per reference, in first-resolution order.
    pub fn use_declarations(&self) -> TokenStream {
        let uses = self.entries.iter().map(|r| {
            let path = path_tokens(&format!("{}::{}", r.namespace, r.symbol));
            if r.alias == r.symbol {
                quote! { use #path; }
            } else {
                let alias = to_ident(&r.alias);
                quote! { use #path as #alias; }
            }
        });
        quote! { #(#uses)* }
    }

    fn free_alias(&self, symbol: &str) -> String {
        if !self.taken.contains(symbol) {
            return symbol.to_string();
        }
        (1..)
            .map(|n| format!("{}{}", symbol, n))
            .find(|candidate| !self.taken.contains(candidate))
            .unwrap_or_else(|| symbol.to_string())
    }
}
