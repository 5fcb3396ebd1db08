use pairdash_core::{DashError, Pair, PersistenceStore, load_json, normalize_pair, store_json};

/// Ordered set of selected pairs. Insertion order is sidebar order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pairs: Vec<Pair>,
}

impl SelectionState {
    /// Build from a list, keeping the first occurrence of each pair.
    #[must_use]
    pub fn from_pairs<I: IntoIterator<Item = Pair>>(pairs: I) -> Self {
        let mut out = Self::default();
        for p in pairs {
            out.insert(p);
        }
        out
    }

    /// Read the persisted selection stored under `key`.
    ///
    /// Entries are normalized again and empty ones dropped. A missing or
    /// unreadable value yields an empty selection.
    pub fn load(store: &dyn PersistenceStore, key: &str) -> Self {
        match load_json::<Vec<Option<String>>>(store, key) {
            Ok(Some(raw)) => Self::from_pairs(
                raw.iter()
                    .filter_map(|r| Pair::parse(&normalize_pair(r.as_deref()))),
            ),
            Ok(None) => Self::default(),
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(key, error = %_e, "ignoring unreadable persisted selection");
                Self::default()
            }
        }
    }

    /// Write the selection under `key` as a JSON list.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn persist(&self, store: &dyn PersistenceStore, key: &str) -> Result<(), DashError> {
        store_json(store, key, &self.pairs)
    }

    /// Selected pairs in insertion order.
    #[must_use]
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    /// True if `pair` is selected.
    #[must_use]
    pub fn contains(&self, pair: &Pair) -> bool {
        self.pairs.contains(pair)
    }

    /// Number of selected pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Append `pair` unless already present. Returns `true` if it was added.
    pub fn insert(&mut self, pair: Pair) -> bool {
        if self.contains(&pair) {
            return false;
        }
        self.pairs.push(pair);
        true
    }

    /// Remove `pair`. Returns `true` if it was selected.
    pub fn remove(&mut self, pair: &Pair) -> bool {
        let before = self.pairs.len();
        self.pairs.retain(|p| p != pair);
        self.pairs.len() != before
    }

    /// Drop every pair absent from `catalog`, preserving the order of the rest.
    ///
    /// Returns the dropped pairs.
    pub fn reconcile(&mut self, catalog: &[Pair]) -> Vec<Pair> {
        let (kept, dropped): (Vec<Pair>, Vec<Pair>) =
            self.pairs.drain(..).partition(|p| catalog.contains(p));
        self.pairs = kept;
        dropped
    }
}
