//! Deformation channel correspondence
//!
//! Maps original-mesh channel indices to substitute-mesh channel indices by
//! exact name. Built once and read-only afterwards.

use std::collections::{BTreeMap, HashSet};

use crate::scene::Mesh;

/// Original channel index -> substitute channel index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelMap {
    pairs: BTreeMap<usize, usize>,
    original_count: usize,
}

impl ChannelMap {
    /// Pair every original channel with the substitute channel of the same name
    ///
    /// Names missing from the substitute are dropped. If the original mesh
    /// repeats a name, only its first occurrence is paired so substitute
    /// indices stay unique.
    pub fn build(original: &Mesh, substitute: &Mesh) -> Self {
        let mut pairs = BTreeMap::new();
        let mut claimed = HashSet::new();

        for (index, name) in original.channels.iter().enumerate() {
            if let Some(target) = substitute.channel_index(name) {
                if claimed.insert(target) {
                    pairs.insert(index, target);
                }
            }
        }

        Self {
            pairs,
            original_count: original.channel_count(),
        }
    }

    pub fn get(&self, original_index: usize) -> Option<usize> {
        self.pairs.get(&original_index).copied()
    }

    /// `(original_index, substitute_index)` pairs in original-index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pairs.iter().map(|(&k, &v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Channel count of the original mesh when the map was built
    pub fn original_count(&self) -> usize {
        self.original_count
    }
}
