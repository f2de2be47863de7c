//! The generational compilation cache table.
//!
//! Entries live in generation 0 when inserted or used. Each call to
//! [`CompilationCache::age`] shifts every generation one step older and
//! drops the oldest one, so entries that go unused for as many aging steps
//! as there are generations disappear. A hit in an older generation moves
//! the entry back to generation 0.

use crate::key::CacheKey;
use ember_bytecode::FunctionDescriptor;
use std::collections::{HashMap, VecDeque};

/// Maps cache keys to compiled top-level functions.
#[derive(Debug)]
pub struct CompilationCache {
    generations: VecDeque<HashMap<CacheKey, FunctionDescriptor>>,
    enabled: bool,
}

impl CompilationCache {
    /// Creates a cache with `generations` generations (at least one).
    ///
    /// A disabled cache ignores every insertion and never reports a hit.
    pub fn new(generations: usize, enabled: bool) -> Self {
        let count = generations.max(1);
        Self {
            generations: (0..count).map(|_| HashMap::new()).collect(),
            enabled,
        }
    }

    /// Returns true if the cache stores entries.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of generations.
    pub fn generation_count(&self) -> usize {
        self.generations.len()
    }

    /// Inserts `function` under `key`, replacing any existing entry.
    /// Returns the replaced function.
    pub fn put_script(
        &mut self,
        key: CacheKey,
        function: FunctionDescriptor,
    ) -> Option<FunctionDescriptor> {
        if !self.enabled {
            tracing::debug!(%key, "compilation cache disabled, put ignored");
            return None;
        }
        let previous = self.take(&key);
        tracing::debug!(%key, replaced = previous.is_some(), "compilation cache put");
        if let Some(young) = self.generations.front_mut() {
            young.insert(key, function);
        }
        previous
    }

    /// Looks up `key`, promoting an entry found in an older generation.
    pub fn lookup_script(&mut self, key: &CacheKey) -> Option<FunctionDescriptor> {
        if !self.enabled {
            return None;
        }
        let found = self
            .generations
            .iter()
            .position(|generation| generation.contains_key(key));
        let Some(generation) = found else {
            tracing::debug!(%key, "compilation cache miss");
            return None;
        };
        let function = if generation == 0 {
            self.generations[0].get(key).cloned()
        } else {
            let function = self.generations[generation].remove(key);
            if let Some(function) = &function {
                self.generations[0].insert(key.clone(), function.clone());
            }
            function
        };
        tracing::debug!(%key, generation, "compilation cache hit");
        function
    }

    /// Ages every entry by one generation, dropping the oldest generation.
    pub fn age(&mut self) {
        let dropped = self.generations.pop_back().map_or(0, |g| g.len());
        self.generations.push_front(HashMap::new());
        tracing::debug!(dropped, "compilation cache aged");
    }

    /// Removes the entry for `key`.
    pub fn remove(&mut self, key: &CacheKey) -> Option<FunctionDescriptor> {
        self.take(key)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        for generation in &mut self.generations {
            generation.clear();
        }
    }

    /// Number of entries across all generations.
    pub fn len(&self) -> usize {
        self.generations.iter().map(HashMap::len).sum()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take(&mut self, key: &CacheKey) -> Option<FunctionDescriptor> {
        self.generations
            .iter_mut()
            .find_map(|generation| generation.remove(key))
    }
}
