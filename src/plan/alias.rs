//! Collision-free alias allocation.
//!
//! The compiler threads explicit allocators through plan construction, one
//! per alias namespace (shared expressions, metric bindings, conditional
//! queries). No global counters.

use std::collections::HashSet;

/// An explicit "seen aliases" set with suffix-based collision resolution.
#[derive(Debug, Default)]
pub struct AliasAllocator {
    seen: HashSet<String>,
}

impl AliasAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a unique alias from a base name: `base`, then `base_1`,
    /// `base_2`, … until unused.
    pub fn allocate(&mut self, base: &str) -> String {
        let alias = self.next_free(base, |_| true);
        self.seen.insert(alias.clone());
        alias
    }

    /// Allocate avoiding this allocator's set and another namespace's set.
    ///
    /// Used for ratio binding aliases, which must not shadow their legs'
    /// expression aliases.
    pub fn allocate_avoiding(&mut self, base: &str, other: &AliasAllocator) -> String {
        let alias = self.next_free(base, |candidate| !other.contains(candidate));
        self.seen.insert(alias.clone());
        alias
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.seen.contains(alias)
    }

    fn next_free(&self, base: &str, extra_ok: impl Fn(&str) -> bool) -> String {
        if !self.seen.contains(base) && extra_ok(base) {
            return base.to_string();
        }
        let mut n = 1usize;
        loop {
            let candidate = format!("{}_{}", base, n);
            if !self.seen.contains(&candidate) && extra_ok(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Derive an alias base from free text: lowercased, every non-alphanumeric
/// character mapped to an underscore.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
