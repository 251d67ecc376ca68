//! Guards for walks over scene graphs that may contain cycles.
//!
//! Super class chains and re-export chains are user-controlled and can loop
//! (`class A extends B`, `class B extends A`). Generic substitution can nest
//! arbitrarily deep through aliases. Each such walk owns one guard, created
//! from a [`RecursionProfile`] so the limits live in [`crate::limits`]:
//!
//! ```ignore
//! let mut guard = RecursionGuard::with_profile(RecursionProfile::HeritageWalk);
//! ```
//!
//! Debug builds panic when a guard is dropped while still holding entries.

use rustc_hash::FxHashSet;
use std::hash::Hash;

use crate::limits;

// ---------------------------------------------------------------------------
// RecursionProfile
// ---------------------------------------------------------------------------

/// The walks that need a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// `export { X } from "./m"` chains followed while resolving an import.
    ReExportChain,
    /// Super class lookup during field and method resolution.
    HeritageWalk,
    /// Generic substitution over nested types.
    Instantiation,
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::ReExportChain => limits::MAX_REEXPORT_CHAIN_DEPTH,
            Self::HeritageWalk => limits::MAX_HERITAGE_DEPTH,
            Self::Instantiation => limits::MAX_INSTANTIATION_DEPTH,
        }
    }

    /// Upper bound on `enter` calls over the guard's lifetime, counting
    /// re-entries of keys already left.
    pub const fn max_visits(self) -> u32 {
        match self {
            Self::ReExportChain => 1_000,
            Self::HeritageWalk => 10_000,
            Self::Instantiation => 100_000,
        }
    }
}

// ---------------------------------------------------------------------------
// RecursionResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    /// The key is already on the current path.
    Cycle,
    DepthExceeded,
    VisitsExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_denied(self) -> bool {
        !matches!(self, Self::Entered)
    }

    /// A limit was hit, as opposed to a plain cycle.
    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::VisitsExceeded)
    }
}

// ---------------------------------------------------------------------------
// RecursionGuard
// ---------------------------------------------------------------------------

/// Path set plus depth and visit counters for one walk.
///
/// ```ignore
/// match guard.enter(class_id) {
///     RecursionResult::Entered => {
///         let found = lookup_in(class_id);
///         guard.leave(class_id);
///         found
///     }
///     _ => None,
/// }
/// ```
pub struct RecursionGuard<K: Hash + Eq + Copy> {
    path: FxHashSet<K>,
    depth: u32,
    visits: u32,
    profile: RecursionProfile,
    exceeded: bool,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self {
            path: FxHashSet::default(),
            depth: 0,
            visits: 0,
            profile,
            exceeded: false,
        }
    }

    /// On [`RecursionResult::Entered`] the caller must [`leave`](Self::leave)
    /// with the same key.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.visits = self.visits.saturating_add(1);
        if self.visits > self.profile.max_visits() {
            self.exceeded = true;
            return RecursionResult::VisitsExceeded;
        }
        if self.depth >= self.profile.max_depth() {
            self.exceeded = true;
            return RecursionResult::DepthExceeded;
        }
        if !self.path.insert(key) {
            return RecursionResult::Cycle;
        }
        self.depth += 1;
        RecursionResult::Entered
    }

    pub fn leave(&mut self, key: K) {
        let was_present = self.path.remove(&key);
        debug_assert!(was_present, "RecursionGuard::leave() for a key that was never entered");
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn profile(&self) -> RecursionProfile {
        self.profile
    }

    /// Sticky once any limit has been hit.
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.path.is_empty() {
            panic!("RecursionGuard({:?}) dropped with {} keys on the path", self.profile, self.path.len());
        }
    }
}

// ---------------------------------------------------------------------------
// DepthCounter
// ---------------------------------------------------------------------------

/// Depth-only guard for walks where revisiting a node is legal, such as
/// substituting into a type that mentions one class twice.
#[derive(Debug)]
pub struct DepthCounter {
    depth: u32,
    max_depth: u32,
    exceeded: bool,
}

impl DepthCounter {
    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self {
            depth: 0,
            max_depth: profile.max_depth(),
            exceeded: false,
        }
    }

    /// Returns `false` at the limit; the caller must not `leave` then.
    #[inline]
    pub fn enter(&mut self) -> bool {
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return false;
        }
        self.depth += 1;
        true
    }

    #[inline]
    pub fn leave(&mut self) {
        debug_assert!(self.depth > 0, "DepthCounter::leave() at depth 0");
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }
}

#[cfg(debug_assertions)]
impl Drop for DepthCounter {
    fn drop(&mut self) {
        if !std::thread::panicking() && self.depth > 0 {
            panic!("DepthCounter dropped with depth {}", self.depth);
        }
    }
}

#[cfg(test)]
#[path = "../tests/recursion_tests.rs"]
mod tests;
