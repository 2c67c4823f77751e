//! Process scoping: running a sub-decision under a distinguishing key
//!
//! Several independent instances of the same logic (one per monitored
//! group, say) can share a device. The key only tags the execution for
//! tracing; it never changes what the wrapped computation returns.

use std::fmt::Debug;
use std::hash::{BuildHasher, Hash, Hasher};

use tracing::debug_span;

use crate::movement::RoundContext;

/// Fixed seeds so trace keys are stable across runs and threads
const TRACE_SEEDS: (u64, u64, u64, u64) = (
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
);

/// Stack of scope keys active for the current computation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessTrace {
    keys: Vec<u64>,
}

impl ProcessTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> &[u64] {
        &self.keys
    }
}

fn hash_key<K: Hash>(key: &K) -> u64 {
    let (k0, k1, k2, k3) = TRACE_SEEDS;
    let state = ahash::RandomState::with_seeds(k0, k1, k2, k3);
    let mut hasher = state.build_hasher();
    key.hash(&mut hasher);
    hasher.finish()
}

impl RoundContext<'_> {
    /// Runs `f` in the partition of the network identified by `key`.
    pub fn switcher<K: Hash + Debug, T>(&mut self, key: K, f: impl FnOnce(&mut Self) -> T) -> T {
        let span = debug_span!("process", key = ?key, device = %self.uid);
        let _entered = span.enter();

        self.trace.keys.push(hash_key(&key));
        let result = f(self);
        self.trace.keys.pop();
        result
    }
}
