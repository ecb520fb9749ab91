//! Identifier generation
//!
//! Ids look like `req_` followed by 32 lowercase hex digits. The hex part is a
//! process-wide random seed XOR-ed with the import sequence number (high 64
//! bits) and a per-kind counter (low 64 bits), so two ids produced in one
//! process can never collide, and ids from different processes collide only
//! with negligible probability.

use regex::Regex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{LazyLock, OnceLock};
use uuid::Uuid;

static SEED: OnceLock<u128> = OnceLock::new();
static IMPORT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

static ID_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(wrk|env|jar|req|fld)_[a-f0-9]{32}$").expect("id format regex is valid")
});

/// Record kinds with their id prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Workspace,
    Environment,
    CookieJar,
    Request,
    Folder,
}

impl IdKind {
    const ALL: [IdKind; 5] = [
        IdKind::Workspace,
        IdKind::Environment,
        IdKind::CookieJar,
        IdKind::Request,
        IdKind::Folder,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            IdKind::Workspace => "wrk",
            IdKind::Environment => "env",
            IdKind::CookieJar => "jar",
            IdKind::Request => "req",
            IdKind::Folder => "fld",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Id source for a single conversion; counters start at zero for each one
#[derive(Debug)]
pub struct IdGenerator {
    import: u64,
    counters: [u64; IdKind::ALL.len()],
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            import: IMPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed),
            counters: [0; IdKind::ALL.len()],
        }
    }

    pub fn next_id(&mut self, kind: IdKind) -> String {
        let counter = &mut self.counters[kind.index()];
        let sequence = *counter;
        *counter += 1;

        let seed = *SEED.get_or_init(|| Uuid::new_v4().as_u128());
        let value = seed ^ ((u128::from(self.import) << 64) | u128::from(sequence));
        format!("{}_{:032x}", kind.prefix(), value)
    }

    /// Number of ids handed out for a kind
    pub fn count(&self, kind: IdKind) -> u64 {
        self.counters[kind.index()]
    }
}

pub fn is_valid_id(id: &str) -> bool {
    ID_FORMAT.is_match(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_id_format() {
        let mut ids = IdGenerator::new();
        for kind in IdKind::ALL {
            let id = ids.next_id(kind);
            assert!(is_valid_id(&id), "bad id {id}");
            assert!(id.starts_with(kind.prefix()));
        }
    }

    #[test]
    fn test_counters_are_per_kind() {
        let mut ids = IdGenerator::new();
        ids.next_id(IdKind::Request);
        ids.next_id(IdKind::Request);
        ids.next_id(IdKind::Folder);
        assert_eq!(ids.count(IdKind::Request), 2);
        assert_eq!(ids.count(IdKind::Folder), 1);
        assert_eq!(ids.count(IdKind::Workspace), 0);
    }

    #[test]
    fn test_unique_across_generators() {
        let mut seen = HashSet::new();
        for _ in 0..50 {
            // a fresh generator restarts its counters
            let mut ids = IdGenerator::new();
            for _ in 0..20 {
                assert!(seen.insert(ids.next_id(IdKind::Request)));
                assert!(seen.insert(ids.next_id(IdKind::Folder)));
            }
        }
    }

    #[test]
    fn test_unique_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    let mut ids = IdGenerator::new();
                    (0..100)
                        .map(|_| ids.next_id(IdKind::Request))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 800);
    }

    #[test]
    fn test_rejects_malformed_ids() {
        assert!(!is_valid_id("req_123"));
        assert!(!is_valid_id("abc_00000000000000000000000000000000"));
        assert!(!is_valid_id("req_0000000000000000000000000000000G"));
    }
}
