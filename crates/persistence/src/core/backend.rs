//! Backend identification.

use std::fmt;

/// Identifies the kind of storage behind a [`MovieStorage`](super::MovieStorage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// In-process, non-persistent store.
    Memory,
    /// PostgreSQL relational primary.
    Postgres,
    /// MongoDB document replica.
    MongoDB,
    /// Primary and replica composed behind the failover coordinator.
    Failover,
}

impl BackendKind {
    /// Returns true for backends that talk to a database over the network.
    pub fn is_networked(&self) -> bool {
        matches!(self, BackendKind::Postgres | BackendKind::MongoDB)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Memory => write!(f, "memory"),
            BackendKind::Postgres => write!(f, "postgres"),
            BackendKind::MongoDB => write!(f, "mongodb"),
            BackendKind::Failover => write!(f, "failover"),
        }
    }
}
