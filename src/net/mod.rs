//! The TCP transport and client-verb protocol built on top of the storage
//! core: an accept loop, a per-connection session, and the line protocol
//! that rewrites client verbs into the internal SQL dialect.

pub mod server;
pub mod session;
