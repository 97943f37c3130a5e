//! The accept loop: one OS thread per connection, built on blocking
//! `std::net`. Each connection's only work is a blocking read/dispatch/write
//! loop that never awaits anything, so a thread maps onto "one worker per
//! connected client" more directly than an async task would, with no
//! runtime to pull in.

use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

use crate::error::Result;
use crate::net::session;
use crate::schema::{ColumnInfo, Schema};
use crate::store::Store;
use crate::value::DataType;

/// Builds a fresh `Store` pre-populated with the two fixed relations `A`
/// and `B` (`id INTEGER PRIMARY KEY, name TEXT`) the client verb protocol
/// operates on — the Rust analog of `Joiner`'s constructor, which runs the
/// same two `CREATE TABLE` statements before accepting any connections.
pub fn bootstrap_store() -> Result<Store> {
    let store = Store::new();
    for name in ["A", "B"] {
        let mut schema = Schema::new();
        schema.add_column(ColumnInfo::new("id", DataType::Integer, true))?;
        schema.add_column(ColumnInfo::new("name", DataType::Text, false))?;
        store.create_table(name, schema)?;
    }
    Ok(store)
}

/// Binds `addr` and serves connections until the process exits or the
/// listener errors. Each accepted socket is handed to
/// `net::session::handle` on its own thread, sharing `store`.
pub fn serve(addr: &str, store: Arc<Store>) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr)?;
    tracing::info!(addr, "listening");

    for incoming in listener.incoming() {
        let stream = match incoming {
            Ok(stream) => stream,
            Err(error) => {
                tracing::warn!(%error, "failed to accept connection");
                continue;
            }
        };
        let peer = stream.peer_addr().ok();
        tracing::info!(?peer, "accepted connection");

        let store = Arc::clone(&store);
        thread::spawn(move || {
            if let Err(error) = session::handle(&store, stream) {
                tracing::warn!(%error, "session ended with an I/O error");
            }
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_store_creates_a_and_b() {
        let store = bootstrap_store().unwrap();
        assert!(store.has_table("A"));
        assert!(store.has_table("B"));
    }

    #[test]
    fn bootstrap_is_idempotent_per_call() {
        // Each call builds an independent store; creating A/B twice within
        // a single store would be a TableExists error, which this guards
        // against by never reusing a Store across bootstrap_store() calls.
        assert!(bootstrap_store().is_ok());
        assert!(bootstrap_store().is_ok());
    }
}
