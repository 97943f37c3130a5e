//! `memrel <port>` — binds a TCP listener on `127.0.0.1:<port>` and serves
//! the client-verb protocol against a fresh in-memory store. Wrong arity
//! prints one line and exits 1, and a non-numeric port is caught at the
//! same boundary rather than panicking.

use std::sync::Arc;

use memrel::net::server;

fn main() {
    memrel::logging::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        println!("too few arguments");
        std::process::exit(1);
    }

    let port: u16 = match args[1].parse() {
        Ok(port) => port,
        Err(error) => {
            println!("{error}");
            std::process::exit(1);
        }
    };

    let store = match server::bootstrap_store() {
        Ok(store) => Arc::new(store),
        Err(error) => {
            println!("{error}");
            std::process::exit(1);
        }
    };

    let addr = format!("127.0.0.1:{port}");
    if let Err(error) = server::serve(&addr, store) {
        println!("{error}");
        std::process::exit(1);
    }
}
