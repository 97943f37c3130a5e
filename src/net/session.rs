//! Line-protocol framing and the five-verb client dispatcher: each request
//! is one newline-terminated line, rewritten into the internal SQL dialect
//! and run through a fresh `Statement`; the response is CSV rows followed by
//! a final `OK` or `ERR <message>` status line.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;

use crate::interpreter::Statement;
use crate::selection::Selection;
use crate::store::Store;
use crate::value::DataType;

const INSERT: &str = "INSERT";
const TRUNCATE: &str = "TRUNCATE";
const INTERSECTION: &str = "INTERSECTION";
const SYMMETRIC_DIFFERENCE: &str = "SYMMETRIC_DIFFERENCE";
const SHOW: &str = "SHOW";

/// Services one client connection until it closes the socket or sends a
/// zero-length read (EOF). Reads are chunked at 1 KiB, mirroring the
/// original server's `recv` size; a request line may still span more than
/// one chunk, `BufReader` handles that transparently.
pub fn handle(store: &Store, stream: TcpStream) -> std::io::Result<()> {
    let peer = stream.peer_addr().ok();
    let mut reader = BufReader::with_capacity(1024, stream.try_clone()?);
    let mut writer = stream;

    let mut line = String::new();
    loop {
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            break;
        }
        let query = line.trim_end_matches(['\n', '\r']);
        if query.is_empty() {
            continue;
        }

        tracing::debug!(query, ?peer, "handling request");
        let mut response = dispatch(store, query);
        if !response.ends_with('\n') {
            response.push('\n');
        }
        writer.write_all(response.as_bytes())?;
    }
    tracing::info!(?peer, "connection closed");
    Ok(())
}

fn dispatch(store: &Store, query: &str) -> String {
    let operation = query.split(' ').next().unwrap_or(query);
    let mut stmt = Statement::new(store);

    let result = if operation == INSERT {
        insert(&mut stmt, query)
    } else if operation == TRUNCATE {
        truncate(&mut stmt, query)
    } else if operation == SHOW {
        show(&mut stmt, query)
    } else if query == INTERSECTION {
        intersection(&mut stmt)
    } else if query == SYMMETRIC_DIFFERENCE {
        symdiff(&mut stmt)
    } else {
        Err(format!("unknown operation '{operation}'"))
    };

    match result {
        Ok(body) => format!("{body}OK\n"),
        Err(message) => format!("ERR {message}\n"),
    }
}

fn show(stmt: &mut Statement, query: &str) -> Result<String, String> {
    let tokens: Vec<&str> = query.split(' ').collect();
    if tokens.len() != 2 {
        return Err("bad request".into());
    }
    write_table(stmt, &format!("SELECT * FROM {};", tokens[1]))
}

fn insert(stmt: &mut Statement, query: &str) -> Result<String, String> {
    let tokens: Vec<&str> = query.split(' ').collect();
    if tokens.len() != 4 {
        return Err("bad request".into());
    }
    let sql = format!(
        "INSERT INTO {} VALUES ({} \"{}\");",
        tokens[1], tokens[2], tokens[3]
    );
    stmt.modify(&sql).map_err(|e| e.to_string())?;
    Ok(String::new())
}

fn truncate(stmt: &mut Statement, query: &str) -> Result<String, String> {
    let tokens: Vec<&str> = query.split(' ').collect();
    if tokens.len() != 2 {
        return Err("bad request".into());
    }
    stmt.modify(&format!("DELETE FROM {};", tokens[1]))
        .map_err(|e| e.to_string())?;
    Ok(String::new())
}

fn intersection(stmt: &mut Statement) -> Result<String, String> {
    write_selection(stmt, "SELECT * FROM A JOIN B ON A.id = B.id;")
}

fn symdiff(stmt: &mut Statement) -> Result<String, String> {
    write_selection(
        stmt,
        "SELECT * FROM A FULL OUTER JOIN B ON A.id = B.id WHERE A.id IS NULL OR B.id IS NULL;",
    )
}

/// Writes a two-column (id, name) CSV projection of a plain `SELECT *`.
fn write_table(stmt: &mut Statement, sql: &str) -> Result<String, String> {
    let sel = stmt.select(sql).map_err(|e| e.to_string())?;
    let mut out = String::new();
    while !sel.end() {
        write_field(&mut out, sel, 0);
        out.push(',');
        write_field(&mut out, sel, 1);
        out.push('\n');
        sel.next();
    }
    Ok(out)
}

/// Writes the three-column (left.id, left.name, right.name) CSV shape
/// `INTERSECTION`/`SYMMETRIC_DIFFERENCE` use, per `joiner.h`'s
/// `writeSelection` — a convenience projection over the generic four-column
/// join selection, picking columns 0, 1, 3 and dropping the redundant
/// right-hand id (column 2).
fn write_selection(stmt: &mut Statement, sql: &str) -> Result<String, String> {
    let sel = stmt.select(sql).map_err(|e| e.to_string())?;
    let mut out = String::new();
    while !sel.end() {
        write_field(&mut out, sel, 0);
        out.push(',');
        write_field(&mut out, sel, 1);
        out.push(',');
        write_field(&mut out, sel, 3);
        out.push('\n');
        sel.next();
    }
    Ok(out)
}

fn write_field(out: &mut String, sel: &mut dyn Selection, column: usize) {
    if sel.is_null(column) {
        return;
    }
    match sel.columns()[column].data_type {
        DataType::Integer => out.push_str(&sel.get_long(column).unwrap().to_string()),
        DataType::Text => out.push_str(&sel.get_string(column).unwrap()),
    }
}
