use parking_lot::{ArcRwLockReadGuard, RawRwLock};

use crate::error::{Error, Result};
use crate::row::Record;
use crate::table::Table;
use crate::value::{DataType, Value};

/// Metadata for one projected column of a selection: its display name
/// (table-qualified for joins, bare for a single-table scan) and type.
#[derive(Debug, Clone)]
pub struct SelectionColumn {
    pub name: String,
    pub data_type: DataType,
}

/// A cursor over a sequence of rows, one row "current" at a time: `end()` is
/// checked before reading, `next()` advances, and `close()` releases
/// whatever resources (here, a table lock) the selection holds.
pub trait Selection {
    fn columns(&self) -> &[SelectionColumn];
    fn end(&self) -> bool;
    fn next(&mut self);
    fn is_null(&self, column: usize) -> bool;
    fn get_long(&self, column: usize) -> Result<i64>;
    fn get_string(&self, column: usize) -> Result<String>;
    fn close(&mut self);
}

fn cell_as_long(value: &Value) -> Result<i64> {
    match value {
        Value::Int(v) => Ok(*v),
        Value::Null(_) => Err(Error::NullAccess("column is NULL".into())),
        Value::Text(_) => Err(Error::TypeMismatch("column is TEXT, not INTEGER".into())),
    }
}

fn cell_as_string(value: &Value) -> Result<String> {
    match value {
        Value::Text(v) => Ok(v.clone()),
        Value::Null(_) => Err(Error::NullAccess("column is NULL".into())),
        Value::Int(_) => Err(Error::TypeMismatch("column is INTEGER, not TEXT".into())),
    }
}

/// A `SELECT * FROM table` scan. Holds an owned read guard on the table
/// for as long as the selection stays open, so a concurrent writer on
/// the same table blocks until `close()` — this is the one case in this
/// crate where a value needs to hold a lock guard past the call that
/// created it, which is why the table map uses `parking_lot` rather than
/// `std::sync::RwLock`.
pub struct FullTableSelection {
    guard: Option<ArcRwLockReadGuard<RawRwLock, Table>>,
    columns: Vec<SelectionColumn>,
    row_ids: Vec<usize>,
    cursor: usize,
}

impl FullTableSelection {
    pub fn new(guard: ArcRwLockReadGuard<RawRwLock, Table>) -> Self {
        let columns = guard
            .schema()
            .iter()
            .map(|c| SelectionColumn {
                name: c.name().to_string(),
                data_type: c.data_type(),
            })
            .collect();
        let row_ids: Vec<usize> = guard.iter().map(|(id, _)| id).collect();
        FullTableSelection {
            guard: Some(guard),
            columns,
            row_ids,
            cursor: 0,
        }
    }

    fn current_record(&self) -> &Record {
        let guard = self.guard.as_ref().expect("selection used after close()");
        guard.row(self.row_ids[self.cursor])
    }
}

impl Selection for FullTableSelection {
    fn columns(&self) -> &[SelectionColumn] {
        &self.columns
    }

    fn end(&self) -> bool {
        self.guard.is_none() || self.cursor >= self.row_ids.len()
    }

    fn next(&mut self) {
        self.cursor += 1;
    }

    fn is_null(&self, column: usize) -> bool {
        self.current_record()[column].is_null()
    }

    fn get_long(&self, column: usize) -> Result<i64> {
        cell_as_long(&self.current_record()[column])
    }

    fn get_string(&self, column: usize) -> Result<String> {
        cell_as_string(&self.current_record()[column])
    }

    fn close(&mut self) {
        self.guard = None;
    }
}

impl Drop for FullTableSelection {
    fn drop(&mut self) {
        self.close();
    }
}

/// A selection whose rows were already materialised out of one or more
/// tables — the result of a join, where the matching pairs of row ids
/// are computed once up front and the table locks are released
/// immediately afterwards.
pub struct MaterialisedSelection {
    columns: Vec<SelectionColumn>,
    records: Vec<Record>,
    cursor: usize,
}

impl MaterialisedSelection {
    pub fn new(columns: Vec<SelectionColumn>, records: Vec<Record>) -> Self {
        MaterialisedSelection {
            columns,
            records,
            cursor: 0,
        }
    }
}

impl Selection for MaterialisedSelection {
    fn columns(&self) -> &[SelectionColumn] {
        &self.columns
    }

    fn end(&self) -> bool {
        self.cursor >= self.records.len()
    }

    fn next(&mut self) {
        self.cursor += 1;
    }

    fn is_null(&self, column: usize) -> bool {
        self.records[self.cursor][column].is_null()
    }

    fn get_long(&self, column: usize) -> Result<i64> {
        cell_as_long(&self.records[self.cursor][column])
    }

    fn get_string(&self, column: usize) -> Result<String> {
        cell_as_string(&self.records[self.cursor][column])
    }

    fn close(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn materialised_selection_advances_and_ends() {
        let columns = vec![SelectionColumn {
            name: "id".into(),
            data_type: DataType::Integer,
        }];
        let mut sel = MaterialisedSelection::new(columns, vec![vec![Value::Int(1)], vec![Value::Int(2)]]);
        assert!(!sel.end());
        assert_eq!(sel.get_long(0).unwrap(), 1);
        sel.next();
        assert_eq!(sel.get_long(0).unwrap(), 2);
        sel.next();
        assert!(sel.end());
    }

    #[test]
    fn empty_materialised_selection_starts_at_end() {
        let sel = MaterialisedSelection::new(vec![], vec![]);
        assert!(sel.end());
    }
}
