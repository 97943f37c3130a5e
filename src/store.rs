use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::row::RowId;
use crate::schema::Schema;
use crate::selection::{FullTableSelection, MaterialisedSelection, Selection, SelectionColumn};
use crate::table::Table;
use crate::value::Value;

type TableHandle = Arc<RwLock<Table>>;

/// The store's name map plus one lock per table. Named after the
/// two-level locking discipline: a reader or writer always takes the
/// name-map lock first and the table lock(s) second, never the reverse,
/// so the two never deadlock against each other.
pub struct Store {
    tables: RwLock<HashMap<String, TableHandle>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Store {
            tables: RwLock::new(HashMap::new()),
        }
    }

    fn handle(&self, name: &str) -> Result<TableHandle> {
        self.tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::TableMissing(name.to_string()))
    }

    #[instrument(skip(self, schema))]
    pub fn create_table(&self, name: &str, schema: Schema) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.contains_key(name) {
            return Err(Error::TableExists(name.to_string()));
        }
        let table = Table::new(schema)?;
        tables.insert(name.to_string(), Arc::new(RwLock::new(table)));
        Ok(())
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    pub fn table_schema(&self, name: &str) -> Result<Schema> {
        let handle = self.handle(name)?;
        let table = handle.read();
        Ok(table.schema().clone())
    }

    #[instrument(skip(self, values))]
    pub fn insert(&self, name: &str, values: Vec<Value>) -> Result<RowId> {
        let handle = self.handle(name)?;
        let mut table = handle.write();
        table.insert(values)
    }

    pub fn truncate(&self, name: &str) -> Result<()> {
        let handle = self.handle(name)?;
        let mut table = handle.write();
        table.truncate();
        Ok(())
    }

    /// `SELECT * FROM name`. The returned selection holds a read guard on
    /// the table until `close()` (or drop), blocking writers to that
    /// table but not readers or writers of any other table.
    pub fn select_all(&self, name: &str) -> Result<Box<dyn Selection>> {
        let handle = self.handle(name)?;
        let guard = handle.read_arc();
        Ok(Box::new(FullTableSelection::new(guard)))
    }

    #[instrument(skip(self))]
    pub fn inner_join(
        &self,
        table1: &str,
        column1: &str,
        table2: &str,
        column2: &str,
    ) -> Result<Box<dyn Selection>> {
        self.join(table1, column1, table2, column2, JoinKind::Inner)
    }

    #[instrument(skip(self))]
    pub fn full_outer_join(
        &self,
        table1: &str,
        column1: &str,
        table2: &str,
        column2: &str,
    ) -> Result<Box<dyn Selection>> {
        self.join(table1, column1, table2, column2, JoinKind::FullOuter)
    }

    fn join(
        &self,
        table1: &str,
        column1: &str,
        table2: &str,
        column2: &str,
        kind: JoinKind,
    ) -> Result<Box<dyn Selection>> {
        let handle1 = self.handle(table1)?;
        let same_table = table1 == table2;
        let handle2 = if same_table { handle1.clone() } else { self.handle(table2)? };

        let guard1 = handle1.read();
        // A degenerate self-join reuses the single guard for both sides;
        // parking_lot's RwLock allows recursive reads on the same handle
        // from a single thread only through a second `.read()` call,
        // which would deadlock against a pending writer, so the same-
        // table case is special-cased to take exactly one guard.
        let guard2 = if same_table { None } else { Some(handle2.read()) };
        let tab2 = guard2.as_deref().unwrap_or(&*guard1);

        let col1 = guard1.schema().index_of(column1)?;
        let col2 = tab2.schema().index_of(column2)?;

        let type1 = guard1.schema().type_of(col1);
        let type2 = tab2.schema().type_of(col2);
        if type1 != type2 {
            return Err(Error::TypeMismatch(format!(
                "cannot join {table1}.{column1} ({type1}) with {table2}.{column2} ({type2})"
            )));
        }

        let use_index = guard1.has_index(col1) && tab2.has_index(col2);

        let (ids1, ids2): (Vec<Option<RowId>>, Vec<Option<RowId>>) = match kind {
            JoinKind::Inner => {
                let pairs = if use_index {
                    find_equal_rows_by_index(&guard1, col1, tab2, col2)
                } else {
                    find_equal_rows_on_column(&guard1, col1, tab2, col2)
                };
                pairs
                    .into_iter()
                    .map(|(a, b)| (Some(a), Some(b)))
                    .unzip()
            }
            JoinKind::FullOuter => {
                let pairs = if use_index {
                    find_non_paired_rows_by_index(&guard1, col1, tab2, col2)
                } else {
                    find_non_paired_rows_on_column(&guard1, col1, tab2, col2)
                };
                pairs.into_iter().unzip()
            }
        };

        let mut columns = Vec::with_capacity(guard1.schema().len() + tab2.schema().len());
        for col in guard1.schema().iter() {
            columns.push(SelectionColumn {
                name: format!("{table1}.{}", col.name()),
                data_type: col.data_type(),
            });
        }
        for col in tab2.schema().iter() {
            columns.push(SelectionColumn {
                name: format!("{table2}.{}", col.name()),
                data_type: col.data_type(),
            });
        }

        let left_records = guard1.select(&ids1);
        let right_records = tab2.select(&ids2);
        drop(guard1);
        drop(guard2);

        let records = left_records
            .into_iter()
            .zip(right_records)
            .map(|(mut left, right)| {
                left.extend(right);
                left
            })
            .collect();

        Ok(Box::new(MaterialisedSelection::new(columns, records)))
    }
}

enum JoinKind {
    Inner,
    FullOuter,
}

fn find_equal_rows_on_column(
    tab1: &Table,
    col1: usize,
    tab2: &Table,
    col2: usize,
) -> Vec<(RowId, RowId)> {
    let mut pairs = Vec::new();
    for (id1, row1) in tab1.iter() {
        if row1[col1].is_null() {
            continue;
        }
        for (id2, row2) in tab2.iter() {
            if row2[col2].is_null() {
                continue;
            }
            if row1[col1] == row2[col2] {
                pairs.push((id1, id2));
            }
        }
    }
    pairs
}

fn find_equal_rows_by_index(
    tab1: &Table,
    col1: usize,
    tab2: &Table,
    col2: usize,
) -> Vec<(RowId, RowId)> {
    debug_assert!(tab1.has_index(col1) && tab2.has_index(col2));
    let mut pairs = Vec::new();
    for (value, rows1) in tab1.index().entries() {
        if let Some(rows2) = tab2.index().rows(&value) {
            for &id1 in rows1 {
                for &id2 in rows2 {
                    pairs.push((id1, id2));
                }
            }
        }
    }
    pairs
}

fn find_non_paired_rows_on_column(
    tab1: &Table,
    col1: usize,
    tab2: &Table,
    col2: usize,
) -> Vec<(Option<RowId>, Option<RowId>)> {
    let mut ids = Vec::new();
    for (id1, row1) in tab1.iter() {
        if row1[col1].is_null() {
            continue;
        }
        let value = &row1[col1];
        let found = tab2
            .iter()
            .any(|(_, row2)| !row2[col2].is_null() && &row2[col2] == value);
        if !found {
            ids.push((Some(id1), None));
        }
    }
    for (id2, row2) in tab2.iter() {
        if row2[col2].is_null() {
            continue;
        }
        let value = &row2[col2];
        let found = tab1
            .iter()
            .any(|(_, row1)| !row1[col1].is_null() && &row1[col1] == value);
        if !found {
            ids.push((None, Some(id2)));
        }
    }
    ids
}

fn find_non_paired_rows_by_index(
    tab1: &Table,
    col1: usize,
    tab2: &Table,
    col2: usize,
) -> Vec<(Option<RowId>, Option<RowId>)> {
    debug_assert!(tab1.has_index(col1) && tab2.has_index(col2));
    let mut keyed: Vec<(Value, (Option<RowId>, Option<RowId>))> = Vec::new();

    for (value, rows1) in tab1.index().entries() {
        if tab2.index().rows(&value).is_none() {
            for &id1 in rows1 {
                keyed.push((value.clone(), (Some(id1), None)));
            }
        }
    }
    for (value, rows2) in tab2.index().entries() {
        if tab1.index().rows(&value).is_none() {
            for &id2 in rows2 {
                keyed.push((value.clone(), (None, Some(id2))));
            }
        }
    }

    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    keyed.into_iter().map(|(_, pair)| pair).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnInfo;
    use crate::value::DataType;

    fn users_and_orders() -> Store {
        let store = Store::new();
        let mut users = Schema::new();
        users.add_column(ColumnInfo::new("id", DataType::Integer, true)).unwrap();
        users.add_column(ColumnInfo::new("name", DataType::Text, false)).unwrap();
        store.create_table("users", users).unwrap();

        let mut orders = Schema::new();
        orders.add_column(ColumnInfo::new("id", DataType::Integer, true)).unwrap();
        orders.add_column(ColumnInfo::new("user_id", DataType::Integer, false)).unwrap();
        store.create_table("orders", orders).unwrap();

        store.insert("users", vec![Value::Int(1), Value::Text("alice".into())]).unwrap();
        store.insert("users", vec![Value::Int(2), Value::Text("bob".into())]).unwrap();
        store.insert("orders", vec![Value::Int(10), Value::Int(1)]).unwrap();
        store.insert("orders", vec![Value::Int(11), Value::Int(99)]).unwrap();
        store
    }

    #[test]
    fn create_table_twice_errors() {
        let store = users_and_orders();
        let schema = store.table_schema("users").unwrap();
        assert!(store.create_table("users", schema).is_err());
    }

    #[test]
    fn insert_into_missing_table_errors() {
        let store = Store::new();
        assert!(store.insert("ghost", vec![Value::Int(1)]).is_err());
    }

    #[test]
    fn inner_join_on_indexed_column_matches_one_pair() {
        let store = users_and_orders();
        let mut sel = store.inner_join("users", "id", "orders", "user_id").unwrap();
        let mut rows = 0;
        while !sel.end() {
            rows += 1;
            assert_eq!(sel.get_long(0).unwrap(), 1);
            sel.next();
        }
        assert_eq!(rows, 1);
    }

    #[test]
    fn full_outer_join_includes_unmatched_rows_from_both_sides() {
        let store = users_and_orders();
        let mut sel = store.full_outer_join("users", "id", "orders", "user_id").unwrap();
        let mut count = 0;
        while !sel.end() {
            count += 1;
            sel.next();
        }
        // user 2 (no order) and order 11 (no user) are both unmatched.
        assert_eq!(count, 2);
    }

    #[test]
    fn joining_columns_of_different_types_errors() {
        let store = users_and_orders();
        assert!(store.inner_join("users", "name", "orders", "user_id").is_err());
    }
}
