use crate::error::{Error, Result};
use crate::index::TableIndex;
use crate::row::{Record, RowId};
use crate::schema::Schema;
use crate::value::Value;

/// A single table: its schema, its rows, and (when the schema has a
/// primary key) the index over that column.
///
/// Only the primary-key column is indexed — this is the single-column-PK
/// design decision from the storage model: an index both enforces
/// uniqueness and accelerates equi-joins on that column, and no other
/// column needs either.
#[derive(Debug)]
pub struct Table {
    schema: Schema,
    rows: Vec<Record>,
    primary_key: usize,
    index: TableIndex,
}

impl Table {
    pub fn new(schema: Schema) -> Result<Self> {
        let primary_key = schema.primary_key_index()?;
        let index = TableIndex::for_type(schema.type_of(primary_key));
        Ok(Table {
            schema,
            rows: Vec::new(),
            primary_key,
            index,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether `column` is indexed (true only for the primary key).
    pub fn has_index(&self, column: usize) -> bool {
        column == self.primary_key
    }

    pub fn primary_key_index(&self) -> usize {
        self.primary_key
    }

    pub fn index(&self) -> &TableIndex {
        &self.index
    }

    fn matches_schema(&self, values: &Record) -> bool {
        self.schema.len() == values.len()
            && values
                .iter()
                .enumerate()
                .all(|(i, v)| v.matches_type(self.schema.type_of(i)))
    }

    /// Inserts a row, checked atomically: on either a schema mismatch or
    /// a primary-key conflict the table is left completely unchanged.
    pub fn insert(&mut self, values: Record) -> Result<RowId> {
        if !self.matches_schema(&values) {
            return Err(Error::Schema(format!(
                "row has {} values, table {} expects {}",
                values.len(),
                self.schema.len(),
                self.schema.len()
            )));
        }

        let pk_value = &values[self.primary_key];
        if !pk_value.is_null() && self.index.contains(pk_value) {
            return Err(Error::DuplicateKey(pk_value.to_string()));
        }

        let row_id = self.rows.len();
        self.index.insert(pk_value, row_id);
        self.rows.push(values);
        Ok(row_id)
    }

    pub fn truncate(&mut self) {
        self.rows.clear();
        self.index.clear();
    }

    pub fn row(&self, id: RowId) -> &Record {
        &self.rows[id]
    }

    /// Builds a record for each requested row id; `None` ids materialise
    /// to an all-`NULL` record shaped like this table's schema (used by
    /// the full outer join's unmatched side).
    pub fn select(&self, ids: &[Option<RowId>]) -> Vec<Record> {
        ids.iter()
            .map(|id| match id {
                Some(row_id) => self.rows[*row_id].clone(),
                None => self
                    .schema
                    .iter()
                    .map(|col| Value::Null(col.data_type()))
                    .collect(),
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RowId, &Record)> {
        self.rows.iter().enumerate()
    }
}
