use std::collections::BTreeMap;

use crate::row::RowId;
use crate::value::{DataType, Value};

/// A secondary index over one column: maps each distinct key to the set
/// of row ids holding that key, in ascending key order. Used both to
/// enforce primary-key uniqueness and to accelerate equi-joins.
pub trait Index: Send + Sync {
    fn insert(&mut self, value: &Value, row: RowId);

    fn remove_all(&mut self);

    /// Row ids carrying this exact value, or `None` if the value is
    /// absent from the index.
    fn rows(&self, value: &Value) -> Option<&[RowId]>;

    fn contains(&self, value: &Value) -> bool {
        self.rows(value).is_some()
    }

    /// Distinct keys in ascending order, each paired with its row ids.
    fn entries(&self) -> Vec<(Value, &[RowId])>;
}

#[derive(Debug, Default)]
pub struct IndexI64 {
    map: BTreeMap<i64, Vec<RowId>>,
}

impl Index for IndexI64 {
    fn insert(&mut self, value: &Value, row: RowId) {
        if let Value::Int(v) = value {
            self.map.entry(*v).or_default().push(row);
        }
    }

    fn remove_all(&mut self) {
        self.map.clear();
    }

    fn rows(&self, value: &Value) -> Option<&[RowId]> {
        match value {
            Value::Int(v) => self.map.get(v).map(|rows| rows.as_slice()),
            _ => None,
        }
    }

    fn entries(&self) -> Vec<(Value, &[RowId])> {
        self.map
            .iter()
            .map(|(k, rows)| (Value::Int(*k), rows.as_slice()))
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct IndexString {
    map: BTreeMap<String, Vec<RowId>>,
}

impl Index for IndexString {
    fn insert(&mut self, value: &Value, row: RowId) {
        if let Value::Text(v) = value {
            self.map.entry(v.clone()).or_default().push(row);
        }
    }

    fn remove_all(&mut self) {
        self.map.clear();
    }

    fn rows(&self, value: &Value) -> Option<&[RowId]> {
        match value {
            Value::Text(v) => self.map.get(v).map(|rows| rows.as_slice()),
            _ => None,
        }
    }

    fn entries(&self) -> Vec<(Value, &[RowId])> {
        self.map
            .iter()
            .map(|(k, rows)| (Value::Text(k.clone()), rows.as_slice()))
            .collect()
    }
}

/// Wraps the index implementation appropriate for a column's declared
/// type, so callers don't need to know which concrete `Index` they hold.
#[derive(Debug)]
pub enum TableIndex {
    Integer(IndexI64),
    Text(IndexString),
}

impl TableIndex {
    pub fn for_type(data_type: DataType) -> Self {
        match data_type {
            DataType::Integer => TableIndex::Integer(IndexI64::default()),
            DataType::Text => TableIndex::Text(IndexString::default()),
        }
    }

    fn as_index(&self) -> &dyn Index {
        match self {
            TableIndex::Integer(i) => i,
            TableIndex::Text(i) => i,
        }
    }

    fn as_index_mut(&mut self) -> &mut dyn Index {
        match self {
            TableIndex::Integer(i) => i,
            TableIndex::Text(i) => i,
        }
    }

    pub fn insert(&mut self, value: &Value, row: RowId) {
        self.as_index_mut().insert(value, row);
    }

    pub fn clear(&mut self) {
        self.as_index_mut().remove_all();
    }

    pub fn rows(&self, value: &Value) -> Option<&[RowId]> {
        self.as_index().rows(value)
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.as_index().contains(value)
    }

    pub fn entries(&self) -> Vec<(Value, &[RowId])> {
        self.as_index().entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_index_groups_duplicate_keys() {
        let mut idx = IndexI64::default();
        idx.insert(&Value::Int(7), 0);
        idx.insert(&Value::Int(7), 3);
        idx.insert(&Value::Int(9), 1);
        assert_eq!(idx.rows(&Value::Int(7)), Some(&[0usize, 3][..]));
        assert_eq!(idx.rows(&Value::Int(9)), Some(&[1usize][..]));
        assert_eq!(idx.rows(&Value::Int(0)), None);
    }

    #[test]
    fn entries_are_in_ascending_key_order() {
        let mut idx = IndexI64::default();
        idx.insert(&Value::Int(5), 0);
        idx.insert(&Value::Int(1), 1);
        idx.insert(&Value::Int(3), 2);
        let keys: Vec<Value> = idx.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![Value::Int(1), Value::Int(3), Value::Int(5)]);
    }

    #[test]
    fn text_index_matches_exact_strings() {
        let mut idx = IndexString::default();
        idx.insert(&Value::Text("a".into()), 0);
        idx.insert(&Value::Text("b".into()), 1);
        assert!(idx.contains(&Value::Text("a".into())));
        assert!(!idx.contains(&Value::Text("c".into())));
    }

    #[test]
    fn table_index_dispatches_by_declared_type() {
        let mut idx = TableIndex::for_type(DataType::Text);
        idx.insert(&Value::Text("x".into()), 4);
        assert_eq!(idx.rows(&Value::Text("x".into())), Some(&[4usize][..]));
    }
}
