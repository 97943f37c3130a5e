use crate::error::{Error, Result};
use crate::value::DataType;

/// Describes one column: its name, declared type, and whether it is the
/// table's primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    name: String,
    data_type: DataType,
    primary_key: bool,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, data_type: DataType, primary_key: bool) -> Self {
        ColumnInfo {
            name: name.into(),
            data_type,
            primary_key,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }
}

/// An ordered list of columns, exactly one of which must be the primary
/// key.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: Vec<ColumnInfo>,
}

impl Schema {
    pub fn new() -> Self {
        Schema { columns: Vec::new() }
    }

    pub fn add_column(&mut self, column: ColumnInfo) -> Result<usize> {
        if self.contains(column.name()) {
            return Err(Error::Schema(format!(
                "column {} already exists",
                column.name()
            )));
        }
        self.columns.push(column);
        Ok(self.columns.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name() == name)
    }

    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| Error::Schema(format!("column '{name}' does not exist")))
    }

    pub fn column(&self, name: &str) -> Result<&ColumnInfo> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| Error::Schema(format!("column {name} does not exist")))
    }

    pub fn column_at(&self, index: usize) -> &ColumnInfo {
        &self.columns[index]
    }

    pub fn type_of(&self, index: usize) -> DataType {
        self.columns[index].data_type()
    }

    pub fn primary_key_index(&self) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.is_primary_key())
            .ok_or_else(|| Error::Schema("no primary key".into()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnInfo> {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_with_pk() -> Schema {
        let mut s = Schema::new();
        s.add_column(ColumnInfo::new("id", DataType::Integer, true)).unwrap();
        s.add_column(ColumnInfo::new("name", DataType::Text, false)).unwrap();
        s
    }

    #[test]
    fn duplicate_column_name_is_rejected() {
        let mut s = schema_with_pk();
        let err = s.add_column(ColumnInfo::new("id", DataType::Integer, false));
        assert!(err.is_err());
    }

    #[test]
    fn missing_column_lookup_errors() {
        let s = schema_with_pk();
        assert!(s.index_of("nope").is_err());
        assert!(s.column("nope").is_err());
    }

    #[test]
    fn primary_key_index_found() {
        let s = schema_with_pk();
        assert_eq!(s.primary_key_index().unwrap(), 0);
    }

    #[test]
    fn schema_without_primary_key_errors() {
        let mut s = Schema::new();
        s.add_column(ColumnInfo::new("a", DataType::Integer, false)).unwrap();
        assert!(s.primary_key_index().is_err());
    }
}
