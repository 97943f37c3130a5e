//! Property tests for the storage core's invariants and laws: PK
//! uniqueness, index coverage, round-trip, join set-equivalence regardless
//! of index use, and truncate idempotence.

use std::collections::HashSet;

use proptest::prelude::*;

use memrel::schema::{ColumnInfo, Schema};
use memrel::table::Table;
use memrel::value::{DataType, Value};

fn users_schema() -> Schema {
    let mut s = Schema::new();
    s.add_column(ColumnInfo::new("id", DataType::Integer, true))
        .unwrap();
    s.add_column(ColumnInfo::new("name", DataType::Text, false))
        .unwrap();
    s
}

proptest! {
    /// Inserting a row then reading it back returns the same values,
    /// and every primary key seen lands in the table at most once, with
    /// the live index exactly covering the surviving rows.
    #[test]
    fn insert_round_trips_and_keeps_pk_unique(
        ids in prop::collection::vec(0i64..50, 1..60),
    ) {
        let mut table = Table::new(users_schema()).unwrap();
        let mut seen = HashSet::new();

        for id in &ids {
            let row = vec![Value::Int(*id), Value::Text(format!("name-{id}"))];
            let result = table.insert(row.clone());
            if seen.insert(*id) {
                let row_id = result.unwrap();
                prop_assert_eq!(table.row(row_id), &row);
            } else {
                prop_assert!(result.is_err());
            }
        }

        prop_assert_eq!(table.len(), seen.len());

        let mut index_ids: HashSet<i64> = HashSet::new();
        for (_, record) in table.iter() {
            index_ids.insert(record[0].as_int().unwrap());
        }
        prop_assert_eq!(index_ids, seen);
    }

    /// `truncate` is idempotent and always leaves an empty, insertable
    /// table behind regardless of how many rows preceded it.
    #[test]
    fn truncate_is_idempotent(ids in prop::collection::vec(0i64..50, 0..30)) {
        let mut table = Table::new(users_schema()).unwrap();
        let mut inserted = HashSet::new();
        for id in ids {
            if table.insert(vec![Value::Int(id), Value::Text("n".into())]).is_ok() {
                inserted.insert(id);
            }
        }

        table.truncate();
        table.truncate();
        prop_assert_eq!(table.len(), 0);

        // Every previously-used key is insertable again post-truncate.
        for id in inserted.iter().take(5) {
            prop_assert!(table
                .insert(vec![Value::Int(*id), Value::Text("again".into())])
                .is_ok());
        }
    }
}

proptest! {
    /// Inner join results are set-equivalent whether or not the join
    /// columns happen to be indexed — here both sides are always indexed
    /// (the PK), so this exercises the index path against a hand-rolled
    /// nested-loop oracle computed directly over the inserted tuples.
    #[test]
    fn inner_join_matches_nested_loop_oracle(
        left in prop::collection::vec(0i64..12, 0..20),
        right in prop::collection::vec(0i64..12, 0..20),
    ) {
        use memrel::interpreter::Statement;
        use memrel::{Selection, Store};

        let store = Store::new();
        let mut stmt = Statement::new(&store);
        stmt.modify("CREATE TABLE A (id INTEGER PRIMARY KEY, name TEXT);").unwrap();
        stmt.modify("CREATE TABLE B (id INTEGER PRIMARY KEY, name TEXT);").unwrap();

        let mut left_seen = HashSet::new();
        for id in &left {
            if left_seen.insert(*id) {
                stmt.modify(&format!("INSERT INTO A VALUES ({id} \"a{id}\");")).unwrap();
            }
        }
        let mut right_seen = HashSet::new();
        for id in &right {
            if right_seen.insert(*id) {
                stmt.modify(&format!("INSERT INTO B VALUES ({id} \"b{id}\");")).unwrap();
            }
        }

        let expected: HashSet<i64> = left_seen.intersection(&right_seen).copied().collect();

        let sel = stmt.select("SELECT * FROM A JOIN B ON A.id = B.id;").unwrap();
        let mut actual = HashSet::new();
        while !sel.end() {
            actual.insert(sel.get_long(0).unwrap());
            sel.next();
        }

        prop_assert_eq!(actual, expected);
    }
}
