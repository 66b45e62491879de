use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    sql::schema::Table,
};

/// Version tag written at the head of every snapshot
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    table: &'a Table,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    table: Table,
}

/// Serializes a table (schema, rows and index definitions) into a snapshot
pub fn encode(table: &Table) -> Result<Vec<u8>> {
    Ok(bincode::serialize(&SnapshotRef {
        version: FORMAT_VERSION,
        table,
    })?)
}

/// Decodes a snapshot, rejecting unknown format versions before reading the
/// table and tables whose rows or indices disagree with their schema
pub fn decode(bytes: &[u8]) -> Result<Table> {
    let version: u32 = bincode::deserialize(bytes)?;
    if version != FORMAT_VERSION {
        return Err(Error::Internal(format!(
            "unsupported snapshot version {}",
            version
        )));
    }
    let snapshot: Snapshot = bincode::deserialize(bytes)?;
    let table = snapshot.table;
    table.check_integrity().map_err(|err| {
        Error::Internal(format!("inconsistent snapshot of table {}: {}", table.name, err))
    })?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::{FORMAT_VERSION, decode, encode};
    use crate::{
        error::{Error, Result},
        sql::{
            schema::{Column, Table},
            types::{DataType, Value},
        },
    };

    #[test]
    fn test_snapshot_keeps_indexes() -> Result<()> {
        let mut table = Table::new(
            "users".to_string(),
            vec![
                Column::new("id", DataType::Integer),
                Column::new("name", DataType::Text),
            ],
        );
        table.add_row(vec![Value::Integer(1), Value::from("alice")])?;
        table.create_index("idx_name".to_string(), "name")?;

        let decoded = decode(&encode(&table)?)?;
        assert_eq!(decoded, table);
        assert_eq!(decoded.find_rows("name", &Value::from("alice"))?, vec![0]);
        Ok(())
    }

    #[test]
    fn test_snapshot_rejects_unknown_version() -> Result<()> {
        let table = Table::new("t".to_string(), vec![Column::new("a", DataType::Boolean)]);
        let mut bytes = encode(&table)?;
        bytes[..4].copy_from_slice(&(FORMAT_VERSION + 1).to_le_bytes());
        assert!(matches!(decode(&bytes), Err(Error::Internal(_))));

        assert!(decode(b"garbage").is_err());
        Ok(())
    }

    #[test]
    fn test_snapshot_rejects_short_rows() -> Result<()> {
        let mut table = Table::new(
            "t".to_string(),
            vec![
                Column::new("a", DataType::Integer),
                Column::new("b", DataType::Text),
            ],
        );
        table.add_row(vec![Value::Integer(1), Value::from("x")])?;
        table.create_index("idx_b".to_string(), "b")?;
        table.rows.push(vec![Value::Integer(2)]);

        let bytes = encode(&table)?;
        assert!(matches!(decode(&bytes), Err(Error::Internal(_))));
        Ok(())
    }
}
