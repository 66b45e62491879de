use crate::{error::Result, sql::schema::Table};

/// Abstract persistence backend (whole-table snapshots)
///
/// Different from sql::engine::Engine which executes statements against
/// the in-memory catalog.
pub trait Engine {
    /// Replaces the stored snapshot of `table`
    fn save(&mut self, table: &Table) -> Result<()>;

    /// Reads back every stored table. Any unreadable snapshot fails the whole load.
    fn load_all(&mut self) -> Result<Vec<Table>>;
}

#[cfg(test)]
mod tests {
    use super::Engine;
    use crate::{
        error::Result,
        sql::{
            schema::{Column, Table},
            types::{DataType, Value},
        },
        storage::{disk::DiskEngine, memory::MemoryEngine},
    };

    fn table(name: &str, ids: &[i64]) -> Result<Table> {
        let mut table = Table::new(name.to_string(), vec![Column::new("id", DataType::Integer)]);
        for id in ids {
            table.add_row(vec![Value::Integer(*id)])?;
        }
        Ok(table)
    }

    fn test_save_load(mut eng: impl Engine) -> Result<()> {
        assert!(eng.load_all()?.is_empty());

        eng.save(&table("b", &[1, 2])?)?;
        eng.save(&table("a", &[])?)?;
        // later saves overwrite the previous snapshot
        eng.save(&table("b", &[3])?)?;

        let tables = eng.load_all()?;
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0], table("a", &[])?);
        assert_eq!(tables[1], table("b", &[3])?);
        Ok(())
    }

    #[test]
    fn test_memory() -> Result<()> {
        test_save_load(MemoryEngine::new())
    }

    #[test]
    fn test_disk() -> Result<()> {
        let dir = tempfile::tempdir()?;
        test_save_load(DiskEngine::new(dir.path())?)
    }
}
