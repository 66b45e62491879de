use std::collections::HashMap;

use tracing::info;

use crate::{
    error::{Error, Result},
    sql::schema::Table,
};

pub mod disk;
pub mod engine;
pub mod index;
pub mod memory;
mod snapshot;

/// Table catalog owner
///
/// Holds every table in memory and writes each one back through the
/// persistence engine after it changes.
pub struct Storage<E: engine::Engine> {
    engine: E,
    tables: HashMap<String, Table>,
    /// Table names in creation (or load) order
    names: Vec<String>,
}

impl<E: engine::Engine> Storage<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            tables: HashMap::new(),
            names: Vec::new(),
        }
    }

    /// Loads every persisted table, rebuilding its indices from the rows.
    /// Returns the number of tables loaded.
    pub fn load_all_tables(&mut self) -> Result<usize> {
        let mut count = 0;
        for mut table in self.engine.load_all()? {
            table.rebuild_indexes()?;
            if !self.tables.contains_key(&table.name) {
                self.names.push(table.name.clone());
            }
            self.tables.insert(table.name.clone(), table);
            count += 1;
        }
        info!(tables = count, "loaded tables from storage");
        Ok(count)
    }

    pub fn create_table(&mut self, table: Table) -> Result<()> {
        if self.tables.contains_key(&table.name) {
            return Err(Error::AlreadyExists(table.name));
        }
        self.engine.save(&table)?;
        self.names.push(table.name.clone());
        self.tables.insert(table.name.clone(), table);
        Ok(())
    }

    pub fn get_table(&self, table_name: &str) -> Option<&Table> {
        self.tables.get(table_name)
    }

    pub fn get_table_mut(&mut self, table_name: &str) -> Option<&mut Table> {
        self.tables.get_mut(table_name)
    }

    pub fn save_table(&mut self, table_name: &str) -> Result<()> {
        let table = self
            .tables
            .get(table_name)
            .ok_or_else(|| Error::TableNotFound(table_name.to_string()))?;
        self.engine.save(table)
    }

    pub fn list_tables(&self) -> Vec<String> {
        self.names.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::Storage;
    use crate::{
        error::{Error, Result},
        sql::{
            schema::{Column, Table},
            types::{DataType, Value},
        },
        storage::memory::MemoryEngine,
    };

    fn users() -> Table {
        Table::new(
            "users".to_string(),
            vec![
                Column::new("id", DataType::Integer),
                Column::new("name", DataType::Text),
            ],
        )
    }

    #[test]
    fn test_create_and_list() -> Result<()> {
        let mut storage = Storage::new(MemoryEngine::new());
        storage.create_table(Table::new("zeta".to_string(), vec![Column::new("a", DataType::Float)]))?;
        storage.create_table(users())?;
        assert_eq!(storage.list_tables(), vec!["zeta".to_string(), "users".to_string()]);

        assert_eq!(
            storage.create_table(users()),
            Err(Error::AlreadyExists("users".to_string()))
        );
        assert!(storage.get_table("missing").is_none());
        assert_eq!(
            storage.save_table("missing"),
            Err(Error::TableNotFound("missing".to_string()))
        );
        Ok(())
    }

    #[test]
    fn test_reload_rebuilds_indexes() -> Result<()> {
        let dir = tempfile::tempdir()?;
        {
            let mut storage = Storage::new(crate::storage::disk::DiskEngine::new(dir.path())?);
            storage.create_table(users())?;
            let table = storage.get_table_mut("users").ok_or(Error::TableNotFound("users".into()))?;
            table.add_row(vec![Value::Integer(1), Value::from("ann")])?;
            table.add_row(vec![Value::Integer(2), Value::from("bob")])?;
            table.create_index("idx_name".to_string(), "name")?;
            storage.save_table("users")?;
        }

        let mut storage = Storage::new(crate::storage::disk::DiskEngine::new(dir.path())?);
        assert_eq!(storage.load_all_tables()?, 1);
        let table = storage.get_table("users").ok_or(Error::TableNotFound("users".into()))?;
        assert_eq!(table.rows.len(), 2);
        assert!(table.indexes.contains_key("name"));
        assert_eq!(table.find_rows("name", &Value::from("bob"))?, vec![1]);
        Ok(())
    }

    #[test]
    fn test_malformed_snapshot_fails_load() -> Result<()> {
        let mut engine = MemoryEngine::new();
        let mut table = users();
        table.add_row(vec![Value::Integer(1), Value::from("ann")])?;
        table.create_index("idx_name".to_string(), "name")?;
        table.rows.push(vec![Value::Integer(2)]);
        crate::storage::engine::Engine::save(&mut engine, &table)?;

        let mut storage = Storage::new(engine);
        assert!(matches!(storage.load_all_tables(), Err(Error::Internal(_))));
        assert!(storage.list_tables().is_empty());
        Ok(())
    }
}
