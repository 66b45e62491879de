use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    error::Result,
    sql::schema::Table,
    storage::{Storage, engine::Engine as StorageEngine},
};

use super::{Catalog, Engine};

/// In-process SQL engine over a shared, mutex-guarded catalog
pub struct LocalEngine<E: StorageEngine> {
    storage: Arc<Mutex<Storage<E>>>,
}

impl<E: StorageEngine> Clone for LocalEngine<E> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
        }
    }
}

impl<E: StorageEngine> LocalEngine<E> {
    /// Wraps a storage backend, loading every table it has persisted
    pub fn new(engine: E) -> Result<Self> {
        let mut storage = Storage::new(engine);
        storage.load_all_tables()?;
        Ok(Self {
            storage: Arc::new(Mutex::new(storage)),
        })
    }
}

impl<E: StorageEngine + 'static> Engine for LocalEngine<E> {
    type Catalog = Storage<E>;

    fn catalog(&self) -> Result<MutexGuard<'_, Self::Catalog>> {
        Ok(self.storage.lock()?)
    }
}

impl<E: StorageEngine> Catalog for Storage<E> {
    fn create_table(&mut self, table: Table) -> Result<()> {
        Storage::create_table(self, table)
    }

    fn get_table(&self, table_name: &str) -> Option<&Table> {
        Storage::get_table(self, table_name)
    }

    fn get_table_mut(&mut self, table_name: &str) -> Option<&mut Table> {
        Storage::get_table_mut(self, table_name)
    }

    fn save_table(&mut self, table_name: &str) -> Result<()> {
        Storage::save_table(self, table_name)
    }

    fn list_tables(&self) -> Vec<String> {
        Storage::list_tables(self)
    }
}
