use std::collections::BTreeMap;

use crate::{
    error::Result,
    sql::schema::Table,
    storage::{engine::Engine, snapshot},
};

/// In-memory storage engine
///
/// Keeps encoded snapshots keyed by table name, so it goes through the same
/// encoding as the disk engine without touching the filesystem.
#[derive(Default)]
pub struct MemoryEngine {
    data: BTreeMap<String, Vec<u8>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
        }
    }
}

/// Implements storage Engine trait (snapshot persistence)
impl Engine for MemoryEngine {
    fn save(&mut self, table: &Table) -> Result<()> {
        self.data.insert(table.name.clone(), snapshot::encode(table)?);
        Ok(())
    }

    fn load_all(&mut self) -> Result<Vec<Table>> {
        self.data
            .values()
            .map(|bytes| snapshot::decode(bytes))
            .collect()
    }
}
