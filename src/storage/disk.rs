use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::{debug, error};

use crate::{
    error::{Error, Result},
    sql::schema::Table,
    storage::{engine::Engine, snapshot},
};

/// Snapshot file extension, one `<table>.db` file per table
pub const EXTENSION: &str = "db";

/// On-disk storage engine
///
/// A save writes the whole table to a temporary file in the data directory,
/// syncs it, then renames it over the previous snapshot. A crash mid-save
/// leaves the old snapshot in place.
pub struct DiskEngine {
    dir: PathBuf,
}

impl DiskEngine {
    /// Opens a data directory, creating it if missing
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn table_path(&self, table_name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", table_name, EXTENSION))
    }
}

impl Engine for DiskEngine {
    fn save(&mut self, table: &Table) -> Result<()> {
        let bytes = snapshot::encode(table)?;
        let path = self.table_path(&table.name);

        let mut file = NamedTempFile::new_in(&self.dir)?;
        file.write_all(&bytes)?;
        file.as_file().sync_all()?;
        file.persist(&path)?;

        debug!(path = %path.display(), bytes = bytes.len(), "saved table snapshot");
        Ok(())
    }

    fn load_all(&mut self) -> Result<Vec<Table>> {
        let mut paths = fs::read_dir(&self.dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        paths.retain(|p| p.is_file() && p.extension().is_some_and(|ext| ext == EXTENSION));
        paths.sort();

        let mut tables = Vec::with_capacity(paths.len());
        for path in paths {
            let table = fs::read(&path)
                .map_err(Error::from)
                .and_then(|bytes| snapshot::decode(&bytes))
                .and_then(|table| {
                    // the file name is where the next save of this table goes
                    if path.file_stem().is_some_and(|stem| stem == table.name.as_str()) {
                        Ok(table)
                    } else {
                        Err(Error::Internal(format!(
                            "file holds table {}, expected {}.{}",
                            table.name, table.name, EXTENSION
                        )))
                    }
                })
                .map_err(|err| {
                    error!(path = %path.display(), error = %err, "failed to load table snapshot");
                    Error::Internal(format!("cannot load {}: {}", path.display(), err))
                })?;
            tables.push(table);
        }
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::DiskEngine;
    use crate::{
        error::{Error, Result},
        sql::schema::{Column, Table},
        sql::types::{DataType, Value},
        storage::engine::Engine,
    };

    #[test]
    fn test_one_file_per_table() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut eng = DiskEngine::new(dir.path().join("nested"))?;

        let mut table = Table::new("users".to_string(), vec![Column::new("id", DataType::Integer)]);
        table.add_row(vec![Value::Integer(7)])?;
        eng.save(&table)?;

        let mut names = fs::read_dir(eng.dir())?
            .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<std::io::Result<Vec<_>>>()?;
        names.sort();
        assert_eq!(names, vec!["users.db".to_string()]);

        // files with other extensions are ignored
        fs::write(eng.dir().join("notes.txt"), b"hello")?;
        assert_eq!(eng.load_all()?, vec![table]);
        Ok(())
    }

    #[test]
    fn test_corrupt_snapshot_aborts_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut eng = DiskEngine::new(dir.path())?;
        eng.save(&Table::new(
            "good".to_string(),
            vec![Column::new("id", DataType::Integer)],
        ))?;
        fs::write(dir.path().join("bad.db"), b"not a snapshot")?;

        match eng.load_all() {
            Err(Error::Internal(msg)) => assert!(msg.contains("bad.db")),
            other => panic!("expected load error, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_malformed_rows_fail_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut eng = DiskEngine::new(dir.path())?;
        let mut table = Table::new(
            "pairs".to_string(),
            vec![
                Column::new("a", DataType::Integer),
                Column::new("b", DataType::Text),
            ],
        );
        table.add_row(vec![Value::Integer(1), Value::from("x")])?;
        table.create_index("idx_b".to_string(), "b")?;
        table.rows.push(vec![Value::Integer(2)]);
        eng.save(&table)?;

        match eng.load_all() {
            Err(Error::Internal(msg)) => assert!(msg.contains("pairs.db")),
            other => panic!("expected load error, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_renamed_file_fails_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut eng = DiskEngine::new(dir.path())?;
        eng.save(&Table::new(
            "users".to_string(),
            vec![Column::new("id", DataType::Integer)],
        ))?;
        fs::rename(dir.path().join("users.db"), dir.path().join("people.db"))?;

        match eng.load_all() {
            Err(Error::Internal(msg)) => assert!(msg.contains("people.db")),
            other => panic!("expected load error, got {:?}", other),
        }
        Ok(())
    }
}
