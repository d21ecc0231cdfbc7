// ============================
// clawcontrol-backend-lib/src/store/persist.rs
// ============================
//! Flat-file persistence for the document store: one JSON file per table
//! under the data directory.
use crate::error::AppError;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tokio::{fs as tokio_fs, io::AsyncWriteExt};

/// Writes and reads table snapshots as pretty-printed JSON arrays.
#[derive(Clone)]
pub struct FlatFileStore {
    root: PathBuf,
}

impl FlatFileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, AppError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{table}.json"))
    }

    /// Replace the snapshot for a table. Written via a temp file and
    /// renamed, so readers never observe a half-written snapshot.
    pub async fn write_table(&self, table: &str, json: &str) -> Result<(), AppError> {
        let path = self.table_path(table);
        let tmp = self.root.join(format!("{table}.json.tmp"));

        let mut file = tokio_fs::File::create(&tmp).await?;
        file.write_all(json.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;

        tokio_fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Read the snapshot for a table, or `None` if it was never written.
    pub async fn read_table(&self, table: &str) -> Result<Option<String>, AppError> {
        let path = self.table_path(table);

        if !path.exists() {
            return Ok(None);
        }

        let content = tokio_fs::read_to_string(&path).await?;
        Ok(Some(content))
    }
}
