//! Embedded backend over a single [redb](https://docs.rs/redb) file.
//!
//! Every container is its own redb table mapping item names (`&str`) to
//! opaque values (`&[u8]`). Keys are resolved with [`parse_address`], so
//! `"users/alice"` lives in table `"users"` under item `"alice"` and a key
//! without a separator lives in table `"default"`.
//!
//! # `list` / `delete_tree`
//!
//! - `list("")` returns the names of all containers.
//! - `list(name)` returns the item names inside container `name`, in the
//!   engine's key order.
//! - `delete_tree(name)` drops container `name` with all of its items.
//!
//! Both fail with [`StoreError::NoSuchContainer`] when the container does
//! not exist. A `put` into an unknown container creates it, while a `get`
//! from one reports [`StoreError::NotFound`].

use std::fs;
use std::path::{Path, PathBuf};

use redb::{Database, ReadableTable, TableDefinition, TableError, TableHandle};
use tracing::{debug, info};

use crate::address::{parse_address, DEFAULT_CONTAINER};
use crate::error::{StoreError, StoreResult};
use crate::registry::ContainerRegistry;
use crate::traits::Store;

fn container_table(name: &str) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(name)
}

/// Store backed by a local redb file.
pub struct EmbeddedStore {
    path: PathBuf,
    db: Option<Database>,
    registry: ContainerRegistry,
}

impl EmbeddedStore {
    /// Open (or create) the store file at `path`.
    ///
    /// Ensures the `"default"` container exists and loads the current
    /// container listing into the registry.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Storage(redb::Error::Io(e)))?;
            }
        }

        let db = Database::create(path)?;
        let store = Self {
            path: path.to_path_buf(),
            db: Some(db),
            registry: ContainerRegistry::new(),
        };
        store.create_container(DEFAULT_CONTAINER)?;
        store.registry.replace_all(store.containers()?);

        info!(
            path = %store.path.display(),
            containers = store.registry.len(),
            "embedded store opened"
        );
        Ok(store)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Registry of containers known to exist.
    pub fn registry(&self) -> &ContainerRegistry {
        &self.registry
    }

    fn db(&self) -> StoreResult<&Database> {
        self.db.as_ref().ok_or(StoreError::Closed)
    }

    /// Create a container if it does not exist yet, and remember it.
    pub fn create_container(&self, name: &str) -> StoreResult<()> {
        let txn = self.db()?.begin_write()?;
        txn.open_table(container_table(name))?;
        txn.commit()?;
        self.registry.remember(name);
        debug!(container = name, "container ensured");
        Ok(())
    }

    /// Names of all containers, as reported by the engine.
    pub fn containers(&self) -> StoreResult<Vec<String>> {
        let txn = self.db()?.begin_read()?;
        let names = txn
            .list_tables()?
            .map(|handle| handle.name().to_string())
            .collect();
        Ok(names)
    }

    fn items(&self, container: &str) -> StoreResult<Vec<String>> {
        let txn = self.db()?.begin_read()?;
        let table = match txn.open_table(container_table(container)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => {
                return Err(StoreError::no_such_container(container))
            }
            Err(e) => return Err(e.into()),
        };

        let mut items = Vec::new();
        for entry in table.iter()? {
            let (item, _) = entry?;
            items.push(item.value().to_string());
        }
        Ok(items)
    }
}

impl Store for EmbeddedStore {
    /// `options[0]` is the path of the store file.
    fn init(options: &[String]) -> StoreResult<Self> {
        let path = options.first().ok_or_else(|| {
            StoreError::Config("file path required to init embedded store".into())
        })?;
        Self::open(path)
    }

    fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        let addr = parse_address(key);
        let txn = self.db()?.begin_read()?;
        let table = match txn.open_table(container_table(addr.container)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Err(StoreError::not_found(key)),
            Err(e) => return Err(e.into()),
        };

        // Copy out of the guard; it borrows engine pages owned by the transaction.
        match table.get(addr.item)? {
            Some(value) => Ok(value.value().to_vec()),
            None => Err(StoreError::not_found(key)),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let addr = parse_address(key);
        if !self.registry.exists(addr.container) {
            self.create_container(addr.container)?;
        }

        let txn = self.db()?.begin_write()?;
        {
            let mut table = txn.open_table(container_table(addr.container))?;
            table.insert(addr.item, value)?;
        }
        txn.commit()?;

        debug!(container = addr.container, item = addr.item, len = value.len(), "put");
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        let addr = parse_address(key);
        let txn = self.db()?.begin_write()?;

        // Opening the table in a write transaction would create it.
        let exists = txn
            .list_tables()?
            .any(|handle| handle.name() == addr.container);
        if !exists {
            txn.abort()?;
            self.registry.forget(addr.container);
            return Ok(());
        }

        {
            let mut table = txn.open_table(container_table(addr.container))?;
            table.remove(addr.item)?;
        }
        txn.commit()?;

        debug!(container = addr.container, item = addr.item, "delete");
        Ok(())
    }

    /// Empty `arg` lists containers; otherwise lists items of container `arg`.
    fn list(&self, arg: &str) -> StoreResult<Vec<String>> {
        if arg.is_empty() {
            return self.containers();
        }
        self.items(arg)
    }

    /// Drops container `arg` and every item in it.
    fn delete_tree(&self, arg: &str) -> StoreResult<()> {
        if arg.is_empty() {
            return Err(StoreError::no_such_container(arg));
        }
        let txn = self.db()?.begin_write()?;
        let existed = txn.delete_table(container_table(arg))?;
        self.registry.forget(arg);
        if !existed {
            txn.abort()?;
            return Err(StoreError::no_such_container(arg));
        }
        txn.commit()?;

        debug!(container = arg, "container deleted");
        Ok(())
    }

    fn close(&mut self) -> StoreResult<()> {
        if let Some(db) = self.db.take() {
            drop(db);
            info!(path = %self.path.display(), "embedded store closed");
        }
        Ok(())
    }
}

impl std::fmt::Debug for EmbeddedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedStore")
            .field("path", &self.path)
            .field("open", &self.db.is_some())
            .field("containers", &self.registry.len())
            .finish()
    }
}
