//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::Arc;

use lxforge_core::{UserId, VpsId};
use parking_lot::Mutex;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::locks::KeyLocks;
use crate::schema::{all_column_families, cf, NEXT_VPS_ID_KEY};
use crate::types::{Account, NewVps, VpsRecord, VpsStatus};
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    account_locks: KeyLocks,
    vps_locks: KeyLocks,
    id_counter_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let path = path.as_ref();
        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        info!(path = %path.display(), "opened store");

        Ok(Self {
            db: Arc::new(db),
            account_locks: KeyLocks::new(),
            vps_locks: KeyLocks::new(),
            id_counter_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Read an account, defaulting to an empty one for unknown users.
    fn read_account(&self, user_id: UserId) -> Result<Account> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(user_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map_or(Ok(Account::empty(user_id)), |data| {
                Self::deserialize(&data)
            })
    }

    /// Write an account record.
    fn write_account(&self, account: &Account) -> Result<()> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(account.user_id);
        let value = Self::serialize(account)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Allocate the next VPS id from the meta counter.
    ///
    /// Ids start at 1 to match the original registry's numbering.
    fn allocate_vps_id(&self) -> Result<VpsId> {
        let _guard = self.id_counter_lock.lock();
        let cf = self.cf(cf::META)?;

        let next = self
            .db
            .get_cf(&cf, NEXT_VPS_ID_KEY)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map_or(Ok(1u64), |data| {
                let bytes: [u8; 8] = data
                    .as_slice()
                    .try_into()
                    .map_err(|_| StoreError::CorruptCounter(data.len()))?;
                Ok(u64::from_be_bytes(bytes))
            })?;

        self.db
            .put_cf(&cf, NEXT_VPS_ID_KEY, (next + 1).to_be_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(VpsId::new(next))
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Credit Ledger Operations
    // =========================================================================

    fn balance(&self, user_id: UserId) -> Result<u64> {
        Ok(self.read_account(user_id)?.credits)
    }

    fn add_credits(&self, user_id: UserId, amount: u64) -> Result<u64> {
        let lock = self.account_locks.acquire(user_id.as_u64());
        let _guard = lock.lock();

        let mut account = self.read_account(user_id)?;
        account.credits = account.credits.saturating_add(amount);
        self.write_account(&account)?;

        Ok(account.credits)
    }

    fn check_and_debit(&self, user_id: UserId, amount: u64) -> Result<Option<u64>> {
        let lock = self.account_locks.acquire(user_id.as_u64());
        let _guard = lock.lock();

        let mut account = self.read_account(user_id)?;
        if account.credits < amount {
            return Ok(None);
        }
        account.credits -= amount;
        self.write_account(&account)?;

        Ok(Some(account.credits))
    }

    fn remove_credits(&self, user_id: UserId, amount: u64) -> Result<u64> {
        let lock = self.account_locks.acquire(user_id.as_u64());
        let _guard = lock.lock();

        let mut account = self.read_account(user_id)?;
        account.credits = account.credits.saturating_sub(amount);
        self.write_account(&account)?;

        Ok(account.credits)
    }

    fn set_credits_zero(&self, user_id: UserId) -> Result<()> {
        let lock = self.account_locks.acquire(user_id.as_u64());
        let _guard = lock.lock();

        self.write_account(&Account::empty(user_id))
    }

    // =========================================================================
    // VPS Registry Operations
    // =========================================================================

    fn create_vps(&self, new: NewVps) -> Result<VpsRecord> {
        let record = VpsRecord {
            id: self.allocate_vps_id()?,
            owner_id: new.owner_id,
            container_name: new.container_name,
            plan_key: new.plan_key,
            ram_mb: new.ram_mb,
            cpu_cores: new.cpu_cores,
            arch: new.arch,
            status: VpsStatus::Running,
            created_at: chrono::Utc::now(),
        };

        let cf_vps = self.cf(cf::VPS)?;
        let cf_by_owner = self.cf(cf::VPS_BY_OWNER)?;

        let vps_key = keys::vps_key(record.id);
        let owner_key = keys::owner_vps_key(record.owner_id, record.id);
        let value = Self::serialize(&record)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_vps, vps_key, &value);
        batch.put_cf(&cf_by_owner, &owner_key, []);

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        debug!(vps_id = %record.id, owner = %record.owner_id, "created vps record");
        Ok(record)
    }

    fn get_vps(&self, vps_id: VpsId) -> Result<Option<VpsRecord>> {
        let cf = self.cf(cf::VPS)?;
        let key = keys::vps_key(vps_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_vps_by_owner(&self, owner_id: UserId) -> Result<Vec<VpsRecord>> {
        let cf_by_owner = self.cf(cf::VPS_BY_OWNER)?;
        let prefix = keys::owner_prefix(owner_id);

        let mut records = Vec::new();
        let iter = self.db.iterator_cf(
            &cf_by_owner,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            // Stop if we're past the prefix
            if !key.starts_with(&prefix) {
                break;
            }

            let vps_id = keys::extract_vps_id_from_owner_key(&key);
            if let Some(record) = self.get_vps(vps_id)? {
                records.push(record);
            }
        }

        Ok(records)
    }

    fn list_all_vps(&self) -> Result<Vec<VpsRecord>> {
        let cf = self.cf(cf::VPS)?;

        let mut records = Vec::new();
        let iter = self.db.iterator_cf(&cf, IteratorMode::Start);

        for item in iter {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let record: VpsRecord = Self::deserialize(&value)?;
            records.push(record);
        }

        Ok(records)
    }

    fn delete_vps(&self, vps_id: VpsId) -> Result<()> {
        let lock = self.vps_locks.acquire(vps_id.as_u64());
        let _guard = lock.lock();

        let cf_vps = self.cf(cf::VPS)?;
        let cf_by_owner = self.cf(cf::VPS_BY_OWNER)?;

        // Get the record to find the owner for index removal
        let record = self.get_vps(vps_id)?.ok_or(StoreError::NotFound(vps_id))?;

        let vps_key = keys::vps_key(vps_id);
        let owner_key = keys::owner_vps_key(record.owner_id, vps_id);

        let mut batch = WriteBatch::default();
        batch.delete_cf(&cf_vps, vps_key);
        batch.delete_cf(&cf_by_owner, &owner_key);

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        debug!(vps_id = %vps_id, "deleted vps record");
        Ok(())
    }

    fn set_vps_status(&self, vps_id: VpsId, status: VpsStatus) -> Result<()> {
        let lock = self.vps_locks.acquire(vps_id.as_u64());
        let _guard = lock.lock();

        let mut record = self.get_vps(vps_id)?.ok_or(StoreError::NotFound(vps_id))?;
        record.status = status;

        let cf = self.cf(cf::VPS)?;
        let key = keys::vps_key(vps_id);
        let value = Self::serialize(&record)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}
