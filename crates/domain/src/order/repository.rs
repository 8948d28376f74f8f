//! Order repository backed by a key-value store.

use common::OrderId;
use kv_store::{KeyValueStore, StoreError, WriteBatch};

use crate::error::{RepositoryError, Result};

use super::codec;
use super::keyspace::{ORDER_INDEX, ORDER_KEY_PATTERN, order_key};
use super::{Cursor, FindAllPage, FindResult, Order};

/// Persists orders in a key-value store and keeps the live-key index in step.
///
/// Each order lives at `order:<id>`, and the key of every live order is a
/// member of the `orders` set. The repository holds no state of its own
/// beyond the injected store, so it is safe to share between concurrent
/// requests whenever the store is.
///
/// Store failures are returned immediately; retry policy belongs to the caller.
pub struct OrderRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> OrderRepository<S> {
    /// Creates a repository over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stores a new order and registers its key in the index.
    ///
    /// Fails with [`RepositoryError::AlreadyExists`] if a record is already
    /// stored for the order ID; the existing record is left untouched.
    #[tracing::instrument(skip(self, order), fields(order_id = %order.order_id))]
    pub async fn insert(&self, order: &Order) -> Result<()> {
        observe("insert", self.write_new(order).await)
    }

    /// Loads the order stored for `id`.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_id(&self, id: OrderId) -> Result<Order> {
        observe("find_by_id", self.read_one(id).await)
    }

    /// Removes the order stored for `id` together with its index entry.
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_id(&self, id: OrderId) -> Result<()> {
        observe("delete_by_id", self.remove_one(id).await)
    }

    /// Overwrites an existing order. The index is not touched.
    #[tracing::instrument(skip(self, order), fields(order_id = %order.order_id))]
    pub async fn update(&self, order: &Order) -> Result<()> {
        observe("update", self.overwrite_existing(order).await)
    }

    /// Returns one page of live orders and the cursor for the next page.
    ///
    /// Start with [`FindAllPage::first`] and keep passing the returned cursor
    /// until [`FindResult::is_last_page`]. Orders inserted or deleted while a
    /// scan is in progress may or may not be seen; there is no snapshot.
    #[tracing::instrument(skip(self), fields(size = page.size, cursor = %page.cursor))]
    pub async fn find_all(&self, page: FindAllPage) -> Result<FindResult> {
        observe("find_all", self.scan_page(page).await)
    }

    async fn write_new(&self, order: &Order) -> Result<()> {
        let data = codec::encode(order).map_err(RepositoryError::Encode)?;
        let key = order_key(order.order_id);

        // SADD of an already indexed key is a no-op, so a rejected insert
        // leaves the index consistent with the existing record.
        let batch = WriteBatch::new()
            .set_if_absent(key.clone(), data)
            .set_add(ORDER_INDEX, key);

        let counts = self
            .store
            .execute(batch)
            .await
            .map_err(RepositoryError::StoreWrite)?;

        match counts.first() {
            Some(0) => Err(RepositoryError::AlreadyExists(order.order_id)),
            Some(_) => Ok(()),
            None => Err(RepositoryError::StoreWrite(unexpected("EXEC", &counts))),
        }
    }

    async fn read_one(&self, id: OrderId) -> Result<Order> {
        let key = order_key(id);

        let data = self
            .store
            .get(&key)
            .await
            .map_err(RepositoryError::StoreRead)?
            .ok_or(RepositoryError::NotExist)?;

        codec::decode(&data).map_err(|source| RepositoryError::Decode { key, source })
    }

    async fn remove_one(&self, id: OrderId) -> Result<()> {
        let key = order_key(id);
        let batch = WriteBatch::new()
            .delete(key.clone())
            .set_remove(ORDER_INDEX, key);

        let counts = self
            .store
            .execute(batch)
            .await
            .map_err(RepositoryError::StoreWrite)?;

        match counts.first() {
            Some(0) => Err(RepositoryError::NotExist),
            Some(_) => Ok(()),
            None => Err(RepositoryError::StoreWrite(unexpected("EXEC", &counts))),
        }
    }

    async fn overwrite_existing(&self, order: &Order) -> Result<()> {
        let data = codec::encode(order).map_err(RepositoryError::Encode)?;
        let key = order_key(order.order_id);

        let written = self
            .store
            .set_if_present(&key, data)
            .await
            .map_err(RepositoryError::StoreWrite)?;

        if written {
            Ok(())
        } else {
            Err(RepositoryError::NotExist)
        }
    }

    async fn scan_page(&self, page: FindAllPage) -> Result<FindResult> {
        let scan = self
            .store
            .scan_set(
                ORDER_INDEX,
                page.cursor.as_u64(),
                ORDER_KEY_PATTERN,
                page.size.max(1),
            )
            .await
            .map_err(RepositoryError::StoreRead)?;

        let cursor = Cursor::new(scan.cursor);
        if scan.members.is_empty() {
            return Ok(FindResult {
                orders: Vec::new(),
                cursor,
            });
        }

        let values = self
            .store
            .multi_get(&scan.members)
            .await
            .map_err(RepositoryError::StoreRead)?;

        if values.len() != scan.members.len() {
            return Err(RepositoryError::StoreRead(StoreError::UnexpectedReply {
                command: "MGET",
                reply: format!("{} values for {} keys", values.len(), scan.members.len()),
            }));
        }

        // A missing value decodes as empty input and fails the whole page.
        let orders = scan
            .members
            .into_iter()
            .zip(values)
            .map(|(key, value)| {
                codec::decode(value.as_deref().unwrap_or_default())
                    .map_err(|source| RepositoryError::Decode { key, source })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FindResult { orders, cursor })
    }
}

fn unexpected(command: &'static str, counts: &[u64]) -> StoreError {
    StoreError::UnexpectedReply {
        command,
        reply: format!("{counts:?}"),
    }
}

fn observe<T>(operation: &'static str, result: Result<T>) -> Result<T> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(err) => err.kind(),
    };
    metrics::counter!(
        "order_repository_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);

    if let Err(err) = &result
        && !matches!(
            err,
            RepositoryError::NotExist | RepositoryError::AlreadyExists(_)
        )
    {
        tracing::warn!(operation, error = %err, "order repository operation failed");
    }

    result
}
