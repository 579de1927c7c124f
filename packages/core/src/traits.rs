//! The datastore contract.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::context::Context;
use crate::error::Result;
use crate::key::Key;
use crate::query::{Entry, Query};

/// A key-value storage backend.
///
/// Every operation takes a [`Context`]; implementations must stop work and
/// return [`Error::Canceled`](crate::Error::Canceled) or
/// [`Error::DeadlineExceeded`](crate::Error::DeadlineExceeded) when it is
/// done.
///
/// # Absence
///
/// `get` and `get_size` report a missing key as
/// [`Error::NotFound`](crate::Error::NotFound), never as a transport or
/// remote error. `delete` of a missing key succeeds.
///
/// # Optional operations
///
/// `get_size`, `query`, and `batch` may return
/// [`Error::Unsupported`](crate::Error::Unsupported). A backend that does so
/// must do it on every call, regardless of state.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn Datastore>`.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, ctx: &Context, key: &Key, value: Bytes) -> Result<()>;

    /// Fetch the value stored under `key`.
    async fn get(&self, ctx: &Context, key: &Key) -> Result<Bytes>;

    /// Check whether `key` exists without fetching its value.
    async fn has(&self, ctx: &Context, key: &Key) -> Result<bool>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, ctx: &Context, key: &Key) -> Result<()>;

    /// Size in bytes of the value stored under `key`.
    async fn get_size(&self, ctx: &Context, key: &Key) -> Result<usize>;

    async fn query(&self, ctx: &Context, query: &Query) -> Result<Vec<Entry>>;

    /// Start a batch of writes applied together on commit.
    async fn batch(&self, ctx: &Context) -> Result<Box<dyn Batch>>;

    /// Flush writes under `prefix` to durable storage.
    async fn sync(&self, ctx: &Context, prefix: &Key) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// Writes buffered by [`Datastore::batch`].
#[async_trait]
pub trait Batch: Send {
    async fn put(&mut self, ctx: &Context, key: Key, value: Bytes) -> Result<()>;

    async fn delete(&mut self, ctx: &Context, key: Key) -> Result<()>;

    async fn commit(self: Box<Self>, ctx: &Context) -> Result<()>;
}

// Blanket implementations for shared and boxed datastores

#[async_trait]
impl<T: Datastore + ?Sized> Datastore for Arc<T> {
    async fn put(&self, ctx: &Context, key: &Key, value: Bytes) -> Result<()> {
        (**self).put(ctx, key, value).await
    }

    async fn get(&self, ctx: &Context, key: &Key) -> Result<Bytes> {
        (**self).get(ctx, key).await
    }

    async fn has(&self, ctx: &Context, key: &Key) -> Result<bool> {
        (**self).has(ctx, key).await
    }

    async fn delete(&self, ctx: &Context, key: &Key) -> Result<()> {
        (**self).delete(ctx, key).await
    }

    async fn get_size(&self, ctx: &Context, key: &Key) -> Result<usize> {
        (**self).get_size(ctx, key).await
    }

    async fn query(&self, ctx: &Context, query: &Query) -> Result<Vec<Entry>> {
        (**self).query(ctx, query).await
    }

    async fn batch(&self, ctx: &Context) -> Result<Box<dyn Batch>> {
        (**self).batch(ctx).await
    }

    async fn sync(&self, ctx: &Context, prefix: &Key) -> Result<()> {
        (**self).sync(ctx, prefix).await
    }

    async fn close(&self) -> Result<()> {
        (**self).close().await
    }
}

#[async_trait]
impl<T: Datastore + ?Sized> Datastore for Box<T> {
    async fn put(&self, ctx: &Context, key: &Key, value: Bytes) -> Result<()> {
        (**self).put(ctx, key, value).await
    }

    async fn get(&self, ctx: &Context, key: &Key) -> Result<Bytes> {
        (**self).get(ctx, key).await
    }

    async fn has(&self, ctx: &Context, key: &Key) -> Result<bool> {
        (**self).has(ctx, key).await
    }

    async fn delete(&self, ctx: &Context, key: &Key) -> Result<()> {
        (**self).delete(ctx, key).await
    }

    async fn get_size(&self, ctx: &Context, key: &Key) -> Result<usize> {
        (**self).get_size(ctx, key).await
    }

    async fn query(&self, ctx: &Context, query: &Query) -> Result<Vec<Entry>> {
        (**self).query(ctx, query).await
    }

    async fn batch(&self, ctx: &Context) -> Result<Box<dyn Batch>> {
        (**self).batch(ctx).await
    }

    async fn sync(&self, ctx: &Context, prefix: &Key) -> Result<()> {
        (**self).sync(ctx, prefix).await
    }

    async fn close(&self) -> Result<()> {
        (**self).close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Operation};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// A simple in-memory datastore for testing.
    #[derive(Default)]
    struct TestDatastore {
        data: Arc<Mutex<BTreeMap<Key, Bytes>>>,
    }

    struct TestBatch {
        data: Arc<Mutex<BTreeMap<Key, Bytes>>>,
        ops: Vec<(Key, Option<Bytes>)>,
    }

    #[async_trait]
    impl Datastore for TestDatastore {
        async fn put(&self, ctx: &Context, key: &Key, value: Bytes) -> Result<()> {
            ctx.check(Operation::Put)?;
            self.data.lock().unwrap().insert(key.clone(), value);
            Ok(())
        }

        async fn get(&self, ctx: &Context, key: &Key) -> Result<Bytes> {
            ctx.check(Operation::Get)?;
            self.data
                .lock()
                .unwrap()
                .get(key)
                .cloned()
                .ok_or_else(|| Error::not_found(key))
        }

        async fn has(&self, ctx: &Context, key: &Key) -> Result<bool> {
            ctx.check(Operation::Has)?;
            Ok(self.data.lock().unwrap().contains_key(key))
        }

        async fn delete(&self, ctx: &Context, key: &Key) -> Result<()> {
            ctx.check(Operation::Delete)?;
            self.data.lock().unwrap().remove(key);
            Ok(())
        }

        async fn get_size(&self, ctx: &Context, key: &Key) -> Result<usize> {
            self.get(ctx, key).await.map(|v| v.len())
        }

        async fn query(&self, ctx: &Context, query: &Query) -> Result<Vec<Entry>> {
            ctx.check(Operation::Query)?;
            let data = self.data.lock().unwrap();
            let entries = data
                .iter()
                .filter(|(k, _)| {
                    query
                        .prefix
                        .as_ref()
                        .map_or(true, |p| k.as_str().starts_with(p.as_str()))
                })
                .skip(query.offset)
                .take(query.limit.unwrap_or(usize::MAX))
                .map(|(k, v)| Entry {
                    key: k.clone(),
                    value: (!query.keys_only).then(|| v.clone()),
                    size: Some(v.len()),
                })
                .collect();
            Ok(entries)
        }

        async fn batch(&self, ctx: &Context) -> Result<Box<dyn Batch>> {
            ctx.check(Operation::Batch)?;
            Ok(Box::new(TestBatch {
                data: self.data.clone(),
                ops: Vec::new(),
            }))
        }

        async fn sync(&self, _ctx: &Context, _prefix: &Key) -> Result<()> {
            Ok(())
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl Batch for TestBatch {
        async fn put(&mut self, _ctx: &Context, key: Key, value: Bytes) -> Result<()> {
            self.ops.push((key, Some(value)));
            Ok(())
        }

        async fn delete(&mut self, _ctx: &Context, key: Key) -> Result<()> {
            self.ops.push((key, None));
            Ok(())
        }

        async fn commit(self: Box<Self>, ctx: &Context) -> Result<()> {
            ctx.check(Operation::Batch)?;
            let mut data = self.data.lock().unwrap();
            for (key, value) in self.ops {
                match value {
                    Some(v) => {
                        data.insert(key, v);
                    }
                    None => {
                        data.remove(&key);
                    }
                }
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn basic_put_get_works() {
        let store = TestDatastore::default();
        let ctx = Context::background();
        let key = Key::new("/users/123");

        store
            .put(&ctx, &key, Bytes::from_static(b"hello world"))
            .await
            .unwrap();
        assert_eq!(
            store.get(&ctx, &key).await.unwrap(),
            Bytes::from_static(b"hello world")
        );
        assert_eq!(store.get_size(&ctx, &key).await.unwrap(), 11);

        let missing = store.get(&ctx, &Key::new("/nonexistent")).await;
        assert!(missing.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn object_safety_works() {
        let store: Box<dyn Datastore> = Box::new(TestDatastore::default());
        let ctx = Context::background();

        store
            .put(&ctx, &Key::new("test"), Bytes::from_static(b"data"))
            .await
            .unwrap();
        assert!(store.has(&ctx, &Key::new("test")).await.unwrap());

        store.delete(&ctx, &Key::new("test")).await.unwrap();
        store.delete(&ctx, &Key::new("test")).await.unwrap();
        assert!(!store.has(&ctx, &Key::new("test")).await.unwrap());
    }

    #[tokio::test]
    async fn arc_blanket_impl_works() {
        let store = Arc::new(TestDatastore::default());
        let ctx = Context::background();

        let shared: Arc<dyn Datastore> = store.clone();
        shared
            .put(&ctx, &Key::new("arc"), Bytes::from_static(b"shared"))
            .await
            .unwrap();
        assert!(store.has(&ctx, &Key::new("arc")).await.unwrap());
    }

    #[tokio::test]
    async fn batch_applies_on_commit() {
        let store = TestDatastore::default();
        let ctx = Context::background();
        store
            .put(&ctx, &Key::new("old"), Bytes::from_static(b"x"))
            .await
            .unwrap();

        let mut batch = store.batch(&ctx).await.unwrap();
        batch
            .put(&ctx, Key::new("new"), Bytes::from_static(b"y"))
            .await
            .unwrap();
        batch.delete(&ctx, Key::new("old")).await.unwrap();
        assert!(!store.has(&ctx, &Key::new("new")).await.unwrap());

        batch.commit(&ctx).await.unwrap();
        assert!(store.has(&ctx, &Key::new("new")).await.unwrap());
        assert!(!store.has(&ctx, &Key::new("old")).await.unwrap());
    }

    #[tokio::test]
    async fn query_respects_prefix_and_limit() {
        let store = TestDatastore::default();
        let ctx = Context::background();
        for name in ["/a/1", "/a/2", "/a/3", "/b/1"] {
            store
                .put(&ctx, &Key::new(name), Bytes::from_static(b"v"))
                .await
                .unwrap();
        }

        let entries = store
            .query(&ctx, &Query::all().with_prefix("/a").with_limit(2).keys_only())
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, Key::new("/a/1"));
        assert!(entries[0].value.is_none());
    }

    #[tokio::test]
    async fn canceled_context_is_honoured() {
        let store = TestDatastore::default();
        let ctx = Context::background();
        ctx.cancel();

        let err = store.get(&ctx, &Key::new("x")).await.unwrap_err();
        assert!(err.is_transport());
    }
}
