use bytes::Bytes;
use tokio::runtime::{Builder, Runtime};

use datastore_core::{Batch, Context, Datastore, Entry, Error, Key, Query, Result};

use crate::store::HttpDatastore;

/// A synchronous wrapper around [`HttpDatastore`].
///
/// Owns a small tokio runtime and blocks the calling thread for each
/// operation. Semantics, including cancellation through [`Context`], are
/// identical to the async datastore.
///
/// Must not be called or dropped from inside an async runtime.
///
/// # Example
///
/// ```ignore
/// use datastore_core::{Context, IdentityKeyEncoder, Key};
/// use datastore_http::blocking::BlockingHttpDatastore;
///
/// let store = BlockingHttpDatastore::new("http://127.0.0.1:9500")?;
/// let ctx = Context::background();
///
/// store.put(&ctx, &Key::new("/CIQ..."), "bar")?;
/// let value = store.get(&ctx, &Key::new("/CIQ..."))?;
/// ```
pub struct BlockingHttpDatastore {
    inner: HttpDatastore,
    runtime: Runtime,
}

impl BlockingHttpDatastore {
    /// Create a blocking datastore for the store at `endpoint`.
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::from_datastore(HttpDatastore::new(endpoint)?)
    }

    /// Wrap an existing datastore.
    pub fn from_datastore(inner: HttpDatastore) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("datastore-http")
            .enable_all()
            .build()
            .map_err(|e| Error::config(format!("failed to start runtime: {}", e)))?;

        Ok(Self { inner, runtime })
    }

    /// The wrapped async datastore.
    pub fn inner(&self) -> &HttpDatastore {
        &self.inner
    }

    pub fn put(&self, ctx: &Context, key: &Key, value: impl Into<Bytes>) -> Result<()> {
        self.runtime.block_on(self.inner.put(ctx, key, value.into()))
    }

    pub fn get(&self, ctx: &Context, key: &Key) -> Result<Bytes> {
        self.runtime.block_on(self.inner.get(ctx, key))
    }

    pub fn has(&self, ctx: &Context, key: &Key) -> Result<bool> {
        self.runtime.block_on(self.inner.has(ctx, key))
    }

    pub fn delete(&self, ctx: &Context, key: &Key) -> Result<()> {
        self.runtime.block_on(self.inner.delete(ctx, key))
    }

    pub fn get_size(&self, ctx: &Context, key: &Key) -> Result<usize> {
        self.runtime.block_on(self.inner.get_size(ctx, key))
    }

    pub fn query(&self, ctx: &Context, query: &Query) -> Result<Vec<Entry>> {
        self.runtime.block_on(self.inner.query(ctx, query))
    }

    pub fn batch(&self, ctx: &Context) -> Result<Box<dyn Batch>> {
        self.runtime.block_on(self.inner.batch(ctx))
    }

    pub fn sync(&self, ctx: &Context, prefix: &Key) -> Result<()> {
        self.runtime.block_on(self.inner.sync(ctx, prefix))
    }

    pub fn close(&self) -> Result<()> {
        self.runtime.block_on(self.inner.close())
    }
}
