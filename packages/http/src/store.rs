//! The HTTP-backed datastore.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::StatusCode;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use datastore_core::{
    Batch, ContentId, Context, Datastore, Entry, Error, Key, KeyEncoder, MultihashKeyEncoder,
    Operation, Query, Result,
};

use crate::config::HttpConfig;
use crate::error;
use crate::types::Route;

/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const OCTET_STREAM: &str = "application/octet-stream";

/// A datastore whose values live in a remote HTTP object store.
///
/// Every operation converts the key to a [`ContentId`] and performs exactly
/// one HTTP exchange:
/// - `put` → `PUT /put/{id}` with the value as the body
/// - `get` → `GET /get/{id}`
/// - `has` → `HEAD /has/{id}`
/// - `delete` → `DELETE /delete/{id}`
///
/// `get_size`, `query`, and `batch` always fail with
/// [`Error::Unsupported`]: the remote store is addressed purely by content
/// id and offers no size, listing, or batch endpoint.
///
/// The datastore is cheap to clone and safe to share between tasks; clones
/// share one connection pool.
///
/// # Example
///
/// ```ignore
/// use datastore_core::{Context, Datastore, IdentityKeyEncoder, Key};
/// use datastore_http::HttpDatastore;
///
/// let store = HttpDatastore::new("http://127.0.0.1:9500")?
///     .with_encoder(IdentityKeyEncoder::default());
/// let ctx = Context::background();
///
/// store.put(&ctx, &Key::new("foo"), "bar".into()).await?;
/// assert_eq!(store.get(&ctx, &Key::new("foo")).await?, "bar");
/// assert!(!store.has(&ctx, &Key::new("missing")).await?);
/// ```
#[derive(Clone)]
pub struct HttpDatastore {
    client: Client,
    endpoint: Url,
    encoder: Arc<dyn KeyEncoder>,
}

/// A completed HTTP exchange.
struct Exchange {
    id: ContentId,
    url: Url,
    status: StatusCode,
    body: Bytes,
}

impl HttpDatastore {
    /// Create a datastore for the store at `endpoint` with the default timeout.
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// Create a datastore whose requests give up after `timeout`.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Self::with_client(client, endpoint)
    }

    /// Create a datastore with a custom reqwest client.
    pub fn with_client(client: Client, endpoint: &str) -> Result<Self> {
        let endpoint = parse_endpoint(endpoint)?;

        Ok(Self {
            client,
            endpoint,
            encoder: Arc::new(MultihashKeyEncoder::default()),
        })
    }

    /// Create a datastore from a parsed config.
    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        let store = Self::with_timeout(&config.resolve_server_url(), config.timeout())?;
        Ok(store.with_shared_encoder(config.key_encoder()?))
    }

    /// Replace the key-to-content-id strategy.
    pub fn with_encoder(self, encoder: impl KeyEncoder + 'static) -> Self {
        self.with_shared_encoder(Arc::new(encoder))
    }

    pub fn with_shared_encoder(mut self, encoder: Arc<dyn KeyEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The content id `key` is stored under.
    pub fn content_id(&self, key: &Key) -> Result<ContentId> {
        self.encoder.encode(key)
    }

    /// The URL for `route` on the object with content id `id`.
    pub fn url_for(&self, route: Route, id: &ContentId) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(route.segment())
                .push(id.as_str());
        }
        url
    }

    /// Perform one exchange for `key` on `route` under `ctx`.
    ///
    /// Fails without touching the network when the context is already done
    /// or the key cannot be encoded.
    async fn exchange(
        &self,
        ctx: &Context,
        route: Route,
        key: &Key,
        body: Option<Bytes>,
    ) -> Result<Exchange> {
        let op = route.operation();
        ctx.check(op)?;

        let id = self.encoder.encode(key)?;
        let url = self.url_for(route, &id);

        let mut request = self.client.request(route.method(), url.clone());
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, OCTET_STREAM).body(body);
        }

        let response = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = ctx
            .run(op, response)
            .await?
            .map_err(|e| error::transport(op, &url, e))?;

        Ok(Exchange {
            id,
            url,
            status,
            body,
        })
    }
}

impl Exchange {
    fn unexpected(&self, op: Operation) -> Error {
        warn!(
            op = %op,
            url = %self.url,
            status = self.status.as_u16(),
            "unexpected status from remote store"
        );
        error::unexpected_status(op, &self.url, self.status, &self.body)
    }
}

impl fmt::Debug for HttpDatastore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpDatastore")
            .field("endpoint", &self.endpoint.as_str())
            .field("codec", &self.encoder.codec())
            .finish()
    }
}

#[async_trait]
impl Datastore for HttpDatastore {
    async fn put(&self, ctx: &Context, key: &Key, value: Bytes) -> Result<()> {
        let len = value.len();
        let exchange = self.exchange(ctx, Route::Put, key, Some(value)).await?;

        match exchange.status {
            StatusCode::OK => {
                debug!(key = %key, cid = %exchange.id, bytes = len, "put");
                Ok(())
            }
            _ => Err(exchange.unexpected(Operation::Put)),
        }
    }

    async fn get(&self, ctx: &Context, key: &Key) -> Result<Bytes> {
        let exchange = self.exchange(ctx, Route::Get, key, None).await?;

        match exchange.status {
            StatusCode::OK => {
                debug!(key = %key, cid = %exchange.id, bytes = exchange.body.len(), "get");
                Ok(exchange.body)
            }
            StatusCode::NOT_FOUND => Err(Error::NotFound {
                key: key.clone(),
                url: Some(exchange.url.to_string()),
            }),
            _ => Err(exchange.unexpected(Operation::Get)),
        }
    }

    async fn has(&self, ctx: &Context, key: &Key) -> Result<bool> {
        let exchange = self.exchange(ctx, Route::Has, key, None).await?;

        let exists = match exchange.status {
            StatusCode::OK => true,
            StatusCode::NOT_FOUND => false,
            _ => return Err(exchange.unexpected(Operation::Has)),
        };
        debug!(key = %key, cid = %exchange.id, exists, "has");
        Ok(exists)
    }

    async fn delete(&self, ctx: &Context, key: &Key) -> Result<()> {
        let exchange = self.exchange(ctx, Route::Delete, key, None).await?;

        match exchange.status {
            StatusCode::OK | StatusCode::NOT_FOUND => {
                debug!(key = %key, cid = %exchange.id, "delete");
                Ok(())
            }
            _ => Err(exchange.unexpected(Operation::Delete)),
        }
    }

    /// Always unsupported: the remote protocol has no size primitive, and
    /// fetching the value to measure it would defeat the point of asking.
    async fn get_size(&self, _ctx: &Context, _key: &Key) -> Result<usize> {
        Err(Error::Unsupported {
            op: Operation::GetSize,
        })
    }

    async fn query(&self, _ctx: &Context, _query: &Query) -> Result<Vec<Entry>> {
        Err(Error::Unsupported {
            op: Operation::Query,
        })
    }

    async fn batch(&self, _ctx: &Context) -> Result<Box<dyn Batch>> {
        Err(Error::Unsupported {
            op: Operation::Batch,
        })
    }

    /// The remote store owns durability, so there is nothing to flush.
    async fn sync(&self, ctx: &Context, _prefix: &Key) -> Result<()> {
        ctx.check(Operation::Sync)
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint).map_err(|e| error::invalid_endpoint(endpoint, e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(error::invalid_endpoint(
                endpoint,
                format!("unsupported scheme '{}'", other),
            ))
        }
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(error::invalid_endpoint(
            endpoint,
            "endpoint must not carry a query or fragment",
        ));
    }

    Ok(url)
}
