//! Configuration for the HTTP datastore.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use datastore_core::{
    Codec, ConfigMap, Datastore, DatastoreConfig, Error, IdentityKeyEncoder, KeyEncoder,
    MultihashKeyEncoder, Result,
};

use crate::store::{HttpDatastore, DEFAULT_TIMEOUT};

/// Datastore type name used in repo configs.
pub const DATASTORE_TYPE: &str = "ds_http";

/// Environment variable consulted when no server URL is configured.
pub const SERVER_URL_ENV: &str = "HTTP_DATASTORE_URL";

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:9500";

/// Config for a `ds_http` datastore.
///
/// ```json
/// {
///   "type": "ds_http",
///   "serverURL": "http://127.0.0.1:9500",
///   "timeout": 30,
///   "keyEncoding": "multihash",
///   "codec": "dag-pb"
/// }
/// ```
///
/// Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "serverURL", default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,

    /// Request timeout in seconds.
    #[serde(rename = "timeout", default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// `multihash` (default) or `identity`.
    #[serde(rename = "keyEncoding", default, skip_serializing_if = "Option::is_none")]
    pub key_encoding: Option<String>,

    /// `dag-pb` (default), `raw`, or `dag-cbor`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
}

impl HttpConfig {
    pub fn with_server_url(url: impl Into<String>) -> Self {
        Self {
            server_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Parse from a repo config map. Unknown fields, including `type`, are
    /// ignored.
    pub fn from_map(map: &ConfigMap) -> Result<Self> {
        let config: HttpConfig = serde_json::from_value(Value::Object(map.clone()))
            .map_err(|e| Error::config(format!("invalid {} config: {}", DATASTORE_TYPE, e)))?;

        config.codec()?;
        config.key_encoder()?;
        Ok(config)
    }

    /// The server URL: configured value, then `HTTP_DATASTORE_URL`, then the
    /// loopback default.
    pub fn resolve_server_url(&self) -> String {
        self.resolve_server_url_with(std::env::var(SERVER_URL_ENV).ok())
    }

    fn resolve_server_url_with(&self, env_value: Option<String>) -> String {
        self.server_url
            .clone()
            .filter(|url| !url.is_empty())
            .or(env_value.filter(|url| !url.is_empty()))
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn codec(&self) -> Result<Codec> {
        match self.codec.as_deref() {
            None => Ok(Codec::default()),
            Some(name) => Codec::from_name(name)
                .ok_or_else(|| Error::config(format!("unknown codec '{}'", name))),
        }
    }

    pub fn key_encoder(&self) -> Result<Arc<dyn KeyEncoder>> {
        let codec = self.codec()?;
        match self.key_encoding.as_deref() {
            None | Some("multihash") => Ok(Arc::new(MultihashKeyEncoder::new(codec))),
            Some("identity") => Ok(Arc::new(IdentityKeyEncoder::new(codec))),
            Some(other) => Err(Error::config(format!("unknown key encoding '{}'", other))),
        }
    }
}

impl DatastoreConfig for HttpConfig {
    /// The type, server URL, and addressing fields.
    ///
    /// The server URL is reported as configured (empty when unset) so an
    /// environment override does not look like a config change.
    fn disk_spec(&self) -> ConfigMap {
        let mut spec = ConfigMap::new();
        spec.insert("type".to_string(), Value::from(DATASTORE_TYPE));
        spec.insert(
            "serverURL".to_string(),
            Value::from(self.server_url.clone().unwrap_or_default()),
        );
        if let Some(encoding) = &self.key_encoding {
            spec.insert("keyEncoding".to_string(), Value::from(encoding.clone()));
        }
        if let Some(codec) = &self.codec {
            spec.insert("codec".to_string(), Value::from(codec.clone()));
        }
        spec
    }

    /// Open the datastore. The repo path is unused: nothing is stored locally.
    fn create(&self, _repo_path: &Path) -> Result<Box<dyn Datastore>> {
        Ok(Box::new(HttpDatastore::from_config(self)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> ConfigMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn parses_server_url() {
        let config = HttpConfig::from_map(&map(json!({
            "type": "ds_http",
            "serverURL": "http://store.local:9500"
        })))
        .unwrap();
        assert_eq!(config.server_url.as_deref(), Some("http://store.local:9500"));
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn rejects_malformed_fields() {
        for bad in [
            json!({"serverURL": 9500}),
            json!({"timeout": "soon"}),
            json!({"codec": "git-raw"}),
            json!({"keyEncoding": "sha1"}),
        ] {
            let err = HttpConfig::from_map(&map(bad.clone())).unwrap_err();
            assert!(matches!(err, Error::Config { .. }), "{} -> {:?}", bad, err);
        }
    }

    #[test]
    fn server_url_resolution_order() {
        let explicit = HttpConfig::with_server_url("http://a:1");
        assert_eq!(
            explicit.resolve_server_url_with(Some("http://env:2".to_string())),
            "http://a:1"
        );

        let unset = HttpConfig::default();
        assert_eq!(
            unset.resolve_server_url_with(Some("http://env:2".to_string())),
            "http://env:2"
        );
        assert_eq!(unset.resolve_server_url_with(None), DEFAULT_SERVER_URL);

        let empty = HttpConfig::with_server_url("");
        assert_eq!(empty.resolve_server_url_with(None), DEFAULT_SERVER_URL);
    }

    #[test]
    fn timeout_override() {
        let config = HttpConfig::from_map(&map(json!({"timeout": 5}))).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn encoder_selection() {
        let config = HttpConfig::from_map(&map(json!({
            "keyEncoding": "identity",
            "codec": "raw"
        })))
        .unwrap();
        let encoder = config.key_encoder().unwrap();
        assert_eq!(encoder.codec(), Codec::Raw);
        assert_eq!(
            encoder
                .encode(&datastore_core::Key::new("foo"))
                .unwrap()
                .as_str(),
            "bafkqabbpmzxw6"
        );

        let default = HttpConfig::default().key_encoder().unwrap();
        assert_eq!(default.codec(), Codec::DagProtobuf);
    }

    #[test]
    fn disk_spec_identifies_store() {
        let spec = HttpConfig::with_server_url("http://a:1").disk_spec();
        assert_eq!(spec.get("type"), Some(&json!("ds_http")));
        assert_eq!(spec.get("serverURL"), Some(&json!("http://a:1")));
        assert!(spec.get("codec").is_none());

        let unset = HttpConfig::default().disk_spec();
        assert_eq!(unset.get("serverURL"), Some(&json!("")));
    }

    #[test]
    fn create_opens_datastore() {
        let config = HttpConfig::with_server_url("http://127.0.0.1:9500");
        assert!(config.create(Path::new("/tmp/repo")).is_ok());

        let bad = HttpConfig::with_server_url("ftp://nowhere");
        assert!(matches!(
            bad.create(Path::new("/tmp/repo")),
            Err(Error::InvalidEndpoint { .. })
        ));
    }
}
