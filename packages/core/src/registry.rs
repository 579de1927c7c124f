//! Process-wide registry of datastore plugins.
//!
//! Plugins register once at startup under a type name. A host then turns a
//! config map such as `{"type": "ds_http", "serverURL": "..."}` into a
//! datastore without knowing the concrete backend:
//!
//! ```rust,ignore
//! datastore_http::register()?;
//!
//! let config: ConfigMap = serde_json::from_str(r#"{"type": "ds_http"}"#)?;
//! let store = datastore_core::registry::open(&config, Path::new("/repo"))?;
//! ```

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use lazy_static::lazy_static;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::traits::Datastore;

/// Raw datastore configuration, as found in a repo config file.
pub type ConfigMap = serde_json::Map<String, Value>;

/// The key holding the datastore type name in a [`ConfigMap`].
pub const TYPE_FIELD: &str = "type";

/// Common plugin metadata.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    /// Called once when the plugin is registered.
    fn init(&self) -> Result<()> {
        Ok(())
    }
}

/// A parsed datastore configuration.
pub trait DatastoreConfig: Send + Sync + fmt::Debug {
    /// The fields that identify the datastore's on-disk layout.
    ///
    /// Hosts compare disk specs to detect config changes that would make an
    /// existing repo unreadable.
    fn disk_spec(&self) -> ConfigMap;

    /// Open the datastore for the repo at `repo_path`.
    fn create(&self, repo_path: &Path) -> Result<Box<dyn Datastore>>;
}

/// Parses a [`ConfigMap`] into a [`DatastoreConfig`].
pub type ConfigParser = fn(&ConfigMap) -> Result<Box<dyn DatastoreConfig>>;

/// A plugin that provides a datastore type.
pub trait DatastorePlugin: Plugin {
    /// The value of the config's `type` field that selects this plugin.
    fn datastore_type_name(&self) -> &str;

    fn config_parser(&self) -> ConfigParser;
}

lazy_static! {
    static ref DATASTORE_PLUGINS: RwLock<BTreeMap<String, Arc<dyn DatastorePlugin>>> =
        RwLock::new(BTreeMap::new());
}

/// Register a datastore plugin.
///
/// Returns `Ok(false)` without calling `init` if the type name is already
/// taken; the first registration stays in effect. `init` runs with no
/// registry lock held, so it may use the registry itself.
pub fn register_plugin(plugin: Arc<dyn DatastorePlugin>) -> Result<bool> {
    let type_name = plugin.datastore_type_name().to_string();

    let taken = DATASTORE_PLUGINS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains_key(&type_name);
    if taken {
        return Ok(false);
    }

    plugin.init()?;

    let mut plugins = DATASTORE_PLUGINS
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    match plugins.entry(type_name) {
        Entry::Occupied(_) => Ok(false),
        Entry::Vacant(slot) => {
            slot.insert(plugin);
            Ok(true)
        }
    }
}

/// Names of all registered datastore types, sorted.
pub fn registered_types() -> Vec<String> {
    DATASTORE_PLUGINS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .keys()
        .cloned()
        .collect()
}

/// Look up the config parser for a datastore type.
pub fn config_parser(type_name: &str) -> Result<ConfigParser> {
    DATASTORE_PLUGINS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(type_name)
        .map(|plugin| plugin.config_parser())
        .ok_or_else(|| Error::UnknownDatastoreType {
            type_name: type_name.to_string(),
        })
}

/// Parse a config map using the plugin named by its `type` field.
pub fn parse_config(config: &ConfigMap) -> Result<Box<dyn DatastoreConfig>> {
    let type_name = match config.get(TYPE_FIELD) {
        Some(Value::String(name)) => name.as_str(),
        Some(other) => {
            return Err(Error::config(format!(
                "'{}' must be a string, got {}",
                TYPE_FIELD, other
            )))
        }
        None => return Err(Error::config(format!("missing '{}' field", TYPE_FIELD))),
    };

    let parser = config_parser(type_name)?;
    parser(config)
}

/// Parse a config map and open the datastore it describes.
pub fn open(config: &ConfigMap, repo_path: &Path) -> Result<Box<dyn Datastore>> {
    parse_config(config)?.create(repo_path)
}
