//! Registration of the `ds_http` datastore type.

use std::sync::Arc;

use datastore_core::registry::{self, ConfigParser};
use datastore_core::{ConfigMap, DatastoreConfig, DatastorePlugin, Plugin, Result};

use crate::config::{HttpConfig, DATASTORE_TYPE};

pub const PLUGIN_NAME: &str = "ds_http";
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Provides the `ds_http` datastore type to the registry.
#[derive(Debug, Default)]
pub struct HttpPlugin;

impl Plugin for HttpPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn version(&self) -> &str {
        PLUGIN_VERSION
    }

    fn init(&self) -> Result<()> {
        tracing::debug!(plugin = PLUGIN_NAME, version = PLUGIN_VERSION, "plugin loaded");
        Ok(())
    }
}

impl DatastorePlugin for HttpPlugin {
    fn datastore_type_name(&self) -> &str {
        DATASTORE_TYPE
    }

    fn config_parser(&self) -> ConfigParser {
        parse_config
    }
}

fn parse_config(map: &ConfigMap) -> Result<Box<dyn DatastoreConfig>> {
    Ok(Box::new(HttpConfig::from_map(map)?))
}

/// Register [`HttpPlugin`] with the process-wide registry.
///
/// Safe to call more than once; returns `Ok(false)` after the first call.
pub fn register() -> Result<bool> {
    registry::register_plugin(Arc::new(HttpPlugin))
}
