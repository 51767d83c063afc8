use std::sync::Arc;

use geopatch_datatypes::error::BoxedError;
use geopatch_datatypes::primitives::BoundingRegion;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::config::{self, get_config_element};
use crate::util::Result;

/// Access parameters of the remote feature service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccessConfig {
    pub base_url: Url,
    pub instance_id: String,
    pub timeout_seconds: u64,
}

impl ServiceAccessConfig {
    /// Reads the `[service_access]` section of the settings
    pub fn from_settings() -> Result<Self> {
        let service_access: config::ServiceAccess = get_config_element()?;
        Ok(service_access.into())
    }
}

impl From<config::ServiceAccess> for ServiceAccessConfig {
    fn from(service_access: config::ServiceAccess) -> Self {
        Self {
            base_url: service_access.base_url,
            instance_id: service_access.instance_id,
            timeout_seconds: service_access.timeout_seconds,
        }
    }
}

/// A query for the features of a remote table
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureQuery {
    pub table: String,
    /// the queried extent in the native projection of the service, `None` for the whole table
    pub bbox: Option<BoundingRegion>,
    /// the number of features to skip
    pub offset: usize,
    pub config: ServiceAccessConfig,
    pub extra_params: Map<String, Value>,
}

pub type FeatureIter<'a> = Box<dyn Iterator<Item = Result<geojson::Feature, BoxedError>> + 'a>;

/// Iterates the features of a remote table. Implementations handle the pagination.
pub trait FeatureIterationClient {
    fn iterate_features(&self, query: &FeatureQuery) -> Result<FeatureIter<'_>, BoxedError>;
}

impl<T> FeatureIterationClient for &T
where
    T: FeatureIterationClient + ?Sized,
{
    fn iterate_features(&self, query: &FeatureQuery) -> Result<FeatureIter<'_>, BoxedError> {
        (**self).iterate_features(query)
    }
}

impl<T> FeatureIterationClient for Arc<T>
where
    T: FeatureIterationClient + ?Sized,
{
    fn iterate_features(&self, query: &FeatureQuery) -> Result<FeatureIter<'_>, BoxedError> {
        (**self).iterate_features(query)
    }
}
