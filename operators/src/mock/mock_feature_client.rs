use std::sync::{Arc, Mutex};

use geopatch_datatypes::error::BoxedError;

use crate::source::{FeatureIter, FeatureIterationClient, FeatureQuery};
use crate::util::{Result, safe_lock_mutex};

/// A `FeatureIterationClient` that serves features from memory and records all queries
#[derive(Debug, Clone)]
pub struct MockFeatureClient {
    features: Vec<geojson::Feature>,
    fail_after: Option<usize>,
    queries: Arc<Mutex<Vec<FeatureQuery>>>,
}

impl MockFeatureClient {
    pub fn new(features: Vec<geojson::Feature>) -> Self {
        Self {
            features,
            fail_after: None,
            queries: Arc::default(),
        }
    }

    /// Yields `count` features and then an error, e.g. a failing page
    #[must_use]
    pub fn fail_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// All queries so far
    pub fn queries(&self) -> Vec<FeatureQuery> {
        safe_lock_mutex(&self.queries).clone()
    }
}

impl FeatureIterationClient for MockFeatureClient {
    fn iterate_features(&self, query: &FeatureQuery) -> Result<FeatureIter<'_>, BoxedError> {
        safe_lock_mutex(&self.queries).push(query.clone());

        let features = self
            .features
            .iter()
            .skip(query.offset)
            .take(self.fail_after.unwrap_or(usize::MAX))
            .cloned()
            .map(Ok::<_, BoxedError>);

        let failure = self
            .fail_after
            .map(|count| Err(format!("page after feature {count} failed").into()));

        Ok(Box::new(features.chain(failure)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ServiceAccessConfig;

    fn feature(x: f64) -> geojson::Feature {
        geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![x, 0.]))),
            id: None,
            properties: None,
            foreign_members: None,
        }
    }

    fn query(offset: usize) -> FeatureQuery {
        FeatureQuery {
            table: "1749".to_string(),
            bbox: None,
            offset,
            config: ServiceAccessConfig {
                base_url: "https://example.com/".parse().unwrap(),
                instance_id: String::new(),
                timeout_seconds: 1,
            },
            extra_params: serde_json::Map::new(),
        }
    }

    #[test]
    fn serves_from_offset() {
        let client = MockFeatureClient::new(vec![feature(1.), feature(2.), feature(3.)]);

        let features = client
            .iterate_features(&query(1))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(features, vec![feature(2.), feature(3.)]);
        assert_eq!(client.queries(), vec![query(1)]);
    }

    #[test]
    fn fails_after() {
        let client =
            MockFeatureClient::new(vec![feature(1.), feature(2.), feature(3.)]).fail_after(2);

        let results = client
            .iterate_features(&query(0))
            .unwrap()
            .collect::<Vec<_>>();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(results[2].is_err());
    }
}
