//! Collection metadata (`GET /collections/{collectionId}`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{CovJsonError, CovJsonResult};
use crate::parameters::Parameter;
use crate::types::{Availability, Extent};

/// A data collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collection {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<Extent>,

    /// Parameters available in this collection, keyed by name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub parameter_names: HashMap<String, Parameter>,
}

impl Collection {
    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameter_names.contains_key(name)
    }

    /// Published times, from the temporal extent.
    pub fn availability(&self) -> CovJsonResult<Availability> {
        self.extent
            .as_ref()
            .and_then(|e| e.temporal.as_ref())
            .ok_or_else(|| {
                CovJsonError::InvalidExtent(format!("collection '{}' has no temporal extent", self.id))
            })?
            .availability()
    }
}
