use std::sync::Arc;

use indexmap::IndexMap;

use crate::parse::parameter::ParamSpecs;

use super::resource::Resource;

/// Index into [`ApiSpec::resources`].
pub type ResourceId = usize;

/// A normalized API description: every resource has an absolute URI and is
/// reachable both through the tree (`roots` / `children`) and the flat index.
#[derive(Debug, Clone)]
pub struct ApiSpec {
    pub id: String,
    pub title: String,
    pub version: String,
    /// Base path every resource URI starts with.
    pub uri: String,
    pub base_uri: Option<String>,
    pub media_type: Option<String>,
    pub protocols: Vec<String>,
    pub all_uri_parameters: Arc<ParamSpecs>,
    /// All resources, parents before children.
    pub resources: Vec<Resource>,
    pub roots: Vec<ResourceId>,
    /// Absolute URI to resource.
    pub api: IndexMap<String, ResourceId>,
}

impl ApiSpec {
    pub fn get(&self, uri: &str) -> Option<&Resource> {
        self.api.get(uri).map(|id| &self.resources[*id])
    }

    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.get(id)
    }

    pub fn top_level(&self) -> impl Iterator<Item = &Resource> {
        self.roots.iter().map(|id| &self.resources[*id])
    }

    pub fn children<'a>(&'a self, resource: &'a Resource) -> impl Iterator<Item = &'a Resource> {
        resource.children.iter().map(|id| &self.resources[*id])
    }

    /// Resources keyed by absolute URI, in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.api
            .iter()
            .map(|(uri, id)| (uri.as_str(), &self.resources[*id]))
    }

    pub fn len(&self) -> usize {
        self.api.len()
    }

    pub fn is_empty(&self) -> bool {
        self.api.is_empty()
    }
}
