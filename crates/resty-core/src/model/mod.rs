pub mod resource;
pub mod spec;

pub use resource::{Body, Method, Resource, Response};
pub use spec::{ApiSpec, ResourceId};
