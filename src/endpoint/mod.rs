// Request descriptors, decoded resource kinds and the catalog endpoint factory.

pub mod catalog;
pub mod lenient;
pub mod model;
pub mod request;
pub mod resource;
