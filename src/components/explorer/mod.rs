mod animator;
mod camera;
mod component;
mod layout;
mod persistence;
mod ready;
mod render;
mod scene;
mod selection;
mod session;
mod subgraph;
mod types;

pub use component::ExplorerView;
pub use types::{Catalog, CatalogError};
