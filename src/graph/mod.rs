//! Graph store: representation and construction

pub mod builder;
pub mod store;

pub use builder::GraphBuilder;
pub use store::Graph;
