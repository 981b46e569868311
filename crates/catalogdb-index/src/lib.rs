pub mod index;
pub mod schema;
pub mod search;

pub use index::ItemIndex;
