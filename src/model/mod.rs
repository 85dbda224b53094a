//! Document model.
//!
//! The styled node tree produced by the ODT reader, the document container
//! that holds it, and the table model used by the grid-table renderer.

mod document;
mod node;
mod table;

pub use document::*;
pub use node::*;
pub use table::*;
