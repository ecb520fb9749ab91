pub mod discovery;
pub mod source;

pub use discovery::discover_inputs;
pub use source::{SourceDocument, load_source, parse_source};
