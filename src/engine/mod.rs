pub mod annotator;
pub mod pipeline;
pub mod records;
pub mod resolver;
pub mod selector;
