pub mod og_parser;

pub use og_parser::ImageExtractor;
