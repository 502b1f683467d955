//! Parsers for upstream record exports

pub mod records;

pub use records::RecordDecoder;
