// Mapping expression parser module

pub mod lexer;
pub mod mapping;

// Public API re-exports
pub use mapping::parse_mapping;
