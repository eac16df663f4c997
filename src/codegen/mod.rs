//! # Pandas Code Generation
//!
//! pandas script assembly for pipeline graphs.

mod pandas_codegen;

pub use pandas_codegen::*;
