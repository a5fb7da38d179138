//! Host-defined value types shared by the host and the loader.

pub mod runtime;

pub use runtime::RuntimeOptions;
