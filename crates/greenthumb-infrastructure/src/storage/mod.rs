//! Storage primitives.

pub mod json_kv_store;

pub use json_kv_store::JsonKeyValueStore;
