pub mod batch;
pub mod error;
pub mod parse;
pub mod record;
pub mod schema;
pub mod validate;
pub mod wasm;
