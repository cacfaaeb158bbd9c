//! JSON output for the harvested broadcast list.

mod writer;

pub use writer::{generate_json, save_json, write_json};
