pub mod cli;
pub mod context;
pub mod dictionary;
pub mod error;
pub mod impact;
pub mod io;
pub mod logging;
pub mod parser;
pub mod similarity;
pub mod transform;
pub mod validate;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
