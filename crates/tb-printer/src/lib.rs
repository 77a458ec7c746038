//! Function printer (§4.I): DOT graph output, plus a supplemented JSON dump.

mod dot;
mod format;
mod json;

pub use dot::print_function_dot;
pub use format::{format_dt, format_integer_const};
pub use json::{function_to_json, print_function_json, JsonFunction, JsonNode};
