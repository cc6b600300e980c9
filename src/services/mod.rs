pub mod response_parser;
pub mod unit_caller;

pub use response_parser::{parse_binary, parse_continuous};
pub use unit_caller::{call_unit, RetryPolicy};
