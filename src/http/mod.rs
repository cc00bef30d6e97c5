//! HTTP protocol layer module
//!
//! Response builders shared by the dispatch entry point and the server,
//! decoupled from the handler set.

pub mod response;

pub use response::{
    build_400_response, build_404_response, build_405_response, build_413_response,
    build_422_response, build_500_response, build_json_bytes_response, build_json_response,
    build_options_response,
};
