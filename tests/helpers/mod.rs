#![allow(dead_code, unused_imports)]
pub mod template_helpers;
pub mod test_db;

pub use template_helpers::*;
pub use test_db::*;
