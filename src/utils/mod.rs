pub mod employee_cache;
pub mod parse;
