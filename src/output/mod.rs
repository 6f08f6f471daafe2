mod format;
mod json;
mod table;

pub(crate) use format::NumberFormat;
pub(crate) use json::output_inventory_json;
pub(crate) use table::{SessionTableOptions, print_session_table, print_source_table};
