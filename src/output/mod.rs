mod format;
mod json;
mod statusline;
mod table;

pub(crate) use format::NumberFormat;
pub(crate) use json::{models_json, sessions_json, snapshot_json};
pub(crate) use statusline::{statusline, statusline_json};
pub(crate) use table::{TableOptions, print_models, print_sessions, print_summary};
