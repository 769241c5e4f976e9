pub use crate::print_output;
pub use crate::util::output::{or_dash, sort_label, table};
