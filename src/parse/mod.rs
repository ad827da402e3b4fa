//! Parsers for the text Slurm commands print.

pub mod gres;
pub mod keyvalue;
pub mod state;
pub mod table;
pub mod time;

pub use gres::parse_gpu_count;
pub use keyvalue::parse_key_values;
pub use state::normalize_state;
pub use table::{parse_table, Row};
pub use time::{parse_datetime, parse_walltime};
