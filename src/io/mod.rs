pub mod csv_import;
pub mod file;

pub use csv_import::{import_csv, parse_csv};
pub use file::{load_schedule, parse_json};
