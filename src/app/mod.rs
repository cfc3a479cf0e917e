pub mod import_job;

pub use import_job::{rows_to_mappings, FileImportJob};
