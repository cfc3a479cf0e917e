pub mod catalog;
pub mod engine;
pub mod export;
pub mod parser;
pub mod pipeline;
pub mod registry;
pub mod source;
pub mod validator;

pub use crate::domain::model::{
    ImportError, ImportReport, ImportResult, ImportSummary, MappingBatch, MappingEvent,
    MappingUpdate, NewMapping, RowRecord, SkuRecord,
};
pub use crate::domain::ports::{MappingObserver, Pipeline, Storage};
pub use crate::utils::error::Result;
