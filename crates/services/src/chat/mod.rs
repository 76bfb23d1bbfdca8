pub mod context;
pub mod errors;
pub mod multiplexer;
pub mod ports;
pub mod query;
pub mod service;
pub mod state;

pub use errors::{ErrorReport, PipelineError, PipelineErrorKind};
pub use ports::*;
pub use service::ChatServiceImpl;
pub use state::{PipelineRun, PipelineState};
