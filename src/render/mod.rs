pub mod invoker;
pub mod job;

pub use invoker::{RenderOutcome, Renderer};
pub use job::{ConversionJob, JobFile};
