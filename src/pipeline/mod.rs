pub mod job;
pub mod worker;

pub use job::{Job, PipelineEvent, Stage, TerminalEvent};
pub use worker::{EnqueueError, Pipeline, PipelineHandle};
