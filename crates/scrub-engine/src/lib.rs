pub mod pipeline;
pub mod poller;

pub use pipeline::Pipeline;
pub use poller::{PollDecision, RunPoller, Sleeper, TokioSleeper, next_step};
