pub mod flow;
pub mod watcher;

pub use flow::ApprovalFlow;
pub use watcher::{LogProgress, ProgressSink, StatusWatcher, WatchOptions, WatchOutcome};
