mod ids;
mod progress;
mod session;

pub use ids::SessionId;
pub use progress::{Progress, ProgressError, ProgressPatch};
pub use session::{Session, SessionMode, SessionPhase, SessionRecordError};
