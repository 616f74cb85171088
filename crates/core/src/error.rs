use thiserror::Error;

use crate::model::{ProgressError, SessionRecordError};
use crate::time::CalendarDayError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    SessionRecord(#[from] SessionRecordError),
    #[error(transparent)]
    CalendarDay(#[from] CalendarDayError),
}
