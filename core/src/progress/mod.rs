mod event;
mod parser;
mod record;

pub use event::ProgressEvent;
pub use parser::{is_rate_limit_text, ProgressEventParser, RATE_LIMIT_PHRASES};
pub use record::SpeedtestRecord;
