/// Rows per printed window of the review list.
pub const DEFAULT_ROWS: u32 = 40;
/// Text columns for each side of a changed paragraph.
pub const WRAP_COLUMNS: usize = 76;
pub const INDENT: &str = "    ";
pub const BEFORE_PREFIX: &str = "  - ";
pub const AFTER_PREFIX: &str = "  + ";
pub const RULE: &str = "------------------------------------------------------------------------";
/// Poll interval for engine events while a task is in flight.
pub const EVENT_WAIT_MS: u64 = 100;
