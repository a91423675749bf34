//! Review core: pure reconciliation, selection and assembly logic plus the
//! review-view state machine. Nothing in here performs IO.
mod assemble;
mod effect;
mod error;
mod msg;
mod paragraph;
mod progress;
mod reconcile;
mod selection;
mod state;
mod target;
mod update;
mod url_wrap;
mod view_model;
mod virtual_list;

pub use assemble::{assemble, PARAGRAPH_SEPARATOR};
pub use effect::Effect;
pub use error::ErrorKind;
pub use msg::Msg;
pub use paragraph::{changes_count, EditOutcome, Paragraph, ParagraphStatus};
pub use progress::{Phase, ParagraphProgress, Progress, ProgressSummary};
pub use reconcile::{reconcile, RenderItem};
pub use selection::{Choice, SelectionStore};
pub use state::{ReviewPhase, ReviewState, SubmissionId};
pub use target::{EditMode, EditTarget, ValidationError, MAX_TITLE_LEN};
pub use update::update;
pub use url_wrap::{
    find_urls, insert_break_opportunities, process_wrappable_urls, strip_wrap_markers,
    WRAP_CHARS, WRAP_MARKER,
};
pub use view_model::{PhaseView, ReviewViewModel};
pub use virtual_list::{
    ExportFooter, ItemKey, ListItem, RowMetrics, RowRenderer, SummaryHeader, Viewport,
    VirtualList, DEFAULT_OVERSCAN,
};
