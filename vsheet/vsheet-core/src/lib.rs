pub mod error;
pub mod recent;
pub mod sheet;
pub mod storage;
pub mod timestamp;
pub mod workspace;

pub use error::{StoreError, StoreResult};
pub use recent::{RecentPointer, RecentPointerStore};
pub use sheet::{DocumentStore, Spreadsheet, SpreadsheetSummary, SpreadsheetUpdate};
pub use workspace::Workspace;
