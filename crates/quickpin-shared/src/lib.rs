//! Domain model for the quickpin to-do list, shared by the terminal and
//! browser front ends. Nothing in here touches the filesystem or the DOM.

pub mod board;
pub mod calendar;
pub mod clock;
pub mod flash;
pub mod history;
pub mod overflow;
pub mod pins;
pub mod session;
pub mod shortcut;
pub mod store;
pub mod task;
pub mod view;

pub use board::{
    Board, BoardError, EditMode, InputState, PendingDelete, PrimaryOutcome, SecondaryOutcome,
};
pub use calendar::{CustomDate, WeekDay};
pub use clock::{Clock, FixedClock, SystemClock};
pub use history::{DEFAULT_HISTORY_LIMIT, History, Snapshot};
pub use overflow::PinOverflow;
pub use pins::PinSet;
pub use session::Session;
pub use shortcut::Shortcut;
pub use store::{KeyValueStore, MemoryStore, Persistence, StoreError};
pub use task::{Task, TaskId};
pub use view::{BoardView, TaskRow, Urgency};
