mod custom_date_modal;
mod pin_area;
mod task_list;
mod task_list_row;
mod week_strip;

pub use custom_date_modal::CustomDateModal;
pub use pin_area::PinArea;
pub use task_list::TaskList;
pub use task_list_row::TaskListRow;
pub use week_strip::WeekStrip;
