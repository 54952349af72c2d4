mod auth_handle;
mod dashboard_handle;
mod docs_handle;
mod equipment_handle;
mod event_handle;
mod reading_handle;
mod report_handle;
mod room_handle;
mod scan_handle;
mod user_handle;

pub use auth_handle::*;
pub use dashboard_handle::*;
pub use docs_handle::*;
pub use equipment_handle::*;
pub use event_handle::*;
pub use reading_handle::*;
pub use report_handle::*;
pub use room_handle::*;
pub use scan_handle::*;
pub use user_handle::*;
