mod auth;
mod dashboard;
mod equipment;
mod event;
mod reading;
mod report;
mod room;
mod scan;

pub use auth::*;
pub use dashboard::*;
pub use equipment::*;
pub use event::*;
pub use reading::*;
pub use report::*;
pub use room::*;
pub use scan::*;
