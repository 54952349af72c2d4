mod auth_service;
mod change_feed;
mod dashboard_service;
mod entity_service;
mod permission_service;
mod reading_service;
mod report_service;
mod resolver_service;
mod token_service;

pub use auth_service::*;
pub use change_feed::*;
pub use dashboard_service::*;
pub use entity_service::*;
pub use permission_service::*;
pub use reading_service::*;
pub use report_service::*;
pub use resolver_service::*;
pub use token_service::*;
