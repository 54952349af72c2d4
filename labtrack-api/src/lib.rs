pub mod deeplink;
pub mod models;
pub mod status;
pub mod validation;

pub use deeplink::DeepLink;
pub use status::{Band, Status, ThresholdProfile};
pub use validation::FieldError;
