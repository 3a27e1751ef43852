pub(crate) mod health;
pub(crate) mod info;
pub(crate) mod languages;
pub mod ocr;

pub use health::health_check;
pub use info::service_info;
pub use languages::list_languages;
