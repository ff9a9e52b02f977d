mod health;
mod pages;
mod static_files;
mod submit;

pub use health::health;
pub use pages::{index, subscribe};
pub use static_files::serve_upload;
pub use submit::submit_subscription;
