pub mod post;
pub mod preview;

pub use post::{MediaType, Post};
pub use preview::PostPreview;
