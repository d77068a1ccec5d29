mod cache;

pub use cache::{intern_text, text_count};
