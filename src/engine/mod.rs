pub mod category;
pub mod progress;
pub mod scoring;
pub mod timer;

pub use category::{AnswerStyle, Category, Mode, ProgressKey};
pub use progress::ProgressStore;
