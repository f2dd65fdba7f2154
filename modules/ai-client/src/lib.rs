pub mod gemini;
pub mod util;

pub use gemini::Gemini;
