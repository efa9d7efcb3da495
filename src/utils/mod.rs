pub mod cancel;
pub mod logging;

pub use cancel::CancelSignal;
pub use logging::truncate_text;
