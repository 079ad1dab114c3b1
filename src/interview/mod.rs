//! Interactive interview: question generation, evaluation, analysis, and
//! the terminal session that ties them together.

mod fallback;
mod service;
mod session;

pub use fallback::*;
pub use service::*;
pub use session::*;
