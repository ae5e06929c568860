mod events;
mod merge;
mod reconciler;
mod request;
mod types;

pub(crate) use merge::*;

pub use events::*;
pub use reconciler::*;
pub use request::*;
pub use types::*;
