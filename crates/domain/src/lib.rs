pub mod events;
pub mod messaging;
pub mod repositories;

pub use events::*;
pub use messaging::*;
pub use repositories::*;
pub use triage_core::{TriageError, TriageResult};
