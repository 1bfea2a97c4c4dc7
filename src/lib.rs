pub mod app;
pub mod shutdown;

pub use app::{run_missed_sweep_loop, Application};
pub use shutdown::ShutdownManager;
