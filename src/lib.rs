pub mod host;
pub mod kernel;
pub mod outputs;
pub mod settings;
pub mod store;

pub use kernel::config::MonitorConfig;
pub use kernel::error::MonitorError;
pub use kernel::handle::MonitorHandle;
pub use kernel::reactor::{Collaborators, Reactor};
pub use kernel::state::MonitorState;
