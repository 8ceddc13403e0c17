pub mod error;
pub mod listeners;
pub mod task_store;
pub mod view;

pub use error::{LoadFailure, PartialLoadError, StoreError};
pub use listeners::{ListenerId, ListenerRegistry};
pub use task_store::TaskStore;
pub use view::TaskSource;
