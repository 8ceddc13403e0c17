use crate::model::fields::Status;
use crate::model::task::Task;

use super::error::StoreError;
use super::listeners::ListenerId;
use super::task_store::TaskStore;

/// Read side of the store, as seen by the board and detail views.
///
/// Every returned task is a copy.
pub trait TaskSource: Send + Sync {
    fn list(&self) -> Vec<Task>;

    fn get(&self, id: &str) -> Result<Task, StoreError>;

    fn group_by_status(&self) -> Vec<(Status, Vec<Task>)>;

    fn add_listener(&self, callback: Box<dyn Fn() + Send + Sync>) -> ListenerId;

    fn remove_listener(&self, id: ListenerId);
}

impl TaskSource for TaskStore {
    fn list(&self) -> Vec<Task> {
        TaskStore::list(self)
    }

    fn get(&self, id: &str) -> Result<Task, StoreError> {
        TaskStore::get(self, id)
    }

    fn group_by_status(&self) -> Vec<(Status, Vec<Task>)> {
        TaskStore::group_by_status(self)
    }

    fn add_listener(&self, callback: Box<dyn Fn() + Send + Sync>) -> ListenerId {
        TaskStore::add_listener(self, callback)
    }

    fn remove_listener(&self, id: ListenerId) {
        TaskStore::remove_listener(self, id);
    }
}
