//! Task registry
//!
//! Built once at startup and handed to the engine behind an `Arc`; read-only
//! while a crawl runs.

use crate::model::Task;
use crate::RegistryError;
use std::collections::HashMap;
use std::sync::Arc;

/// Mapping from task name to task definition
#[derive(Debug, Default)]
pub struct TaskRegistry {
    /// Tasks in registration order
    tasks: Vec<Arc<Task>>,
    by_name: HashMap<String, Arc<Task>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a task under its name
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<Task>)` - The shared handle to the registered task
    /// * `Err(RegistryError::DuplicateTask)` - A task with that name exists
    pub fn register(&mut self, task: Task) -> Result<Arc<Task>, RegistryError> {
        if self.by_name.contains_key(&task.name) {
            return Err(RegistryError::DuplicateTask(task.name));
        }

        let task = Arc::new(task);
        self.by_name.insert(task.name.clone(), Arc::clone(&task));
        self.tasks.push(Arc::clone(&task));
        tracing::debug!("Registered task '{}'", task.name);
        Ok(task)
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<Task>, RegistryError> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownTask(name.to_string()))
    }

    pub fn tasks(&self) -> &[Arc<Task>] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
