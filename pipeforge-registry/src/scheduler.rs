//! Fixpoint scheduler for registration tasks.
//!
//! Tasks are kept in submission order. A run repeats passes over a snapshot
//! of the queued task ids until a pass registers nothing:
//!
//! 1. clear the state-changed signal
//! 2. snapshot the queued ids
//! 3. for every id still queued whose predicate holds: dequeue it, call
//!    `register`, raise the signal
//!
//! Registries notify the queue through the same [`StateSignal`], so
//! registrations happening inside a task are folded into the running loop.
//! Tasks receive the context, never the queue, so a nested run cannot start.

use crate::error::RegistryResult;
use crate::notifier::StateSignal;
use crate::report::{Severity, ValidityReport};
use crate::task::{DependencyResolver, RegistrationTask};
use pipeforge_types::Dependency;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Identifies a queued task. Ids increase with submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only view of a queued task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub description: String,
    pub dependencies: Vec<Dependency>,
}

/// A queued task together with what it is still waiting for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTask {
    pub id: TaskId,
    pub description: String,
    pub missing: Vec<Dependency>,
}

impl PendingTask {
    /// `missing dependency: data type 'a:b', node type 'c:d'`
    pub fn missing_description(&self) -> String {
        let missing: Vec<String> = self.missing.iter().map(ToString::to_string).collect();
        format!("missing dependency: {}", missing.join(", "))
    }
}

/// A task whose `register` returned an error. It is no longer queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedTask {
    pub id: TaskId,
    pub description: String,
    pub message: String,
}

pub struct TaskQueue<C: DependencyResolver + ?Sized> {
    tasks: BTreeMap<TaskId, Box<dyn RegistrationTask<C>>>,
    failed: Vec<FailedTask>,
    next_id: u64,
    signal: StateSignal,
    fired_total: usize,
}

impl<C: DependencyResolver + ?Sized> Default for TaskQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: DependencyResolver + ?Sized> TaskQueue<C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            failed: Vec::new(),
            next_id: 0,
            signal: StateSignal::new(),
            fired_total: 0,
        }
    }

    /// The signal registries should raise when they add an entity.
    #[must_use]
    pub fn signal(&self) -> StateSignal {
        self.signal.clone()
    }

    /// Queues a task without running the loop.
    pub fn enqueue<T>(&mut self, task: T) -> TaskId
    where
        T: RegistrationTask<C> + 'static,
    {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        debug!(task_id = %id, task = %task.describe(), "Registration task queued");
        self.tasks.insert(id, Box::new(task));
        id
    }

    /// Queues a task and runs a scheduling pass.
    pub fn schedule<T>(&mut self, task: T, ctx: &mut C) -> RegistryResult<TaskId>
    where
        T: RegistrationTask<C> + 'static,
    {
        let id = self.enqueue(task);
        self.run(ctx)?;
        Ok(id)
    }

    /// Runs the fixpoint loop and returns how many tasks fired.
    ///
    /// Returns immediately when nothing is queued. A failing task has
    /// already been dequeued and recorded in [`failed_tasks`](Self::failed_tasks)
    /// when its error is returned; the other tasks stay queued and a later
    /// run continues with them.
    pub fn run(&mut self, ctx: &mut C) -> RegistryResult<usize> {
        if self.tasks.is_empty() {
            return Ok(0);
        }

        self.signal.raise();
        let mut fired = 0;
        let mut passes = 0;
        while self.signal.take() {
            passes += 1;
            let snapshot: Vec<TaskId> = self.tasks.keys().copied().collect();
            for id in snapshot {
                let eligible = match self.tasks.get(&id) {
                    Some(task) => task.can_register(ctx),
                    None => continue,
                };
                if !eligible {
                    continue;
                }
                let Some(mut task) = self.tasks.remove(&id) else {
                    continue;
                };

                debug!(task_id = %id, task = %task.describe(), "Dependencies satisfied; registering");
                if let Err(e) = task.register(ctx) {
                    let description = task.describe();
                    warn!(task_id = %id, task = %description, "Registration task failed: {}", e);
                    self.failed.push(FailedTask {
                        id,
                        description,
                        message: e.to_string(),
                    });
                    return Err(e);
                }
                fired += 1;
                self.fired_total += 1;
                self.signal.raise();
            }
        }

        if fired > 0 {
            info!(fired, passes, remaining = self.tasks.len(), "Registration tasks processed");
        }
        Ok(fired)
    }

    /// Snapshot of every queued task in submission order.
    #[must_use]
    pub fn scheduled_tasks(&self) -> Vec<TaskSnapshot> {
        self.tasks
            .iter()
            .map(|(id, task)| TaskSnapshot {
                id: *id,
                description: task.describe(),
                dependencies: task.dependencies(),
            })
            .collect()
    }

    /// Queued tasks with the dependencies they are still missing.
    #[must_use]
    pub fn pending(&self, ctx: &C) -> Vec<PendingTask> {
        self.tasks
            .iter()
            .map(|(id, task)| PendingTask {
                id: *id,
                description: task.describe(),
                missing: task.missing_dependencies(ctx),
            })
            .collect()
    }

    /// Tasks whose registration failed, in the order they failed.
    #[must_use]
    pub fn failed_tasks(&self) -> &[FailedTask] {
        &self.failed
    }

    /// Adds one error per failed task and one warning per queued task under
    /// `Registration tasks`.
    pub fn report_validity(&self, ctx: &C, report: &mut ValidityReport) {
        let mut section = report.resolve("Registration tasks");
        for failed in &self.failed {
            section.resolve(failed.description.clone()).report(
                Severity::Error,
                "registration failed",
                vec![failed.message.clone()],
            );
        }
        for pending in self.pending(ctx) {
            let mut entry = section.resolve(pending.description.clone());
            if pending.missing.is_empty() {
                entry.warning("task is eligible but has not been run");
            } else {
                entry.warning(pending.missing_description());
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Total number of tasks fired over the queue's lifetime.
    #[must_use]
    pub fn fired_total(&self) -> usize {
        self.fired_total
    }
}

impl<C: DependencyResolver + ?Sized> fmt::Debug for TaskQueue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("queued", &self.tasks.len())
            .field("failed", &self.failed.len())
            .field("fired_total", &self.fired_total)
            .finish()
    }
}
