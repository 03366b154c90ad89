//! Task-progression planning.
//!
//! Given the full ordered task list of a case and the task just approved,
//! computes the status writes needed to keep the list consistent: the task
//! itself becomes COMPLETE, its immediate same-stage successor unlocks, and
//! when every task in the stage is COMPLETE the first task of the next
//! stage unlocks. The planner is pure — callers apply the writes, in plan
//! order, against the store.
//!
//! A stage counts as complete only when every task in it has status
//! COMPLETE (the task being approved counts). Approving a later task while
//! an earlier one in the same stage is unfinished therefore never cascades.

use std::fmt;

use shared_types::{CaseStage, Task, TaskStatus};
use uuid::Uuid;

/// The slice of task state the planner operates on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskRef {
    pub id: Uuid,
    pub stage: CaseStage,
    pub order_index: i32,
    pub status: TaskStatus,
}

impl TaskRef {
    /// Build from a stored row. Fails if the row carries a stage or status
    /// string outside the DB CHECK constraint.
    pub fn from_row(task: &Task) -> Result<Self, ProgressionError> {
        let stage = CaseStage::from_db_str(&task.stage)
            .ok_or(ProgressionError::InvalidRow(task.id))?;
        let status = TaskStatus::from_db_str(&task.status)
            .ok_or(ProgressionError::InvalidRow(task.id))?;
        Ok(Self {
            id: task.id,
            stage,
            order_index: task.order_index,
            status,
        })
    }
}

/// A single pending status write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusWrite {
    pub task_id: Uuid,
    pub status: TaskStatus,
}

/// The computed outcome of approving one task.
///
/// `writes` must be applied in order: the COMPLETE write always precedes
/// any unlock, because the stage-completion decision assumes it landed.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalPlan {
    pub task_id: Uuid,
    /// True when the task was already COMPLETE — `writes` is empty and the
    /// whole approval is a no-op.
    pub already_complete: bool,
    pub writes: Vec<StatusWrite>,
    /// Same-stage successor that moved LOCKED -> NOT_STARTED, if any.
    pub unlocked_task_id: Option<Uuid>,
    /// Next stage reached by completing this one, if any. Reported even
    /// when the stage's first task had already been unlocked manually.
    pub unlocked_stage: Option<CaseStage>,
    /// Case progress percentage once the writes are applied.
    pub progress: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressionError {
    TaskNotFound(Uuid),
    /// Row carries a stage/status outside the known set.
    InvalidRow(Uuid),
}

impl fmt::Display for ProgressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressionError::TaskNotFound(id) => write!(f, "Task {} not found", id),
            ProgressionError::InvalidRow(id) => {
                write!(f, "Task {} has an unrecognized stage or status", id)
            }
        }
    }
}

impl std::error::Error for ProgressionError {}

/// Plan the approval of `task_id`.
pub fn plan_approval(tasks: &[TaskRef], task_id: Uuid) -> Result<ApprovalPlan, ProgressionError> {
    let current = tasks
        .iter()
        .find(|t| t.id == task_id)
        .ok_or(ProgressionError::TaskNotFound(task_id))?;

    // Idempotent short-circuit: a second approval of a COMPLETE task must
    // not re-unlock or re-cascade from stale state.
    if current.status == TaskStatus::Complete {
        return Ok(ApprovalPlan {
            task_id,
            already_complete: true,
            writes: Vec::new(),
            unlocked_task_id: None,
            unlocked_stage: None,
            progress: progress_percent(tasks, &[]),
        });
    }

    let mut writes = vec![StatusWrite {
        task_id,
        status: TaskStatus::Complete,
    }];

    // Same-stage advance: the nearest task after this one, by global order.
    let mut unlocked_task_id = None;
    let next_in_stage = tasks
        .iter()
        .filter(|t| t.stage == current.stage && t.order_index > current.order_index)
        .min_by_key(|t| t.order_index);
    if let Some(next) = next_in_stage {
        if next.status == TaskStatus::Locked {
            writes.push(StatusWrite {
                task_id: next.id,
                status: TaskStatus::NotStarted,
            });
            unlocked_task_id = Some(next.id);
        }
    }

    // Stage-completion check: every task in the stage COMPLETE, counting
    // the one being approved.
    let stage_complete = tasks
        .iter()
        .filter(|t| t.stage == current.stage)
        .all(|t| t.id == task_id || t.status == TaskStatus::Complete);

    let mut unlocked_stage = None;
    if stage_complete {
        if let Some(next_stage) = current.stage.next() {
            unlocked_stage = Some(next_stage);
            let first_in_next = tasks
                .iter()
                .filter(|t| t.stage == next_stage)
                .min_by_key(|t| t.order_index);
            if let Some(first) = first_in_next {
                if first.status == TaskStatus::Locked {
                    writes.push(StatusWrite {
                        task_id: first.id,
                        status: TaskStatus::NotStarted,
                    });
                }
            }
        }
    }

    let progress = progress_percent(tasks, &writes);

    Ok(ApprovalPlan {
        task_id,
        already_complete: false,
        writes,
        unlocked_task_id,
        unlocked_stage,
        progress,
    })
}

/// Percentage of tasks COMPLETE once `writes` are applied.
pub fn progress_percent(tasks: &[TaskRef], writes: &[StatusWrite]) -> i32 {
    if tasks.is_empty() {
        return 0;
    }
    let complete = tasks
        .iter()
        .filter(|t| {
            let final_status = writes
                .iter()
                .rev()
                .find(|w| w.task_id == t.id)
                .map(|w| w.status)
                .unwrap_or(t.status);
            final_status == TaskStatus::Complete
        })
        .count();
    ((complete * 100) / tasks.len()) as i32
}
