pub mod engine;

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shared_types::{AppError, StageTransitionSummary, Task};

use self::engine::{plan_approval, ProgressionError, TaskRef};

fn task_refs(tasks: &[Task]) -> Result<Vec<TaskRef>, AppError> {
    tasks
        .iter()
        .map(|t| TaskRef::from_row(t).map_err(|e| AppError::internal(e.to_string())))
        .collect()
}

/// Approve a task and run the unlock cascade.
///
/// Status writes are issued strictly in plan order (complete, same-stage
/// unlock, stage-cascade unlock). The first store failure aborts the
/// remaining writes and is returned to the caller; earlier writes are not
/// rolled back. Re-running the whole approval afterwards is safe because
/// planning an already-COMPLETE task is a no-op.
pub async fn approve_task(
    pool: &Pool<Postgres>,
    case_id: Uuid,
    task_id: Uuid,
) -> Result<StageTransitionSummary, AppError> {
    let case = crate::repo::case::find_by_id(pool, case_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Case {} not found", case_id)))?;

    let task = crate::repo::task::find_by_id(pool, task_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Task {} not found", task_id)))?;

    // The store's row-level scoping is the real barrier; this rejects a
    // mismatched caller-supplied case/task pairing outright.
    if task.case_id != case_id {
        return Err(AppError::conflict(format!(
            "Task {} does not belong to case {}",
            task_id, case_id
        )));
    }

    let tasks = crate::repo::task::list_by_case(pool, case_id).await?;
    let refs = task_refs(&tasks)?;

    let plan = plan_approval(&refs, task_id).map_err(|e| match e {
        ProgressionError::TaskNotFound(id) => AppError::not_found(format!("Task {} not found", id)),
        ProgressionError::InvalidRow(_) => AppError::internal(e.to_string()),
    })?;

    for write in &plan.writes {
        crate::repo::task::update_status(pool, write.task_id, write.status.as_db_str())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Task {} not found", write.task_id)))?;
    }

    if !plan.already_complete {
        if let Some(stage) = plan.unlocked_stage {
            crate::repo::case::advance_stage(pool, case_id, stage.as_db_str()).await?;
        }
        crate::repo::case::update_progress(pool, case_id, plan.progress).await?;
    }

    let message = match (plan.already_complete, plan.unlocked_stage) {
        (true, _) => "Task already complete".to_string(),
        (false, Some(stage)) => format!("Stage complete! Unlocked {}", stage.label()),
        (false, None) => "Task approved".to_string(),
    };

    // Tell the client their case moved forward. Best-effort — the cascade
    // has already been applied.
    if let Some(stage) = plan.unlocked_stage {
        if let Some(client_id) = case.client_id {
            if let Err(e) = crate::repo::notification::create(
                pool,
                client_id,
                "Stage complete!",
                &format!("Your case has moved to {}", stage.label()),
                Some("/tasks"),
            )
            .await
            {
                tracing::warn!(%case_id, %e, "Failed to create stage-unlock notification");
            }
        }
    }

    Ok(StageTransitionSummary {
        task_id: task_id.to_string(),
        already_complete: plan.already_complete,
        unlocked_task_id: plan.unlocked_task_id.map(|u| u.to_string()),
        unlocked_stage: plan.unlocked_stage.map(|s| s.as_db_str().to_string()),
        progress: plan.progress,
        message,
    })
}
