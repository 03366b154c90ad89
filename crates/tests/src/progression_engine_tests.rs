//! Unit tests for the task-progression planner.
//!
//! These run against the pure engine — no database required.

use server::progression::engine::{plan_approval, ProgressionError, StatusWrite, TaskRef};
use shared_types::{CaseStage, TaskStatus};
use uuid::Uuid;

/// Deterministic task id from a small number.
fn uid(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn task(n: u128, stage: CaseStage, order_index: i32, status: TaskStatus) -> TaskRef {
    TaskRef {
        id: uid(n),
        stage,
        order_index,
        status,
    }
}

/// Apply a plan's writes to a task list, as the store would.
fn apply(tasks: &mut [TaskRef], writes: &[StatusWrite]) {
    for w in writes {
        let t = tasks.iter_mut().find(|t| t.id == w.task_id).unwrap();
        t.status = w.status;
    }
}

/// The three-task list from the specification examples:
/// [A(STAGE_1, NOT_STARTED), B(STAGE_1, LOCKED), C(STAGE_2, LOCKED)].
fn abc() -> Vec<TaskRef> {
    vec![
        task(1, CaseStage::Stage1, 0, TaskStatus::NotStarted),
        task(2, CaseStage::Stage1, 1, TaskStatus::Locked),
        task(3, CaseStage::Stage2, 2, TaskStatus::Locked),
    ]
}

#[test]
fn approving_first_task_unlocks_successor_without_cascade() {
    let tasks = abc();
    let plan = plan_approval(&tasks, uid(1)).unwrap();

    assert!(!plan.already_complete);
    assert_eq!(
        plan.writes,
        vec![
            StatusWrite {
                task_id: uid(1),
                status: TaskStatus::Complete
            },
            StatusWrite {
                task_id: uid(2),
                status: TaskStatus::NotStarted
            },
        ]
    );
    assert_eq!(plan.unlocked_task_id, Some(uid(2)));
    assert_eq!(plan.unlocked_stage, None);
}

#[test]
fn approving_last_task_of_complete_stage_cascades() {
    let mut tasks = abc();
    let writes = plan_approval(&tasks, uid(1)).unwrap().writes;
    apply(&mut tasks, &writes);

    let plan = plan_approval(&tasks, uid(2)).unwrap();

    assert_eq!(
        plan.writes,
        vec![
            StatusWrite {
                task_id: uid(2),
                status: TaskStatus::Complete
            },
            StatusWrite {
                task_id: uid(3),
                status: TaskStatus::NotStarted
            },
        ]
    );
    // No same-stage successor exists for B
    assert_eq!(plan.unlocked_task_id, None);
    assert_eq!(plan.unlocked_stage, Some(CaseStage::Stage2));
}

#[test]
fn reapproving_a_complete_task_is_a_no_op() {
    let mut tasks = abc();
    let writes1 = plan_approval(&tasks, uid(1)).unwrap().writes;
    apply(&mut tasks, &writes1);
    let writes2 = plan_approval(&tasks, uid(2)).unwrap().writes;
    apply(&mut tasks, &writes2);
    let snapshot = tasks.clone();

    let plan = plan_approval(&tasks, uid(2)).unwrap();

    assert!(plan.already_complete);
    assert!(plan.writes.is_empty());
    assert_eq!(plan.unlocked_task_id, None);
    assert_eq!(plan.unlocked_stage, None);

    apply(&mut tasks, &plan.writes);
    assert_eq!(tasks, snapshot);
}

#[test]
fn idempotence_two_calls_end_in_same_state_as_one() {
    let mut once = abc();
    let once_w = plan_approval(&once, uid(1)).unwrap().writes;
    apply(&mut once, &once_w);

    let mut twice = abc();
    let twice_w1 = plan_approval(&twice, uid(1)).unwrap().writes;
    apply(&mut twice, &twice_w1);
    let twice_w2 = plan_approval(&twice, uid(1)).unwrap().writes;
    apply(&mut twice, &twice_w2);

    assert_eq!(once, twice);
}

#[test]
fn out_of_order_approval_never_cascades() {
    // A is still unfinished; B (last of stage 1) gets approved directly,
    // e.g. after a manual unlock. The strict completion check must see A
    // and refuse to open stage 2.
    let tasks = vec![
        task(1, CaseStage::Stage1, 0, TaskStatus::NotStarted),
        task(2, CaseStage::Stage1, 1, TaskStatus::NotStarted),
        task(3, CaseStage::Stage2, 2, TaskStatus::Locked),
    ];

    let plan = plan_approval(&tasks, uid(2)).unwrap();

    assert_eq!(
        plan.writes,
        vec![StatusWrite {
            task_id: uid(2),
            status: TaskStatus::Complete
        }]
    );
    assert_eq!(plan.unlocked_stage, None);
}

#[test]
fn mid_stage_approval_touches_no_other_stage() {
    let tasks = vec![
        task(1, CaseStage::Stage1, 0, TaskStatus::PendingReview),
        task(2, CaseStage::Stage1, 1, TaskStatus::Locked),
        task(3, CaseStage::Stage1, 2, TaskStatus::Locked),
        task(4, CaseStage::Stage2, 3, TaskStatus::Locked),
        task(5, CaseStage::Stage3, 4, TaskStatus::Locked),
    ];

    let plan = plan_approval(&tasks, uid(1)).unwrap();

    let touched: Vec<Uuid> = plan.writes.iter().map(|w| w.task_id).collect();
    assert!(!touched.contains(&uid(4)));
    assert!(!touched.contains(&uid(5)));
    assert_eq!(plan.unlocked_task_id, Some(uid(2)));
    assert_eq!(plan.unlocked_stage, None);
}

#[test]
fn terminal_stage_completion_does_not_error() {
    let tasks = vec![
        task(1, CaseStage::Stage1, 0, TaskStatus::Complete),
        task(2, CaseStage::Stage2, 1, TaskStatus::Complete),
        task(3, CaseStage::Stage3, 2, TaskStatus::PendingReview),
    ];

    let plan = plan_approval(&tasks, uid(3)).unwrap();

    assert_eq!(
        plan.writes,
        vec![StatusWrite {
            task_id: uid(3),
            status: TaskStatus::Complete
        }]
    );
    assert_eq!(plan.unlocked_stage, None);
    assert_eq!(plan.progress, 100);
}

#[test]
fn complete_write_always_precedes_unlocks() {
    let mut tasks = abc();
    let plan = plan_approval(&tasks, uid(1)).unwrap();
    assert_eq!(plan.writes[0].task_id, uid(1));
    assert_eq!(plan.writes[0].status, TaskStatus::Complete);

    apply(&mut tasks, &plan.writes);
    let plan = plan_approval(&tasks, uid(2)).unwrap();
    assert_eq!(plan.writes[0].task_id, uid(2));
    assert_eq!(plan.writes[0].status, TaskStatus::Complete);
}

#[test]
fn successor_already_unlocked_is_left_alone() {
    // B was manually unlocked before A completed — approving A must not
    // rewrite B's status.
    let tasks = vec![
        task(1, CaseStage::Stage1, 0, TaskStatus::PendingReview),
        task(2, CaseStage::Stage1, 1, TaskStatus::Submitted),
    ];

    let plan = plan_approval(&tasks, uid(1)).unwrap();

    assert_eq!(
        plan.writes,
        vec![StatusWrite {
            task_id: uid(1),
            status: TaskStatus::Complete
        }]
    );
    assert_eq!(plan.unlocked_task_id, None);
}

#[test]
fn cascade_reports_stage_even_when_first_task_was_preunlocked() {
    // Stage 1 finishes while stage 2's first task was already opened by an
    // admin override. The transition is still reported; no extra write.
    let tasks = vec![
        task(1, CaseStage::Stage1, 0, TaskStatus::PendingReview),
        task(2, CaseStage::Stage2, 1, TaskStatus::NotStarted),
    ];

    let plan = plan_approval(&tasks, uid(1)).unwrap();

    assert_eq!(plan.writes.len(), 1);
    assert_eq!(plan.unlocked_stage, Some(CaseStage::Stage2));
}

#[test]
fn same_stage_successor_chosen_by_global_order() {
    // Successor is the nearest later order_index in the same stage, even
    // with another stage's task interleaved.
    let tasks = vec![
        task(1, CaseStage::Stage1, 0, TaskStatus::Submitted),
        task(2, CaseStage::Stage2, 1, TaskStatus::Locked),
        task(3, CaseStage::Stage1, 2, TaskStatus::Locked),
        task(4, CaseStage::Stage1, 5, TaskStatus::Locked),
    ];

    let plan = plan_approval(&tasks, uid(1)).unwrap();

    assert_eq!(plan.unlocked_task_id, Some(uid(3)));
    let touched: Vec<Uuid> = plan.writes.iter().map(|w| w.task_id).collect();
    assert!(!touched.contains(&uid(2)));
    assert!(!touched.contains(&uid(4)));
}

#[test]
fn progress_counts_planned_completion() {
    let tasks: Vec<TaskRef> = (0..10)
        .map(|i| {
            task(
                i as u128 + 1,
                CaseStage::Stage1,
                i,
                if i == 0 {
                    TaskStatus::NotStarted
                } else {
                    TaskStatus::Locked
                },
            )
        })
        .collect();

    let plan = plan_approval(&tasks, uid(1)).unwrap();
    assert_eq!(plan.progress, 10);
}

#[test]
fn full_walkthrough_reaches_one_hundred_percent() {
    let mut tasks = vec![
        task(1, CaseStage::Stage1, 0, TaskStatus::NotStarted),
        task(2, CaseStage::Stage1, 1, TaskStatus::Locked),
        task(3, CaseStage::Stage2, 2, TaskStatus::Locked),
        task(4, CaseStage::Stage2, 3, TaskStatus::Locked),
        task(5, CaseStage::Stage3, 4, TaskStatus::Locked),
    ];

    let order = [1u128, 2, 3, 4, 5];
    let mut last_progress = 0;
    for (i, id) in order.iter().enumerate() {
        let plan = plan_approval(&tasks, uid(*id)).unwrap();
        assert!(!plan.already_complete, "task {} unexpectedly complete", id);
        assert!(plan.progress > last_progress);
        last_progress = plan.progress;
        apply(&mut tasks, &plan.writes);

        // Stage transitions fire exactly at the stage boundaries
        let expect_stage = match i {
            1 => Some(CaseStage::Stage2),
            3 => Some(CaseStage::Stage3),
            _ => None,
        };
        assert_eq!(plan.unlocked_stage, expect_stage, "at approval #{i}");
    }

    assert_eq!(last_progress, 100);
    assert!(tasks.iter().all(|t| t.status == TaskStatus::Complete));
}

#[test]
fn unknown_task_id_is_an_error() {
    let tasks = abc();
    let err = plan_approval(&tasks, uid(99)).unwrap_err();
    assert_eq!(err, ProgressionError::TaskNotFound(uid(99)));
}

#[test]
fn empty_task_list_reports_not_found() {
    let err = plan_approval(&[], uid(1)).unwrap_err();
    assert_eq!(err, ProgressionError::TaskNotFound(uid(1)));
}
