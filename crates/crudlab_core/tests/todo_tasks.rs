mod common;

use chrono::NaiveDate;
use crudlab_core::model::task::{NewTask, TaskPatch, TaskPriority, TaskStatus};
use crudlab_core::repo::task_repo::{
    SqliteTaskCategoryRepository, SqliteTaskRepository, TaskCategoryRepository, TaskRepository,
};
use crudlab_core::RepoError;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn create_applies_defaults_and_round_trips() {
    let (_dir, db) = common::open_temp_db();
    let repo = SqliteTaskRepository::new(&db);

    let id = repo
        .create(&NewTask::new("Write report").description("Quarterly numbers"))
        .unwrap();
    let task = repo.get_by_id(id).unwrap().unwrap();

    assert_eq!(task.title, "Write report");
    assert_eq!(task.description.as_deref(), Some("Quarterly numbers"));
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.priority, TaskPriority::Medium);
    assert_eq!(task.due_date, None);
    assert_eq!(task.category_id, None);
}

#[test]
fn empty_title_is_rejected_without_inserting() {
    let (_dir, db) = common::open_temp_db();
    let repo = SqliteTaskRepository::new(&db);

    for title in ["", "   "] {
        match repo.create(&NewTask::new(title)).unwrap_err() {
            RepoError::Validation(err) => assert_eq!(err.field, "Title"),
            other => panic!("unexpected error: {other}"),
        }
    }
    let too_long = "x".repeat(201);
    assert!(matches!(
        repo.create(&NewTask::new(too_long)),
        Err(RepoError::Validation(_))
    ));

    assert!(repo.get_all(None).unwrap().is_empty());
    assert!(db.query("SELECT id FROM tasks;", []).unwrap().is_empty());
}

#[test]
fn status_and_priority_parse_from_closed_sets() {
    assert_eq!(
        "in_progress".parse::<TaskStatus>().unwrap(),
        TaskStatus::InProgress
    );
    assert_eq!("high".parse::<TaskPriority>().unwrap(), TaskPriority::High);

    let err = "done".parse::<TaskStatus>().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Status must be one of: pending, in_progress, completed. Got: 'done'"
    );
    assert!("urgent".parse::<TaskPriority>().is_err());
}

#[test]
fn store_rejects_unknown_status_values() {
    let (_dir, db) = common::open_temp_db();

    let err = db
        .insert(
            "INSERT INTO tasks (title, status) VALUES ('Sneaky', 'done');",
            [],
        )
        .unwrap_err();
    assert_eq!(err.constraint(), Some(crudlab_core::ConstraintKind::Check));
}

#[test]
fn list_filters_by_status_newest_first() {
    let (_dir, db) = common::open_temp_db();
    let repo = SqliteTaskRepository::new(&db);

    let first = repo.create(&NewTask::new("First")).unwrap();
    let second = repo
        .create(&NewTask::new("Second").status(TaskStatus::InProgress))
        .unwrap();
    let third = repo.create(&NewTask::new("Third")).unwrap();

    let all = repo.get_all(None).unwrap();
    assert_eq!(
        all.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![third, second, first]
    );

    let pending = repo.get_all(Some(TaskStatus::Pending)).unwrap();
    assert_eq!(
        pending.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![third, first]
    );
    assert!(repo
        .get_all(Some(TaskStatus::Completed))
        .unwrap()
        .is_empty());
}

#[test]
fn update_status_and_partial_update() {
    let (_dir, db) = common::open_temp_db();
    let repo = SqliteTaskRepository::new(&db);
    let id = repo
        .create(&NewTask::new("Plan trip").priority(TaskPriority::Low))
        .unwrap();

    assert!(repo.update_status(id, TaskStatus::Completed).unwrap());
    assert!(!repo.update_status(id + 1, TaskStatus::Completed).unwrap());

    let patch = TaskPatch {
        priority: Some(TaskPriority::High),
        due_date: Some(date(2026, 6, 1)),
        ..TaskPatch::default()
    };
    assert!(repo.update(id, &patch).unwrap());
    assert!(!repo.update(id + 1, &patch).unwrap());

    let task = repo.get_by_id(id).unwrap().unwrap();
    assert_eq!(task.title, "Plan trip");
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.priority, TaskPriority::High);
    assert_eq!(task.due_date, Some(date(2026, 6, 1)));

    let blank_title = TaskPatch {
        title: Some(" ".to_string()),
        ..TaskPatch::default()
    };
    assert!(matches!(
        repo.update(id, &blank_title),
        Err(RepoError::Validation(_))
    ));
    assert!(matches!(
        repo.update(id, &TaskPatch::default()),
        Err(RepoError::Validation(_))
    ));
}

#[test]
fn priority_and_overdue_views() {
    let (_dir, db) = common::open_temp_db();
    let repo = SqliteTaskRepository::new(&db);

    let late = repo
        .create(
            &NewTask::new("Late")
                .priority(TaskPriority::High)
                .due(date(2026, 1, 10)),
        )
        .unwrap();
    repo.create(
        &NewTask::new("Done late")
            .status(TaskStatus::Completed)
            .due(date(2026, 1, 5)),
    )
    .unwrap();
    repo.create(&NewTask::new("Future").due(date(2026, 12, 31)))
        .unwrap();
    repo.create(&NewTask::new("Undated")).unwrap();

    let overdue = repo.get_overdue(date(2026, 2, 1)).unwrap();
    assert_eq!(overdue.iter().map(|t| t.id).collect::<Vec<_>>(), vec![late]);

    let high = repo.get_by_priority(TaskPriority::High).unwrap();
    assert_eq!(high.len(), 1);
    assert_eq!(high[0].id, late);
    assert_eq!(repo.get_by_priority(TaskPriority::Medium).unwrap().len(), 3);
}

#[test]
fn delete_task() {
    let (_dir, db) = common::open_temp_db();
    let repo = SqliteTaskRepository::new(&db);
    let id = repo.create(&NewTask::new("Temporary")).unwrap();

    assert!(repo.delete(id).unwrap());
    assert!(!repo.delete(id).unwrap());
    assert_eq!(repo.get_by_id(id).unwrap(), None);
}

#[test]
fn categories_group_tasks_and_survive_deletion_as_null() {
    let (_dir, db) = common::open_temp_db();
    let categories = SqliteTaskCategoryRepository::new(&db);
    let tasks = SqliteTaskRepository::new(&db);

    let work = categories.create("Work").unwrap();
    let home = categories.create("Home").unwrap();
    assert!(matches!(
        categories.create("Work"),
        Err(RepoError::Duplicate(_))
    ));
    assert!(matches!(categories.create(""), Err(RepoError::Validation(_))));

    let names: Vec<_> = categories
        .get_all()
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Home", "Work"]);

    let task = tasks.create(&NewTask::new("Ship it").category(work)).unwrap();
    tasks.create(&NewTask::new("Laundry").category(home)).unwrap();
    assert_eq!(categories.get_tasks(work).unwrap().len(), 1);

    let err = tasks
        .create(&NewTask::new("Orphan").category(work + 100))
        .unwrap_err();
    assert!(matches!(err, RepoError::Referential(_)));

    assert!(categories.delete(work).unwrap());
    assert_eq!(categories.get_by_id(work).unwrap(), None);
    let kept = tasks.get_by_id(task).unwrap().unwrap();
    assert_eq!(kept.category_id, None);
}
