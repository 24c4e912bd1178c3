//! Task assignments between people and department pools.
//!
//! Listing applies the visibility rules of `common::rules::visibility` for
//! the signed-in person. Editing, reassigning and deleting are reserved to
//! the task's creator; toggling the status is open to anyone who sees the
//! task in the `all` tab.

use crate::error::ServiceError;
use crate::services::acting_person;
use crate::session::SessionStore;
use crate::store::{new_id, tasks, Store};
use actix_web::web::{delete, get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use chrono::{Datelike, Local, NaiveDateTime};
use common::model::person::Person;
use common::model::snapshot::Snapshot;
use common::model::task::{TaskAssignment, TaskForm, TaskStatus};
use common::requests::{ReassignRequest, TaskQuery};
use common::rules::filters::tasks_for_pole;
use common::rules::validation::{validate_task, ValidationError};
use common::rules::visibility::{can_edit, can_toggle, visible_tasks, TaskView};
use log::info;
use rusqlite::Connection;

const API_PATH: &str = "/api/tasks";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("/save", post().to(save))
        .route("/{id}/reassign", post().to(reassign))
        .route("/{id}/toggle", post().to(toggle))
        .route("/{id}", delete().to(remove))
}

async fn list(
    store: web::Data<Store>,
    session: web::Data<SessionStore>,
    query: web::Query<TaskQuery>,
) -> impl Responder {
    let result = match acting_person(&session, &store).await {
        Ok(person) => task_views(&store, &person, &query, Local::now().naive_local()),
        Err(e) => Err(e),
    };
    match result {
        Ok(views) => HttpResponse::Ok().json(views),
        Err(e) => e.to_response(),
    }
}

fn task_views(
    store: &Store,
    person: &Person,
    query: &TaskQuery,
    now: NaiveDateTime,
) -> Result<Vec<TaskView>, ServiceError> {
    let conn = store.connect()?;
    let all = tasks::list(&conn)?;
    let pole = tasks_for_pole(&all, query.pole);
    Ok(visible_tasks(&pole, person, query.tab, now))
}

fn load(conn: &Connection, id: &str) -> Result<TaskAssignment, ServiceError> {
    tasks::get(conn, id)?.ok_or(ServiceError::NotFound("task"))
}

fn require_creator(task: &TaskAssignment, person: &Person) -> Result<(), ServiceError> {
    if can_edit(task, person) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden("only the creator may change this task"))
    }
}

async fn save(
    store: web::Data<Store>,
    session: web::Data<SessionStore>,
    form: web::Json<TaskForm>,
) -> impl Responder {
    let result = match acting_person(&session, &store).await {
        Ok(person) => save_task(&store, &person, form.into_inner()),
        Err(e) => Err(e),
    };
    match result {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => e.to_response(),
    }
}

fn save_task(store: &Store, person: &Person, form: TaskForm) -> Result<Snapshot, ServiceError> {
    validate_task(&form)?;
    let conn = store.connect()?;
    let existing = match form.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => Some(load(&conn, id)?),
        None => None,
    };
    let task = match existing {
        Some(existing) => {
            require_creator(&existing, person)?;
            TaskAssignment {
                title: form.title.trim().to_string(),
                assignees: form.assignees,
                department: form.department,
                deadline: form.deadline,
                urgency: form.urgency,
                fiscal_year: form.fiscal_year.unwrap_or(existing.fiscal_year.clone()),
                ..existing
            }
        }
        None => TaskAssignment {
            id: new_id(),
            title: form.title.trim().to_string(),
            assignees: form.assignees,
            creator_id: person.id.clone(),
            department: form.department,
            deadline: form.deadline,
            urgency: form.urgency,
            status: TaskStatus::Todo,
            fiscal_year: form
                .fiscal_year
                .unwrap_or_else(|| Local::now().year().to_string()),
        },
    };
    tasks::upsert(&conn, &task)?;
    info!("Task {} saved by {}", task.id, person.id);
    Ok(store.snapshot()?)
}

async fn reassign(
    store: web::Data<Store>,
    session: web::Data<SessionStore>,
    id: web::Path<String>,
    req: web::Json<ReassignRequest>,
) -> impl Responder {
    let result = match acting_person(&session, &store).await {
        Ok(person) => reassign_task(&store, &person, &id, req.into_inner()),
        Err(e) => Err(e),
    };
    match result {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => e.to_response(),
    }
}

fn reassign_task(
    store: &Store,
    person: &Person,
    id: &str,
    req: ReassignRequest,
) -> Result<Snapshot, ServiceError> {
    if req.assignees.is_empty() {
        return Err(ValidationError::NoAssignee.into());
    }
    let conn = store.connect()?;
    let mut task = load(&conn, id)?;
    require_creator(&task, person)?;
    task.assignees = req.assignees;
    tasks::upsert(&conn, &task)?;
    info!("Task {} reassigned by {}", task.id, person.id);
    Ok(store.snapshot()?)
}

async fn toggle(
    store: web::Data<Store>,
    session: web::Data<SessionStore>,
    id: web::Path<String>,
) -> impl Responder {
    let result = match acting_person(&session, &store).await {
        Ok(person) => toggle_task(&store, &person, &id),
        Err(e) => Err(e),
    };
    match result {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => e.to_response(),
    }
}

fn toggle_task(store: &Store, person: &Person, id: &str) -> Result<Snapshot, ServiceError> {
    let conn = store.connect()?;
    let mut task = load(&conn, id)?;
    if !can_toggle(&task, person) {
        return Err(ServiceError::Forbidden("this task is not visible to you"));
    }
    task.status = task.status.toggled();
    tasks::upsert(&conn, &task)?;
    info!("Task {} is now {}", task.id, task.status.as_str());
    Ok(store.snapshot()?)
}

async fn remove(
    store: web::Data<Store>,
    session: web::Data<SessionStore>,
    id: web::Path<String>,
) -> impl Responder {
    let result = match acting_person(&session, &store).await {
        Ok(person) => delete_task(&store, &person, &id),
        Err(e) => Err(e),
    };
    match result {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => e.to_response(),
    }
}

fn delete_task(store: &Store, person: &Person, id: &str) -> Result<Snapshot, ServiceError> {
    let conn = store.connect()?;
    let task = load(&conn, id)?;
    require_creator(&task, person)?;
    tasks::delete(&conn, &task.id)?;
    info!("Task {} deleted by {}", task.id, person.id);
    Ok(store.snapshot()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{test_app, TestContext};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use common::model::person::{Department, Role};
    use common::model::task::{Assignee, Pool, Urgency};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn task(id: &str, creator: &str, assignees: Vec<Assignee>, urgency: Urgency) -> TaskAssignment {
        TaskAssignment {
            id: id.into(),
            title: format!("Task {}", id),
            assignees,
            creator_id: creator.into(),
            department: Some(Department::Audit),
            deadline: None,
            urgency,
            status: TaskStatus::Todo,
            fiscal_year: "2025".into(),
        }
    }

    fn seed(ctx: &TestContext) {
        ctx.add_person("a", Department::Audit, Role::Collaborator);
        ctx.add_person("b", Department::Audit, Role::Collaborator);
        ctx.add_person("boss", Department::Expertise, Role::Admin);
        let conn = ctx.temp.store.connect().unwrap();
        let rows = [
            task("private", "a", vec![Assignee::Individual("a".into())], Urgency::Normal),
            task("pool", "boss", vec![Assignee::Pool(Pool::Audit)], Urgency::Critical),
            task("handoff", "a", vec![Assignee::Individual("b".into())], Urgency::Urgent),
        ];
        for row in &rows {
            tasks::upsert(&conn, row).unwrap();
        }
    }

    async fn listed(ctx: &TestContext, uri: &str) -> Vec<String> {
        let app = test_app!(ctx);
        let req = test::TestRequest::get().uri(uri).to_request();
        let views: Vec<TaskView> = test::call_and_read_body_json(&app, req).await;
        views.into_iter().map(|v| v.task.id).collect()
    }

    #[actix_web::test]
    async fn toggling_a_padded_id_replaces_the_row() {
        let ctx = TestContext::new();
        let a = ctx.add_person("a", Department::Audit, Role::Collaborator);
        let conn = ctx.temp.store.connect().unwrap();
        conn.execute_batch(
            "INSERT INTO tasks (id, title, assignees, creator_id, urgency, status)
             VALUES (' t1 ', 'X', 'a', 'a', 'normal', 'todo');",
        )
        .unwrap();

        let snapshot = toggle_task(&ctx.temp.store, &a, "t1").unwrap();
        assert_eq!(snapshot.tasks.len(), 1);
        assert_eq!(snapshot.tasks[0].id, "t1");
        assert_eq!(snapshot.tasks[0].status, TaskStatus::Done);
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM tasks", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[actix_web::test]
    async fn listing_follows_tabs_and_urgency() {
        let ctx = TestContext::new();
        seed(&ctx);

        ctx.sign_in("b").await;
        assert_eq!(listed(&ctx, "/api/tasks").await, vec!["pool", "handoff"]);
        assert_eq!(listed(&ctx, "/api/tasks?tab=received").await, vec!["pool", "handoff"]);
        assert!(listed(&ctx, "/api/tasks?tab=mine").await.is_empty());

        ctx.sign_in("boss").await;
        assert_eq!(listed(&ctx, "/api/tasks").await, vec!["pool", "handoff"]);
        assert!(listed(&ctx, "/api/tasks?pole=Expertise").await.is_empty());

        ctx.sign_in("a").await;
        assert_eq!(listed(&ctx, "/api/tasks?tab=delegated").await, vec!["handoff"]);
        assert_eq!(listed(&ctx, "/api/tasks?tab=mine").await, vec!["private"]);
    }

    #[actix_web::test]
    async fn only_the_creator_edits_but_assignees_toggle() {
        let ctx = TestContext::new();
        seed(&ctx);
        ctx.sign_in("b").await;
        let app = test_app!(ctx);

        let req = test::TestRequest::post()
            .uri("/api/tasks/handoff/reassign")
            .set_json(json!({"assignees": [{"kind": "individual", "value": "b"}]}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::delete().uri("/api/tasks/handoff").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post().uri("/api/tasks/handoff/toggle").to_request();
        let snapshot: Snapshot = test::call_and_read_body_json(&app, req).await;
        let handoff = snapshot.tasks.iter().find(|t| t.id == "handoff").unwrap();
        assert_eq!(handoff.status, TaskStatus::Done);

        let req = test::TestRequest::post().uri("/api/tasks/private/toggle").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn creator_saves_reassigns_and_deletes() {
        let ctx = TestContext::new();
        seed(&ctx);
        ctx.sign_in("a").await;
        let app = test_app!(ctx);

        let req = test::TestRequest::post()
            .uri("/api/tasks/save")
            .set_json(json!({
                "id": null, "title": " Prepare binder ",
                "assignees": [{"kind": "pool", "value": "Expertise"}],
                "department": "Expertise", "deadline": "2025-06-30", "fiscal_year": "2025"
            }))
            .to_request();
        let snapshot: Snapshot = test::call_and_read_body_json(&app, req).await;
        let created = snapshot
            .tasks
            .iter()
            .find(|t| t.title == "Prepare binder")
            .unwrap()
            .clone();
        assert_eq!(created.creator_id, "a");
        assert_eq!(created.urgency, Urgency::Normal);

        let req = test::TestRequest::post()
            .uri(&format!("/api/tasks/{}/reassign", created.id))
            .set_json(json!({"assignees": []}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri(&format!("/api/tasks/{}/reassign", created.id))
            .set_json(json!({"assignees": [{"kind": "individual", "value": "b"}]}))
            .to_request();
        let snapshot: Snapshot = test::call_and_read_body_json(&app, req).await;
        let reassigned = snapshot.tasks.iter().find(|t| t.id == created.id).unwrap();
        assert_eq!(reassigned.assignees, vec![Assignee::Individual("b".into())]);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/tasks/{}", created.id))
            .to_request();
        let snapshot: Snapshot = test::call_and_read_body_json(&app, req).await;
        assert!(snapshot.tasks.iter().all(|t| t.id != created.id));
    }

    #[actix_web::test]
    async fn anonymous_listing_is_refused() {
        let ctx = TestContext::new();
        let app = test_app!(ctx);
        let req = test::TestRequest::get().uri("/api/tasks").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
