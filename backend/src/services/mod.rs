//! HTTP surface. Each submodule owns one `/api/...` scope; `configure`
//! mounts them all.
//!
//! Reads answer with the requested view. Every write answers with a fresh
//! [`Snapshot`](common::model::snapshot::Snapshot) so the client never
//! patches its own copy.

pub mod attendance;
pub mod auth;
pub mod dashboard;
pub mod entries;
pub mod export;
pub mod folders;
pub mod import;
pub mod people;
pub mod snapshot;
pub mod tasks;

use crate::error::ServiceError;
use crate::session::SessionStore;
use crate::store::{people as people_store, Store};
use actix_web::web::ServiceConfig;
use common::model::person::Person;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(snapshot::configure_routes())
        .service(auth::configure_routes())
        .service(people::configure_routes())
        .service(folders::configure_routes())
        .service(entries::configure_routes())
        .service(tasks::configure_routes())
        .service(attendance::configure_routes())
        .service(dashboard::configure_routes())
        .service(export::configure_routes())
        .service(import::configure_routes());
}

/// The signed-in person, re-read from the store. A session pointing at a
/// deleted person counts as no session.
pub(crate) async fn acting_person(
    session: &SessionStore,
    store: &Store,
) -> Result<Person, ServiceError> {
    let person_id = session
        .person_id()
        .await
        .ok_or(ServiceError::Unauthenticated)?;
    let conn = store.connect()?;
    people_store::get(&conn, &person_id)?.ok_or(ServiceError::Unauthenticated)
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::job_controller::state::{JobUpdate, JobsState};
    use crate::session::SessionStore;
    use crate::store::pin::hash_pin;
    use crate::store::testing::{temp_store, TempStore};
    use crate::store::{folders, people};
    use actix_web::web;
    use chrono::NaiveTime;
    use common::model::folder::Folder;
    use common::model::person::{Department, Person, Role};
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    pub const PIN: &str = "1234";

    /// Store, session file and job state for one endpoint test.
    pub struct TestContext {
        pub temp: TempStore,
        pub session: web::Data<SessionStore>,
        pub jobs: JobsState,
        pub updates: mpsc::Receiver<JobUpdate>,
        _session_dir: TempDir,
    }

    impl TestContext {
        pub fn new() -> Self {
            let session_dir = tempfile::tempdir().unwrap();
            let session = SessionStore::load(session_dir.path().join("session.json"));
            let (jobs, updates) = JobsState::new();
            TestContext {
                temp: temp_store(),
                session: web::Data::new(session),
                jobs,
                updates,
                _session_dir: session_dir,
            }
        }

        pub fn add_person(&self, id: &str, department: Department, role: Role) -> Person {
            let person = Person {
                id: id.into(),
                name: format!("Person {}", id),
                department,
                role,
                hire_date: None,
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                pin_hash: hash_pin(PIN),
            };
            let conn = self.temp.store.connect().unwrap();
            people::upsert(&conn, &person).unwrap();
            person
        }

        pub fn add_folder(&self, id: &str, number: &str, budget_hours: f64) -> Folder {
            let folder = Folder {
                id: id.into(),
                name: format!("Folder {}", id),
                number: number.into(),
                client: "ACME".into(),
                service: Some(Department::Audit),
                budget_hours,
                archived: false,
            };
            let conn = self.temp.store.connect().unwrap();
            folders::upsert(&conn, &folder).unwrap();
            folder
        }

        pub async fn sign_in(&self, id: &str) {
            self.session.sign_in(id).await.unwrap();
        }
    }

    /// Builds the full application around a `TestContext`.
    macro_rules! test_app {
        ($ctx:expr) => {
            actix_web::test::init_service(
                actix_web::App::new()
                    .app_data(actix_web::web::Data::new($ctx.temp.store.clone()))
                    .app_data($ctx.session.clone())
                    .app_data(actix_web::web::Data::new($ctx.jobs.clone()))
                    .configure(crate::services::configure),
            )
            .await
        };
    }
    pub(crate) use test_app;
}
