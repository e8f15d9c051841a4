use std::env;

use infra::db::{self, Db};
use infra::repos::UserRepo;
use uuid::Uuid;

/// Connect to `TEST_DATABASE_URL` and apply migrations.
///
/// Returns `None` when the variable is unset so the suite can run without Postgres.
pub async fn setup_test_db() -> Option<Db> {
    let Ok(database_url) = env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping database test");
        return None;
    };

    let pool = db::connect(&database_url, 5)
        .await
        .expect("Failed to connect to test database");
    db::migrate(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

/// Random suffix so tests sharing one database never collide.
pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

#[allow(dead_code)]
pub async fn create_test_user(db: &Db) -> Uuid {
    let email = format!("{}@test.local", unique("user"));
    UserRepo::new(db.clone())
        .create(&email, "$2b$12$dummy.hash.for.testing")
        .await
        .expect("Failed to create test user")
        .id
}
