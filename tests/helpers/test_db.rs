use issue_templates::infrastructure::persistence::Database;

pub async fn setup_test_db() -> Database {
    // Install drivers for AnyPool (required for tests)
    sqlx::any::install_default_drivers();

    // File-based SQLite in the temp dir, unique per test for parallel execution
    let temp_file = std::env::temp_dir().join(format!(
        "issue_templates_test_{}.db",
        uuid::Uuid::new_v4()
    ));
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.display());

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    db.run_migrations()
        .await
        .expect("Failed to run migrations");

    db
}
