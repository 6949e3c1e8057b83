use liveline_db::{create_pool, run_migrations, DbRuntimeSettings};

#[test]
fn db_initialization_works() {
    let pool = create_pool(":memory:", DbRuntimeSettings::default()).expect("failed to create pool");
    let conn = pool.get().expect("failed to get connection");
    let applied = run_migrations(&conn).expect("failed to run migrations");
    assert_eq!(applied, 3);

    // Verify table set (excluding sqlite internals)
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
        .expect("failed to prepare table query");
    let tables: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .expect("failed to execute table query")
        .map(|r| r.expect("failed to read table name"))
        .collect();

    assert_eq!(
        tables,
        vec![
            "_liveline_migrations".to_string(),
            "event_updates".to_string(),
            "live_events".to_string(),
        ]
    );
}

#[test]
fn delete_of_event_cascades_to_updates() {
    let pool = create_pool(":memory:", DbRuntimeSettings::default()).expect("failed to create pool");
    let conn = pool.get().expect("failed to get connection");
    run_migrations(&conn).expect("failed to run migrations");

    conn.execute(
        "INSERT INTO live_events (event_id, slug, title, status, author_id)
         VALUES ('ev-1', 'test', 'Test', 'live', 'ed-1')",
        [],
    )
    .expect("insert event");
    conn.execute(
        "INSERT INTO event_updates (update_id, event_id, content, author_id, author_name, seq)
         VALUES ('up-1', 'ev-1', 'hello', 'ed-1', 'Ed', 1)",
        [],
    )
    .expect("insert update");

    conn.execute("DELETE FROM live_events WHERE event_id = 'ev-1'", [])
        .expect("delete event");

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM event_updates", [], |row| row.get(0))
        .expect("count updates");
    assert_eq!(remaining, 0, "FK cascade should remove the event's updates");
}
