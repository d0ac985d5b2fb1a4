//! Shared SQLite fixtures: the role tables, a seeded DAG table and grant helpers.

#![allow(dead_code)]

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    let statements = [
        "CREATE TABLE ab_role (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )",
        "CREATE TABLE ab_permission_grant (
            role_id INTEGER NOT NULL REFERENCES ab_role(id) ON DELETE CASCADE,
            action TEXT NOT NULL,
            resource_class TEXT NOT NULL,
            PRIMARY KEY (role_id, action, resource_class)
        )",
        "CREATE TABLE dag (dag_id TEXT PRIMARY KEY, is_active INTEGER NOT NULL)",
    ];
    for statement in statements {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }

    for (dag_id, active) in [("dag_a", 1), ("dag_b", 1), ("dag_c", 1), ("dag_d", 0)] {
        sqlx::query("INSERT INTO dag (dag_id, is_active) VALUES (?, ?)")
            .bind(dag_id)
            .bind(active)
            .execute(&pool)
            .await
            .unwrap();
    }

    pool
}

pub async fn create_role(pool: &SqlitePool, name: &str) {
    sqlx::query("INSERT OR IGNORE INTO ab_role (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn grant(pool: &SqlitePool, role: &str, action: &str, resource_class: &str) {
    sqlx::query(
        "INSERT OR IGNORE INTO ab_permission_grant (role_id, action, resource_class) \
         SELECT id, ?, ? FROM ab_role WHERE name = ?",
    )
    .bind(action)
    .bind(resource_class)
    .bind(role)
    .execute(pool)
    .await
    .unwrap();
}
