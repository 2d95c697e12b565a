use std::collections::HashMap;

use sha2::{Digest, Sha256};
use sqlx::{Executor, Row, SqlitePool};
use tracing::info;

use crate::time::now_ms;

static MIGRATIONS: &[(&str, &str)] = &[
    (
        "0001_baseline.sql",
        include_str!("../migrations/0001_baseline.sql"),
    ),
    (
        "0002_scope_indexes.sql",
        include_str!("../migrations/0002_scope_indexes.sql"),
    ),
];

fn strip_comments(sql: &str) -> String {
    sql.lines()
        .filter(|line| {
            let t = line.trim_start();
            !(t.is_empty() || t.starts_with("--"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn checksum(cleaned: &str) -> String {
    format!("{:x}", Sha256::digest(cleaned.as_bytes()))
}

/// Apply pending embedded migrations in order. A migration that was already
/// applied but whose file content changed since is a hard error.
pub async fn apply_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    pool.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (\
           version    TEXT PRIMARY KEY,\
           applied_at INTEGER NOT NULL,\
           checksum   TEXT NOT NULL\
         )",
    )
    .await?;

    let rows = sqlx::query("SELECT version, checksum FROM schema_migrations")
        .fetch_all(pool)
        .await?;
    let mut applied: HashMap<String, String> = HashMap::new();
    for r in rows {
        applied.insert(r.try_get("version")?, r.try_get("checksum")?);
    }

    for (filename, raw_sql) in MIGRATIONS {
        let cleaned = strip_comments(raw_sql);
        let digest = checksum(&cleaned);

        if let Some(stored) = applied.get(*filename) {
            if stored != &digest {
                anyhow::bail!("migration {} edited after application", filename);
            }
            info!(target: "bairnlog", event = "migration_skip_file", file = %filename);
            continue;
        }

        let mut tx = pool.begin().await?;
        for stmt in cleaned.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&mut *tx).await?;
        }
        sqlx::query(
            "INSERT INTO schema_migrations (version, applied_at, checksum) VALUES (?, ?, ?)",
        )
        .bind(*filename)
        .bind(now_ms())
        .bind(&digest)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        info!(target: "bairnlog", event = "migration_file_applied", file = %filename);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_ignores_comments_and_blank_lines() {
        let a = strip_comments("-- hello\n\nCREATE TABLE t (id TEXT);\n");
        let b = strip_comments("CREATE TABLE t (id TEXT);");
        assert_eq!(checksum(&a), checksum(&b));
    }

    #[test]
    fn migration_list_is_ordered() {
        let names: Vec<&str> = MIGRATIONS.iter().map(|(n, _)| *n).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
