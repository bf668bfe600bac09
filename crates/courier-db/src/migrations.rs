use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);"
    )?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        // No REFERENCES on child tables: deleting a message removes only its own row.
        conn.execute_batch(
            "
            CREATE TABLE messages (
                id          TEXT PRIMARY KEY,
                subject     TEXT NOT NULL,
                content     TEXT NOT NULL,
                sent_at     TEXT NOT NULL
            );

            CREATE TABLE recipients (
                id          TEXT PRIMARY KEY,
                message_id  TEXT NOT NULL,
                email       TEXT NOT NULL
            );

            CREATE INDEX idx_recipients_message
                ON recipients(message_id);

            CREATE TABLE attachments (
                id              TEXT PRIMARY KEY,
                message_id      TEXT NOT NULL,
                filename        TEXT NOT NULL,
                content_type    TEXT NOT NULL,
                size            INTEGER NOT NULL,
                object_key      TEXT NOT NULL UNIQUE,
                created_at      INTEGER NOT NULL
            );

            CREATE INDEX idx_attachments_message
                ON attachments(message_id);

            INSERT INTO schema_version (version) VALUES (1);
            "
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 1);

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
