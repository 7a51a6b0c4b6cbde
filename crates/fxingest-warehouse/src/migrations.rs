use ::duckdb::Connection;
use ::duckdb::ToSql;

struct Migration {
    version: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "0001_fx_rates",
        sql: r#"
CREATE TABLE IF NOT EXISTS fx_rates (
    date TEXT NOT NULL,
    base TEXT NOT NULL,
    symbol TEXT NOT NULL,
    rate DOUBLE NOT NULL,
    source TEXT NOT NULL,
    fetched_at TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY(date, base, symbol)
);
"#,
    },
    Migration {
        version: "0002_ingest_runs",
        sql: r#"
CREATE SEQUENCE IF NOT EXISTS ingest_runs_id_seq START 1;

CREATE TABLE IF NOT EXISTS ingest_runs (
    id BIGINT PRIMARY KEY DEFAULT nextval('ingest_runs_id_seq'),
    command TEXT NOT NULL,
    args TEXT,
    status TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    rows_inserted BIGINT NOT NULL DEFAULT 0,
    error_message TEXT
);
"#,
    },
];

pub fn apply_migrations(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    )?;

    for migration in MIGRATIONS {
        let params: [&dyn ToSql; 1] = [&migration.version];
        let applied_count: i64 = connection.query_row(
            "SELECT COUNT(*) FROM schema_migrations WHERE version = ?",
            params.as_slice(),
            |row| row.get(0),
        )?;

        if applied_count == 0 {
            connection.execute_batch(migration.sql)?;
            connection.execute(
                "INSERT INTO schema_migrations (version) VALUES (?)",
                params.as_slice(),
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let connection = Connection::open_in_memory().expect("in-memory db");
        apply_migrations(&connection).expect("first pass");
        apply_migrations(&connection).expect("second pass");

        let applied: i64 = connection
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .expect("count");
        assert_eq!(applied, MIGRATIONS.len() as i64);
    }

    #[test]
    fn rate_table_key_is_date_base_symbol() {
        let connection = Connection::open_in_memory().expect("in-memory db");
        apply_migrations(&connection).expect("migrate");

        connection
            .execute_batch(
                "INSERT INTO fx_rates (date, base, symbol, rate, source, fetched_at) \
                 VALUES ('2026-02-10', 'USD', 'BRL', 5.1, 'test', '2026-02-10T00:00:00Z');",
            )
            .expect("first insert");
        let duplicate = connection.execute_batch(
            "INSERT INTO fx_rates (date, base, symbol, rate, source, fetched_at) \
             VALUES ('2026-02-10', 'USD', 'BRL', 5.2, 'test', '2026-02-10T00:00:00Z');",
        );
        assert!(duplicate.is_err(), "same triple must violate the primary key");

        connection
            .execute_batch(
                "INSERT INTO fx_rates (date, base, symbol, rate, source, fetched_at) \
                 VALUES ('2026-02-10', 'EUR', 'BRL', 5.9, 'test', '2026-02-10T00:00:00Z');",
            )
            .expect("different base is a different row");
    }
}
