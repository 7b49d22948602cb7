//! Versioned upgrades of the local store.
//!
//! `schema_meta.schema_version` records the last applied step. Each entry in
//! [`STEPS`] upgrades from its version minus one and commits together with the
//! new version number.

use rusqlite::Connection;

/// Version a freshly opened store ends up at.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

type Step = fn(&Connection) -> rusqlite::Result<()>;

/// `(target version, upgrade)` in ascending order.
const STEPS: &[(u32, Step)] = &[(2, add_write_timestamps)];

/// Stored schema version. An unparseable value counts as 0.
pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'schema_version'",
        [],
        |row| {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().unwrap_or(0))
        },
    )
}

fn set_schema_version(conn: &Connection, version: u32) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE schema_meta SET value = ?1 WHERE key = 'schema_version'",
        [version.to_string()],
    )?;
    Ok(())
}

/// Whether `kv` has the `updated_at` column.
pub fn has_write_timestamps(conn: &Connection) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('kv')")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns.iter().any(|c| c == "updated_at"))
}

/// Apply every step above the stored version. A store written by a newer
/// build is left as it is.
pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    let stored = get_schema_version(conn)?;
    if stored > CURRENT_SCHEMA_VERSION {
        tracing::warn!(stored, known = CURRENT_SCHEMA_VERSION, "store is newer than this build");
        return Ok(());
    }

    for &(target, step) in STEPS.iter().filter(|(target, _)| *target > stored) {
        tracing::info!(target, "upgrading store schema");
        let tx = conn.unchecked_transaction()?;
        step(&tx)?;
        set_schema_version(&tx, target)?;
        tx.commit()?;
    }
    Ok(())
}

fn add_write_timestamps(conn: &Connection) -> rusqlite::Result<()> {
    if !has_write_timestamps(conn)? {
        conn.execute("ALTER TABLE kv ADD COLUMN updated_at TEXT", [])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::schema::init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn steps_end_at_current_version() {
        assert_eq!(STEPS.last().map(|(v, _)| *v), Some(CURRENT_SCHEMA_VERSION));
        assert!(STEPS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn fresh_store_gains_write_timestamps() {
        let conn = fresh();
        assert_eq!(get_schema_version(&conn).unwrap(), 1);
        assert!(!has_write_timestamps(&conn).unwrap());

        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
        assert!(has_write_timestamps(&conn).unwrap());
    }

    #[test]
    fn newer_store_is_left_alone() {
        let conn = fresh();
        set_schema_version(&conn, CURRENT_SCHEMA_VERSION + 1).unwrap();

        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION + 1);
        assert!(!has_write_timestamps(&conn).unwrap());
    }
}
