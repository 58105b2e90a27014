use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS keys (
            email       TEXT PRIMARY KEY,
            api_key     TEXT NOT NULL CHECK (api_key <> '')
        );
        ",
    )?;

    info!("Credential table ready");
    Ok(())
}
