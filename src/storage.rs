//! In-memory SQLite store holding the `users` and `callLogs` tables.
//!
//! Loaders write through a [`Batch`], which wraps a single transaction: nothing
//! is visible until [`Batch::commit`], and dropping an uncommitted batch rolls
//! every change back.

use crate::error::Result;
use crate::types::{CallLogRow, NewCallLog, User, UserAnalyticsRow, UserRow};
use rusqlite::{params, Connection, Transaction};

/// `users` table schema
pub mod users {
    pub const TABLE: &str = "users";
    pub const USER_ID: &str = "userId";
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
}

/// `callLogs` table schema
pub mod call_logs {
    pub const TABLE: &str = "callLogs";
    pub const CALL_ID: &str = "callId";
    pub const PHONE_NUMBER: &str = "phoneNumber";
    pub const START_TIME: &str = "startTime";
    pub const END_TIME: &str = "endTime";
    pub const DIRECTION: &str = "direction";
    /// Declared as a foreign key to `users`, not enforced.
    pub const USER_ID: &str = "userId";
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    userId INTEGER PRIMARY KEY,
    firstName TEXT,
    lastName TEXT
);
CREATE TABLE IF NOT EXISTS callLogs (
    callId INTEGER PRIMARY KEY,
    phoneNumber TEXT,
    startTime INTEGER,
    endTime INTEGER,
    direction TEXT,
    userId INTEGER,
    FOREIGN KEY (userId) REFERENCES users(userId)
);
";

pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open a fresh in-memory database with both tables created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        // The bundled SQLite enforces foreign keys by default. Call logs may
        // reference users that were never loaded, so the declared key stays
        // informational.
        conn.pragma_update(None, "foreign_keys", false)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Start a write batch. Changes land only when the batch is committed.
    pub fn batch(&mut self) -> Result<Batch<'_>> {
        Ok(Batch {
            tx: self.conn.transaction()?,
        })
    }

    pub fn users(&self) -> Result<Vec<UserRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {}, {}, {} FROM {} ORDER BY {}",
            users::USER_ID,
            users::FIRST_NAME,
            users::LAST_NAME,
            users::TABLE,
            users::USER_ID
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(UserRow {
                    user_id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// All call logs in insertion order.
    pub fn call_logs(&self) -> Result<Vec<CallLogRow>> {
        self.select_call_logs(call_logs::CALL_ID)
    }

    /// All call logs ordered by user, then start time. `callId` breaks ties so
    /// the export is reproducible.
    pub fn ordered_calls(&self) -> Result<Vec<CallLogRow>> {
        self.select_call_logs(&format!(
            "{}, {}, {}",
            call_logs::USER_ID,
            call_logs::START_TIME,
            call_logs::CALL_ID
        ))
    }

    /// Average call duration and call count per user that has at least one
    /// call, ordered by `userId`.
    pub fn user_analytics(&self) -> Result<Vec<UserAnalyticsRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {uid}, AVG({end} - {start}) AS avgDuration, COUNT(*) AS numCalls \
             FROM {table} GROUP BY {uid} ORDER BY {uid}",
            uid = call_logs::USER_ID,
            end = call_logs::END_TIME,
            start = call_logs::START_TIME,
            table = call_logs::TABLE
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(UserAnalyticsRow {
                    user_id: row.get(0)?,
                    avg_duration: row.get(1)?,
                    num_calls: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn count_users(&self) -> Result<usize> {
        self.count(users::TABLE)
    }

    pub fn count_call_logs(&self) -> Result<usize> {
        self.count(call_logs::TABLE)
    }

    fn count(&self, table: &str) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        Ok(n as usize)
    }

    #[cfg(test)]
    pub(crate) fn drop_call_logs(&self) -> Result<()> {
        self.conn
            .execute_batch(&format!("DROP TABLE {}", call_logs::TABLE))?;
        Ok(())
    }

    fn select_call_logs(&self, order_by: &str) -> Result<Vec<CallLogRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {}, {}, {}, {}, {}, {} FROM {} ORDER BY {}",
            call_logs::CALL_ID,
            call_logs::PHONE_NUMBER,
            call_logs::START_TIME,
            call_logs::END_TIME,
            call_logs::DIRECTION,
            call_logs::USER_ID,
            call_logs::TABLE,
            order_by
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CallLogRow {
                    call_id: row.get(0)?,
                    phone_number: row.get(1)?,
                    start_time: row.get(2)?,
                    end_time: row.get(3)?,
                    direction: row.get(4)?,
                    user_id: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

/// Pending writes against [`Storage`].
pub struct Batch<'a> {
    tx: Transaction<'a>,
}

impl Batch<'_> {
    pub fn clear_users(&self) -> Result<usize> {
        Ok(self
            .tx
            .execute(&format!("DELETE FROM {}", users::TABLE), [])?)
    }

    pub fn insert_user(&self, user: &User) -> Result<()> {
        self.tx.execute(
            &format!(
                "INSERT INTO {} ({}, {}, {}) VALUES (?1, ?2, ?3)",
                users::TABLE,
                users::USER_ID,
                users::FIRST_NAME,
                users::LAST_NAME
            ),
            params![user.user_id, user.first_name, user.last_name],
        )?;
        Ok(())
    }

    /// Insert a call log and return the `callId` storage assigned to it.
    pub fn insert_call_log(&self, call: &NewCallLog) -> Result<i64> {
        self.tx.execute(
            &format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}) VALUES (?1, ?2, ?3, ?4, ?5)",
                call_logs::TABLE,
                call_logs::PHONE_NUMBER,
                call_logs::START_TIME,
                call_logs::END_TIME,
                call_logs::DIRECTION,
                call_logs::USER_ID
            ),
            params![
                call.phone_number,
                call.start_time,
                call.end_time,
                call.direction,
                call.user_id
            ],
        )?;
        Ok(self.tx.last_insert_rowid())
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}
