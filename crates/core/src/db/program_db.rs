use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::debug;

use crate::db::{ImportRunRecord, ImportRunStatus, MemoryBlockRecord};
use crate::program::{
    validate_name, Address, AddressRange, AddressSet, FunctionId, FunctionRecord, FunctionUpdate,
    ParameterRecord, ProgramError, ProgramModel, ProgramResult, ProgramSettings, SourceType,
};

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 3;

/// Error type for program database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },

    /// A record failed validation before it was written.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

const ADDR_SIGN_BIT: u64 = 1 << 63;

/// Addresses are stored with the sign bit flipped so SQLite's signed integer
/// ordering matches unsigned address ordering.
fn addr_to_sql(addr: u64) -> i64 {
    (addr ^ ADDR_SIGN_BIT) as i64
}

fn addr_from_sql(value: i64) -> u64 {
    (value as u64) ^ ADDR_SIGN_BIT
}

/// SQLite-backed program model.
///
/// This is a thin wrapper around `rusqlite::Connection` that is responsible for:
/// - Opening/creating the DB file.
/// - Applying schema migrations.
/// - Enforcing the program model's rules (valid names, unique names,
///   non-overlapping function bodies) on every write.
#[derive(Debug)]
pub struct ProgramDb {
    conn: Connection,
    settings: ProgramSettings,
}

impl ProgramDb {
    /// Open (or create) a program database at the given path and ensure the schema exists.
    pub fn open(path: &Path, settings: ProgramSettings) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn, settings })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory(settings: ProgramSettings) -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        apply_migrations(&conn)?;
        Ok(Self { conn, settings })
    }

    /// Expose a reference to the underlying connection for advanced callers.
    /// For most code, prefer higher-level helpers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn settings(&self) -> &ProgramSettings {
        &self.settings
    }

    /// Insert a memory block and return its row id.
    pub fn add_memory_block(&self, record: &MemoryBlockRecord) -> DbResult<i64> {
        if record.end <= record.start {
            return Err(DbError::InvalidRecord(format!(
                "memory block '{}' is empty: [{:#x}, {:#x})",
                record.name, record.start, record.end
            )));
        }
        self.conn.execute(
            r#"
            INSERT INTO memory_blocks (name, start_addr, end_addr)
            VALUES (?1, ?2, ?3)
            "#,
            params![record.name, addr_to_sql(record.start), addr_to_sql(record.end)],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List all memory blocks (ordered by start address).
    pub fn list_memory_blocks(&self) -> DbResult<Vec<MemoryBlockRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT name, start_addr, end_addr
            FROM memory_blocks
            ORDER BY start_addr
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(MemoryBlockRecord {
                name: row.get(0)?,
                start: addr_from_sql(row.get(1)?),
                end: addr_from_sql(row.get(2)?),
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// List all functions (ordered by entry address).
    pub fn list_functions(&self) -> DbResult<Vec<FunctionRecord>> {
        let ids: Vec<i64> = {
            let mut stmt = self.conn.prepare("SELECT id FROM functions ORDER BY entry")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            let mut ids = Vec::new();
            for row in rows {
                ids.push(row?);
            }
            ids
        };

        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(record) = self.load_function(FunctionId(id))? {
                out.push(record);
            }
        }
        Ok(out)
    }

    /// Load one function with its body and signature.
    pub fn load_function(&self, id: FunctionId) -> DbResult<Option<FunctionRecord>> {
        let head = self
            .conn
            .query_row(
                r#"
                SELECT name, entry, name_source, return_type, signature_source
                FROM functions
                WHERE id = ?1
                "#,
                params![id.0],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()?;
        let Some((name, entry, name_source, return_type, signature_source)) = head else {
            return Ok(None);
        };

        let mut body = Vec::new();
        {
            let mut stmt = self.conn.prepare(
                r#"
                SELECT start_addr, end_addr FROM function_ranges
                WHERE function_id = ?1
                ORDER BY start_addr
                "#,
            )?;
            let rows = stmt.query_map(params![id.0], |row| {
                Ok(AddressRange::new(
                    Address(addr_from_sql(row.get(0)?)),
                    Address(addr_from_sql(row.get(1)?)),
                ))
            })?;
            for r in rows {
                body.push(r?);
            }
        }

        let mut params_out = Vec::new();
        {
            let mut stmt = self.conn.prepare(
                r#"
                SELECT ordinal, name, data_type, storage FROM function_params
                WHERE function_id = ?1
                ORDER BY ordinal
                "#,
            )?;
            let rows = stmt.query_map(params![id.0], |row| {
                Ok(ParameterRecord {
                    ordinal: row.get::<_, i64>(0)? as u32,
                    name: row.get(1)?,
                    data_type: row.get(2)?,
                    storage: row.get(3)?,
                })
            })?;
            for r in rows {
                params_out.push(r?);
            }
        }

        Ok(Some(FunctionRecord {
            id,
            name,
            entry: Address(addr_from_sql(entry)),
            body,
            name_source: SourceType::parse(&name_source),
            return_type,
            signature_source: signature_source.as_deref().map(SourceType::parse),
            params: params_out,
        }))
    }

    /// Look up a function by exact name; returns its id and entry address.
    pub fn function_by_name(&self, name: &str) -> DbResult<Option<(FunctionId, Address)>> {
        let found = self
            .conn
            .query_row(
                "SELECT id, entry FROM functions WHERE name = ?1",
                params![name],
                |row| Ok((FunctionId(row.get(0)?), Address(addr_from_sql(row.get(1)?)))),
            )
            .optional()?;
        Ok(found)
    }

    /// Insert an import run record and return its row id.
    pub fn insert_import_run(&self, record: &ImportRunRecord) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO import_runs
                (source, source_hash, status, started_at, finished_at,
                 created, renamed, skipped, failed)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.source,
                record.source_hash,
                record.status.as_str(),
                record.started_at,
                record.finished_at,
                record.created,
                record.renamed,
                record.skipped,
                record.failed
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List import runs (ordered by id).
    pub fn list_import_runs(&self) -> DbResult<Vec<ImportRunRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT source, source_hash, status, started_at, finished_at,
                   created, renamed, skipped, failed
            FROM import_runs
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            let status: String = row.get(2)?;
            Ok(ImportRunRecord {
                source: row.get(0)?,
                source_hash: row.get(1)?,
                status: ImportRunStatus::parse(&status),
                started_at: row.get(3)?,
                finished_at: row.get(4)?,
                created: row.get(5)?,
                renamed: row.get(6)?,
                skipped: row.get(7)?,
                failed: row.get(8)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn function_entry(&self, id: FunctionId) -> ProgramResult<Address> {
        let entry = self
            .conn
            .query_row("SELECT entry FROM functions WHERE id = ?1", params![id.0], |row| {
                row.get::<_, i64>(0)
            })
            .optional()?;
        entry.map(|e| Address(addr_from_sql(e))).ok_or(ProgramError::FunctionNotFound(id.0))
    }

    fn check_name_free(&self, name: &str, owner: Option<FunctionId>) -> ProgramResult<()> {
        match self.function_by_name(name)? {
            Some((id, existing)) if Some(id) != owner => {
                Err(ProgramError::DuplicateName { name: name.to_string(), existing })
            }
            _ => Ok(()),
        }
    }

    /// Entry of any function whose body intersects `range`.
    fn overlapping_function(&self, range: &AddressRange) -> ProgramResult<Option<Address>> {
        let existing = self
            .conn
            .query_row(
                r#"
                SELECT f.entry
                FROM function_ranges r
                JOIN functions f ON f.id = r.function_id
                WHERE r.start_addr < ?2 AND ?1 < r.end_addr
                LIMIT 1
                "#,
                params![addr_to_sql(range.start.0), addr_to_sql(range.end.0)],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(existing.map(|e| Address(addr_from_sql(e))))
    }
}

impl ProgramModel for ProgramDb {
    fn to_addr(&self, offset: u64) -> ProgramResult<Address> {
        self.settings.to_addr(offset)
    }

    fn address_set(&self) -> ProgramResult<AddressSet> {
        let mut set = AddressSet::new();
        for block in self.list_memory_blocks()? {
            set.add_range(Address(block.start), Address(block.end));
        }
        Ok(set)
    }

    fn function_at(&self, entry: Address) -> ProgramResult<Option<FunctionId>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM functions WHERE entry = ?1",
                params![addr_to_sql(entry.0)],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(FunctionId))
    }

    fn create_function(
        &mut self,
        name: &str,
        entry: Address,
        body: &AddressSet,
        source: SourceType,
    ) -> ProgramResult<FunctionId> {
        validate_name(name)?;
        if !body.contains(entry) {
            return Err(ProgramError::InvalidInput(format!(
                "body of function '{name}' does not contain its entry point {entry}"
            )));
        }
        self.check_name_free(name, None)?;
        if self.function_at(entry)?.is_some() {
            return Err(ProgramError::OverlappingFunction { entry, existing: entry });
        }
        for range in body.ranges() {
            if let Some(existing) = self.overlapping_function(range)? {
                return Err(ProgramError::OverlappingFunction { entry, existing });
            }
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            r#"
            INSERT INTO functions (name, entry, name_source)
            VALUES (?1, ?2, ?3)
            "#,
            params![name, addr_to_sql(entry.0), source.as_str()],
        )?;
        let id = tx.last_insert_rowid();
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO function_ranges (function_id, start_addr, end_addr)
                VALUES (?1, ?2, ?3)
                "#,
            )?;
            for range in body.ranges() {
                stmt.execute(params![id, addr_to_sql(range.start.0), addr_to_sql(range.end.0)])?;
            }
        }
        tx.commit()?;

        debug!(name, %entry, "created function");
        Ok(FunctionId(id))
    }

    fn rename_function(
        &mut self,
        id: FunctionId,
        name: &str,
        source: SourceType,
    ) -> ProgramResult<()> {
        validate_name(name)?;
        self.function_entry(id)?;
        self.check_name_free(name, Some(id))?;
        self.conn.execute(
            "UPDATE functions SET name = ?1, name_source = ?2 WHERE id = ?3",
            params![name, source.as_str(), id.0],
        )?;
        Ok(())
    }

    fn update_function(&mut self, id: FunctionId, update: &FunctionUpdate) -> ProgramResult<()> {
        let entry = self.function_entry(id)?;
        let current: Option<String> = self.conn.query_row(
            "SELECT signature_source FROM functions WHERE id = ?1",
            params![id.0],
            |row| row.get(0),
        )?;
        if current.as_deref().map(SourceType::parse) == Some(SourceType::UserDefined)
            && !update.force
        {
            return Err(ProgramError::SignatureLocked(entry));
        }

        let convention = &self.settings.calling_convention;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE functions SET return_type = ?1, signature_source = ?2 WHERE id = ?3",
            params![update.return_type.name(), update.source.as_str(), id.0],
        )?;
        tx.execute("DELETE FROM function_params WHERE function_id = ?1", params![id.0])?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO function_params (function_id, ordinal, name, data_type, storage)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;
            for (ordinal, param) in update.params.iter().enumerate() {
                let storage =
                    update.update_type.is_dynamic().then(|| convention.storage_for(ordinal));
                stmt.execute(params![
                    id.0,
                    ordinal as i64,
                    param.name,
                    param.data_type.name(),
                    storage
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: initial schema (memory blocks, functions, ranges, params)
/// - 2: add import_runs table
/// - 3: store addresses with the sign bit flipped (see `addr_to_sql`)
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let current_version = current_schema_version(conn)?;

    // Reject DBs created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS memory_blocks (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                name       TEXT NOT NULL UNIQUE,
                start_addr INTEGER NOT NULL,
                end_addr   INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS functions (
                id               INTEGER PRIMARY KEY AUTOINCREMENT,
                name             TEXT NOT NULL UNIQUE,
                entry            INTEGER NOT NULL UNIQUE,
                name_source      TEXT NOT NULL,
                return_type      TEXT,
                signature_source TEXT
            );

            CREATE TABLE IF NOT EXISTS function_ranges (
                function_id INTEGER NOT NULL REFERENCES functions(id),
                start_addr  INTEGER NOT NULL,
                end_addr    INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS function_params (
                function_id INTEGER NOT NULL REFERENCES functions(id),
                ordinal     INTEGER NOT NULL,
                name        TEXT,
                data_type   TEXT NOT NULL,
                storage     TEXT,
                PRIMARY KEY(function_id, ordinal)
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS import_runs (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                source      TEXT NOT NULL,
                source_hash TEXT,
                status      TEXT NOT NULL,
                started_at  TEXT NOT NULL,
                finished_at TEXT NOT NULL,
                created     INTEGER NOT NULL,
                renamed     INTEGER NOT NULL,
                skipped     INTEGER NOT NULL,
                failed      INTEGER NOT NULL
            );

            PRAGMA user_version = 2;
            COMMIT;
            "#,
        )?;
    }

    if current_version < 3 {
        // x ^ (1 << 63), spelled without a XOR operator.
        conn.execute_batch(
            r#"
            BEGIN;
            UPDATE memory_blocks SET
                start_addr = (start_addr | 0x8000000000000000) - (start_addr & 0x8000000000000000),
                end_addr   = (end_addr | 0x8000000000000000) - (end_addr & 0x8000000000000000);
            UPDATE functions SET
                entry = (entry | 0x8000000000000000) - (entry & 0x8000000000000000);
            UPDATE function_ranges SET
                start_addr = (start_addr | 0x8000000000000000) - (start_addr & 0x8000000000000000),
                end_addr   = (end_addr | 0x8000000000000000) - (end_addr & 0x8000000000000000);
            PRAGMA user_version = 3;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
