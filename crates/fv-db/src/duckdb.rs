//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::sql_utils::{escape_sql_string, quote_ident, quote_qualified};
use crate::traits::{DatabaseCatalog, DatabaseCore};
use async_trait::async_trait;
use duckdb::types::Value;
use duckdb::{params, AccessMode, Connection};
use fv_core::{
    DatabaseConfig, RowSampler, SampleResult, SampleValue, TableColumn, TableDescriptor,
    TableName,
};
use std::borrow::Cow;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// DuckDB storage block size used to estimate table size
const BLOCK_SIZE_BYTES: f64 = 262_144.0;

/// Column types read as-is; every other type is selected as VARCHAR
const NATIVE_TYPES: &[&str] = &[
    "BOOLEAN", "TINYINT", "SMALLINT", "INTEGER", "BIGINT", "HUGEINT", "UTINYINT", "USMALLINT",
    "UINTEGER", "UBIGINT", "FLOAT", "DOUBLE", "VARCHAR", "BLOB",
];

/// Limits for the sampler's connection pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_open: usize,
    pub max_idle: usize,
    pub max_lifetime: Duration,
    pub max_idle_time: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self::from(&DatabaseConfig::default())
    }
}

impl From<&DatabaseConfig> for PoolSettings {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_open: config.open_connection_limit().clamp(1, Semaphore::MAX_PERMITS),
            max_idle: config.idle_connection_limit(),
            max_lifetime: config.connection_lifetime(),
            max_idle_time: config.connection_idle_time(),
        }
    }
}

struct IdleConnection {
    conn: Connection,
    opened: Instant,
    idle_since: Instant,
}

impl IdleConnection {
    fn reusable(&self, settings: &PoolSettings) -> bool {
        self.opened.elapsed() < settings.max_lifetime
            && self.idle_since.elapsed() < settings.max_idle_time
    }
}

/// DuckDB database backend.
///
/// Catalog reads and batch statements use the primary connection. Sampler
/// queries run on pooled clones of it, so concurrent tables do not queue
/// behind one lock. Each query blocks the worker thread it runs on.
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
    settings: PoolSettings,
    open: Semaphore,
    idle: Mutex<Vec<IdleConnection>>,
}

impl DuckDbBackend {
    fn with_primary(conn: Connection) -> Self {
        let settings = PoolSettings::default();
        Self {
            conn: Mutex::new(conn),
            open: Semaphore::new(settings.max_open),
            settings,
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::with_primary(conn))
    }

    /// Open a DuckDB database file.
    ///
    /// A read-only open fails if the file does not exist, instead of
    /// silently creating an empty database.
    pub fn from_path(path: &Path, read_only: bool) -> DbResult<Self> {
        let conn = if read_only {
            let config = duckdb::Config::default()
                .access_mode(AccessMode::ReadOnly)
                .map_err(|e| DbError::ConnectionError(e.to_string()))?;
            Connection::open_with_flags(path, config)
        } else {
            Connection::open(path)
        }
        .map_err(|e| DbError::ConnectionError(format!("{}: {}", path.display(), e)))?;
        Ok(Self::with_primary(conn))
    }

    /// Open from a path string (handles the `:memory:` special case)
    pub fn new(path: &str, read_only: bool) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path), read_only)
        }
    }

    /// Replace the pool limits
    pub fn with_pool(mut self, settings: PoolSettings) -> Self {
        let max_open = settings.max_open.clamp(1, Semaphore::MAX_PERMITS);
        self.open = Semaphore::new(max_open);
        self.settings = PoolSettings { max_open, ..settings };
        self
    }

    /// Open the database described by `config` and check it answers a query
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        let path = config
            .database_path()
            .ok_or_else(|| DbError::ConnectionError("no database path configured".to_string()))?;
        if config.has_network_settings() {
            log::warn!("database host/port/user/password are ignored; opening {} as a file", path);
        }
        let db = Self::new(path, config.read_only)?.with_pool(PoolSettings::from(config));
        db.ping().await?;
        log::info!("connected to {}", path);
        Ok(db)
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn lock_idle(&self) -> DbResult<MutexGuard<'_, Vec<IdleConnection>>> {
        self.idle
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Number of pooled connections waiting for reuse
    #[cfg(test)]
    pub(crate) fn idle_connections(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }

    /// Take a reusable idle connection or open a new one
    fn checkout(&self) -> DbResult<(Connection, Instant)> {
        {
            let mut idle = self.lock_idle()?;
            let settings = self.settings;
            idle.retain(|c| c.reusable(&settings));
            if let Some(pooled) = idle.pop() {
                return Ok((pooled.conn, pooled.opened));
            }
        }
        let conn = self
            .lock()?
            .try_clone()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok((conn, Instant::now()))
    }

    fn checkin(&self, conn: Connection, opened: Instant) -> DbResult<()> {
        if opened.elapsed() >= self.settings.max_lifetime {
            return Ok(());
        }
        let mut idle = self.lock_idle()?;
        if idle.len() < self.settings.max_idle {
            idle.push(IdleConnection {
                conn,
                opened,
                idle_since: Instant::now(),
            });
        }
        Ok(())
    }

    /// Run `f` on a pooled connection, waiting while `max_open` are in use
    async fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> DbResult<T>) -> DbResult<T> {
        let _permit = self
            .open
            .acquire()
            .await
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        let (conn, opened) = self.checkout()?;
        let result = f(&conn);
        self.checkin(conn, opened)?;
        result
    }

    /// Execute batch SQL synchronously
    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    fn ping_sync(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0))
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(())
    }

    fn list_tables_sync(&self, schema: &str, identity_column: &str) -> DbResult<Vec<TableDescriptor>> {
        let catalog_err = |e: duckdb::Error| DbError::CatalogError {
            schema: schema.to_string(),
            message: e.to_string(),
        };

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT table_name, COALESCE(estimated_size, 0) \
                 FROM duckdb_tables() \
                 WHERE database_name = current_database() AND schema_name = ? AND NOT temporary \
                 ORDER BY estimated_size ASC, table_name ASC",
            )
            .map_err(catalog_err)?;
        let rows: Vec<(String, i64)> = stmt
            .query_map(params![schema], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(catalog_err)?
            .collect::<Result<_, _>>()
            .map_err(catalog_err)?;

        let mut tables = Vec::with_capacity(rows.len());
        for (table, estimated) in rows {
            let Some(name) = TableName::in_schema(schema, table.as_str()) else {
                continue;
            };

            let columns = table_columns(&conn, schema, &table).map_err(catalog_err)?;
            let identity_key = primary_key_column(&conn, schema, &table)
                .map_err(catalog_err)?
                .or_else(|| {
                    columns
                        .iter()
                        .find(|column| column.name == identity_column)
                        .map(|column| column.name.clone())
                });
            let size_mb = estimate_size_mb(&conn, &name);

            log::debug!(
                "catalog: {} (~{} rows, {} columns, key {})",
                name,
                estimated,
                columns.len(),
                identity_key.as_deref().unwrap_or("-")
            );
            tables.push(TableDescriptor {
                name,
                estimated_rows: estimated.max(0) as u64,
                size_mb,
                column_count: Some(columns.len()),
                identity_key,
                columns,
            });
        }

        Ok(tables)
    }
}

fn count_rows(conn: &Connection, table: &TableName) -> DbResult<u64> {
    let sql = format!(
        "SELECT COUNT(*) FROM {}",
        quote_qualified(table.schema(), table.table())
    );
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(count.max(0) as u64)
}

fn max_key_text(conn: &Connection, table: &TableName, key_column: &str) -> DbResult<Option<String>> {
    let sql = format!(
        "SELECT CAST(MAX({}) AS VARCHAR) FROM {}",
        quote_ident(key_column),
        quote_qualified(table.schema(), table.table())
    );
    Ok(conn.query_row(&sql, [], |row| row.get::<_, Option<String>>(0))?)
}

fn sample_row_values(
    conn: &Connection,
    descriptor: &TableDescriptor,
    key: Option<(&str, &str)>,
) -> DbResult<Option<Vec<SampleValue>>> {
    let table = &descriptor.name;
    // Table list descriptors carry no columns; only those need a lookup
    let columns: Cow<'_, [TableColumn]> = if descriptor.columns.is_empty() {
        Cow::Owned(table_columns(conn, table.schema(), table.table())?)
    } else {
        Cow::Borrowed(&descriptor.columns)
    };
    let relation = quote_qualified(table.schema(), table.table());
    let select_list = if columns.is_empty() {
        "*".to_string()
    } else {
        columns
            .iter()
            .map(|column| select_expr(&column.name, &column.data_type))
            .collect::<Vec<_>>()
            .join(", ")
    };

    match key {
        Some((column, value)) => {
            // Compare in the key's own type so the predicate can use zone maps
            let predicate = match columns.iter().find(|c| c.name == column) {
                Some(key_column) => format!(
                    "{} = TRY_CAST(? AS {})",
                    quote_ident(column),
                    key_column.data_type
                ),
                None => format!("CAST({} AS VARCHAR) = ?", quote_ident(column)),
            };
            let sql = format!("SELECT {select_list} FROM {relation} WHERE {predicate} LIMIT 1");
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params![value])?;
            first_row_values(&mut rows)
        }
        None => {
            let sql = format!("SELECT {select_list} FROM {relation} LIMIT 1");
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query([])?;
            first_row_values(&mut rows)
        }
    }
}

/// Select expression for one column; non-native types are read as text
fn select_expr(column: &str, data_type: &str) -> String {
    if NATIVE_TYPES.contains(&data_type) {
        quote_ident(column)
    } else {
        format!("CAST({} AS VARCHAR)", quote_ident(column))
    }
}

/// Read the first row of a result set as sample values
fn first_row_values(rows: &mut duckdb::Rows<'_>) -> DbResult<Option<Vec<SampleValue>>> {
    let Some(row) = rows.next()? else {
        return Ok(None);
    };
    // column_count is only reliable once the statement has executed
    let column_count = row.as_ref().column_count();
    let mut values = Vec::with_capacity(column_count);
    for idx in 0..column_count {
        let value: Value = row.get(idx)?;
        values.push(to_sample_value(value)?);
    }
    Ok(Some(values))
}

/// Map a DuckDB value onto the closed sample value set
pub(crate) fn to_sample_value(value: Value) -> DbResult<SampleValue> {
    Ok(match value {
        Value::Null => SampleValue::Null,
        Value::Boolean(b) => SampleValue::Integer(i128::from(b)),
        Value::TinyInt(n) => SampleValue::Integer(n.into()),
        Value::SmallInt(n) => SampleValue::Integer(n.into()),
        Value::Int(n) => SampleValue::Integer(n.into()),
        Value::BigInt(n) => SampleValue::Integer(n.into()),
        Value::HugeInt(n) => SampleValue::Integer(n),
        Value::UTinyInt(n) => SampleValue::Integer(n.into()),
        Value::USmallInt(n) => SampleValue::Integer(n.into()),
        Value::UInt(n) => SampleValue::Integer(n.into()),
        Value::UBigInt(n) => SampleValue::Integer(n.into()),
        Value::Float(f) => SampleValue::Float(f.into()),
        Value::Double(f) => SampleValue::Float(f),
        Value::Decimal(d) => SampleValue::Text(d.to_string()),
        Value::Text(s) | Value::Enum(s) => SampleValue::Text(s),
        Value::Blob(bytes) => SampleValue::Binary(bytes),
        other => return Err(DbError::DecodeError(format!("{:?}", other))),
    })
}

/// Column names and declared types, in table order
fn table_columns(conn: &Connection, schema: &str, table: &str) -> duckdb::Result<Vec<TableColumn>> {
    let mut stmt = conn.prepare(
        "SELECT column_name, data_type FROM information_schema.columns \
         WHERE table_catalog = current_database() AND table_schema = ? AND table_name = ? \
         ORDER BY ordinal_position",
    )?;
    let columns = stmt
        .query_map(params![schema, table], |row| {
            Ok(TableColumn {
                name: row.get(0)?,
                data_type: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn primary_key_column(
    conn: &Connection,
    schema: &str,
    table: &str,
) -> duckdb::Result<Option<String>> {
    let mut stmt = conn.prepare(
        "SELECT constraint_column_names[1] FROM duckdb_constraints() \
         WHERE database_name = current_database() AND schema_name = ? AND table_name = ? \
           AND constraint_type = 'PRIMARY KEY' AND len(constraint_column_names) = 1",
    )?;
    let mut rows = stmt.query(params![schema, table])?;
    match rows.next()? {
        Some(row) => row.get::<_, Option<String>>(0),
        None => Ok(None),
    }
}

/// Best-effort table size from persisted storage blocks; 0.0 when unknown
fn estimate_size_mb(conn: &Connection, table: &TableName) -> f64 {
    let sql = format!(
        "SELECT COUNT(DISTINCT block_id) FROM pragma_storage_info('{}') WHERE persistent",
        escape_sql_string(&quote_qualified(table.schema(), table.table()))
    );
    match conn.query_row(&sql, [], |row| row.get::<_, i64>(0)) {
        Ok(blocks) => {
            let mb = blocks as f64 * BLOCK_SIZE_BYTES / 1024.0 / 1024.0;
            (mb * 100.0).round() / 100.0
        }
        Err(e) => {
            log::debug!("size estimate unavailable for {}: {}", table, e);
            0.0
        }
    }
}

#[async_trait]
impl DatabaseCore for DuckDbBackend {
    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn ping(&self) -> DbResult<()> {
        self.ping_sync()
    }
}

#[async_trait]
impl DatabaseCatalog for DuckDbBackend {
    async fn list_tables(
        &self,
        schema: &str,
        identity_column: &str,
    ) -> DbResult<Vec<TableDescriptor>> {
        self.list_tables_sync(schema, identity_column)
    }
}

#[async_trait]
impl RowSampler for DuckDbBackend {
    async fn count(&self, table: &TableName) -> SampleResult<u64> {
        Ok(self.with_connection(|conn| count_rows(conn, table)).await?)
    }

    async fn max_key(&self, table: &TableName, key_column: &str) -> SampleResult<Option<String>> {
        Ok(self
            .with_connection(|conn| max_key_text(conn, table, key_column))
            .await?)
    }

    async fn sample_row(
        &self,
        table: &TableDescriptor,
        key: Option<(&str, &str)>,
    ) -> SampleResult<Option<Vec<SampleValue>>> {
        Ok(self
            .with_connection(|conn| sample_row_values(conn, table, key))
            .await?)
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
