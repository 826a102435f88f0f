use anyhow::{Context, Result};
use lifecycle::{Executor, Row, StoreError, StoreErrorKind};
use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode};
use postgres::config::SslMode;
use postgres::error::SqlState;
use postgres::{Client, Config, SimpleQueryMessage};
use postgres_openssl::MakeTlsConnector;
use std::cell::RefCell;

/// Runs statements over one pgwire connection, one simple query at a time.
pub struct PgExecutor {
    client: RefCell<Client>,
}

impl PgExecutor {
    /// Connect to `url`. The URL carries the password, so it never appears
    /// in the returned errors.
    pub fn connect(url: &str) -> Result<Self> {
        let config: Config = url.parse().context("Invalid connection URL")?;
        let tls = make_tls(&config)?;
        let client = config
            .connect(tls)
            .map_err(|e| store_error(&e))
            .context("Failed to connect to Materialize")?;
        log::debug!("connected to {:?}", config.get_hosts());
        Ok(Self {
            client: RefCell::new(client),
        })
    }
}

fn make_tls(config: &Config) -> Result<MakeTlsConnector> {
    let mut builder =
        SslConnector::builder(SslMethod::tls_client()).context("Failed to set up TLS")?;
    let verify_mode = match config.get_ssl_mode() {
        SslMode::Disable | SslMode::Prefer => SslVerifyMode::NONE,
        _ => SslVerifyMode::PEER,
    };
    builder.set_verify(verify_mode);
    builder
        .set_default_verify_paths()
        .context("Failed to load system certificates")?;
    Ok(MakeTlsConnector::new(builder.build()))
}

impl Executor for PgExecutor {
    fn execute(&self, sql: &str) -> Result<Vec<Row>, StoreError> {
        let messages = self
            .client
            .borrow_mut()
            .simple_query(sql)
            .map_err(|e| store_error(&e))?;

        Ok(messages
            .iter()
            .filter_map(|message| match message {
                SimpleQueryMessage::Row(row) => Some(
                    (0..row.len())
                        .map(|i| row.get(i).map(str::to_string))
                        .collect(),
                ),
                _ => None,
            })
            .collect())
    }
}

/// Turn a driver error into a store error.
///
/// Only the server's primary message is kept; it never echoes the statement,
/// which may carry secret values.
fn store_error(error: &postgres::Error) -> StoreError {
    if let Some(db) = error.as_db_error() {
        return StoreError::new(kind_for(db.code()), db.message());
    }
    if error.is_closed() {
        return StoreError::transport("connection closed");
    }
    StoreError::transport(error.to_string())
}

fn kind_for(code: &SqlState) -> StoreErrorKind {
    if *code == SqlState::UNDEFINED_OBJECT
        || *code == SqlState::UNDEFINED_TABLE
        || *code == SqlState::INVALID_SCHEMA_NAME
        || *code == SqlState::INVALID_CATALOG_NAME
    {
        StoreErrorKind::UnknownObject
    } else if code.code().starts_with("08") {
        // connection exception class
        StoreErrorKind::Transport
    } else {
        StoreErrorKind::Rejected
    }
}
