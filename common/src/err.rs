use thiserror::Error;

/// The crate's single error currency. Every variant's `Display` is either the
/// exact string the wire framer puts on the `'E'` packet, or an internal
/// message meant for the log, never both.
#[derive(Debug, Error)]
pub enum EngineError {
    //////////////////////
    // SQL-visible errors (§6 of the design) — Display is the literal wire text.
    //////////////////////
    #[error("Relation '{0}' does not exist")]
    NoTable(String),

    #[error("Attribute '{0}' not found")]
    NoColumn(String),

    #[error("SQL parse error")]
    BadParse,

    #[error("Output buffer full")]
    FullBuf,

    #[error("String too long for '{0}'")]
    BigStr(String),

    #[error("Can not update read-only column '{0}'")]
    NoWrite(String),

    #[error("Failed callback on column '{0}'")]
    BadTrigger(String),

    #[error("DELETE not available on relation '{0}'")]
    NoDelete(String),

    #[error("INSERT not available on relation '{0}'")]
    NoInsert(String),

    #[error("Failed INSERT on relation '{0}'")]
    BadInsert(String),

    //////////////////////
    // Registration errors (§4.2) — never reach the wire.
    //////////////////////
    #[error("too many tables registered")]
    TooManyTables,

    #[error("too many columns registered")]
    TooManyColumns,

    #[error("table named '{0}' is already registered")]
    DuplicateTable(String),

    #[error("table '{0}' already has a column named '{1}'")]
    DuplicateColumn(String, String),

    #[error("name '{0}' exceeds the maximum length")]
    OversizeName(String),

    #[error("help text for '{0}' exceeds the maximum length")]
    OversizeHelp(String),

    #[error("'{0}' is a reserved word and cannot be used as an identifier")]
    ReservedWord(String),

    #[error("column '{0}' does not belong to table '{1}'")]
    WrongOwningTable(String, String),

    #[error("table '{0}' has too many columns")]
    ColumnLimitExceeded(String),

    #[error("config directory '{0}' does not exist")]
    BadConfigDir(String),

    //////////////////////
    // System
    //////////////////////
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] toml::de::Error),
}

impl EngineError {
    /// True for the errors of §6/§7 that are meant to be framed back to the
    /// SQL client rather than only logged.
    pub fn is_sql_visible(&self) -> bool {
        matches!(
            self,
            EngineError::NoTable(_)
                | EngineError::NoColumn(_)
                | EngineError::BadParse
                | EngineError::FullBuf
                | EngineError::BigStr(_)
                | EngineError::NoWrite(_)
                | EngineError::BadTrigger(_)
                | EngineError::NoDelete(_)
                | EngineError::NoInsert(_)
                | EngineError::BadInsert(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
