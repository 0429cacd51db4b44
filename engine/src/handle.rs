//! Engine handle: the single owned value a host creates once and
//! threads through every API call. Wraps the registry, the live counters,
//! and the debug-config record that §4.9's meta-tables are views over.

use std::rc::Rc;

use catalog::TableRef;
use common::config::EngineConfig;
use common::err::EngineError;
use common::log::{init_tracing, LogHandle, LogOptions};
use common::Result;
use sql::Command;
use tracing::{event, Level};

use crate::dbg::DbgConfig;
use crate::executor::{self, ExecResult};
use crate::meta;
use crate::savefile;
use crate::stat::Stat;

/// Owns everything a running engine needs: the table registry, the shared
/// counters and debug flags the `rta_stat`/`rta_dbg` meta-tables expose, and
/// (while alive) the tracing writer the debug config selected.
pub struct Engine {
    registry: catalog::Registry,
    stat: Rc<Stat>,
    dbg: Rc<DbgConfig>,
    _log: LogHandle,
}

impl Engine {
    pub fn new() -> Self {
        let dbg = Rc::new(DbgConfig::new());
        let log = init_tracing(&log_options(&dbg));
        Engine {
            registry: catalog::Registry::new(),
            stat: Rc::new(Stat::new()),
            dbg,
            _log: log,
        }
    }

    /// Builds an `Engine` from a parsed config file (§4.11): wires the
    /// initial `dbg` flags, installs tracing, and sets the savefile
    /// directory if one is configured.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let dbg = Rc::new(DbgConfig::from_section(&config.engine));
        let log = init_tracing(&log_options(&dbg));
        let mut registry = catalog::Registry::new();
        if let Some(dir) = config.savefile_dir() {
            registry.set_config_dir(dir)?;
        }
        Ok(Engine {
            registry,
            stat: Rc::new(Stat::new()),
            dbg,
            _log: log,
        })
    }

    pub fn set_config_dir(&mut self, path: &str) -> Result<()> {
        self.registry.set_config_dir(path)
    }

    /// Registers `descriptor` and, if it names a savefile, replays it.
    /// A replay failure is logged and does not undo the registration
    /// (§4.2 step 9): a missing or corrupt savefile means "start empty",
    /// not "refuse to come up".
    pub fn add_table(&mut self, descriptor: TableRef) -> Result<()> {
        self.registry.add_table(descriptor.clone())?;
        if descriptor.has_savefile() {
            let path = self.registry.resolve_savefile(&descriptor);
            if let Err(err) = savefile::load(&descriptor, &path) {
                event!(Level::WARN, table = %descriptor.name, path = %path, error = %err, "savefile load failed, table starts empty");
            }
        }
        Ok(())
    }

    pub fn save(&self, table_name: &str, path: &str) -> Result<()> {
        let table = self.registry.find(table_name).ok_or_else(|| EngineError::NoTable(table_name.to_string()))?;
        savefile::save(&table, path)
    }

    pub fn load(&self, table_name: &str, path: &str) -> Result<()> {
        let table = self.registry.find(table_name).ok_or_else(|| EngineError::NoTable(table_name.to_string()))?;
        savefile::load(&table, path)
    }

    pub fn stat(&self) -> &Stat {
        &self.stat
    }

    pub fn dbg(&self) -> &DbgConfig {
        &self.dbg
    }

    /// Resolves `command.table` against either a registered table or one of
    /// the four synthesized meta-tables (§4.9), returning it alongside the
    /// index the wire framer's OID scheme needs.
    fn resolve_table(&self, name: &str) -> Result<(TableRef, usize)> {
        if meta::is_meta_table(name) {
            let built = match name {
                meta::RTA_TABLES => meta::build_rta_tables(&self.registry)?,
                meta::RTA_COLUMNS => meta::build_rta_columns(&self.registry)?,
                meta::RTA_DBG => meta::build_rta_dbg(self.dbg.clone())?,
                meta::RTA_STAT => meta::build_rta_stat(self.stat.clone())?,
                _ => unreachable!("is_meta_table guards this match"),
            };
            return Ok((Rc::new(built), self.registry.tables().len()));
        }

        let index = self.registry.tables().iter().position(|t| t.name == name).ok_or_else(|| EngineError::NoTable(name.to_string()))?;
        Ok((self.registry.tables()[index].clone(), index))
    }

    /// Parses and runs one SQL statement (§4.6, §4.9, §4.10): resolves the
    /// target table, executes it, saves to disk if the write touched a
    /// DISKSAVE column, bumps the `rta_stat` counters, and emits a
    /// trace-level log line gated by `dbg.trace`.
    pub fn execute_sql(&self, sql_text: &str) -> Result<ExecResult> {
        let command = sql::parse(sql_text).map_err(|err| {
            if self.dbg.sqlerr.get() {
                event!(Level::DEBUG, sql = %sql_text, error = %err, "sql parse error");
            }
            self.stat.bump_sqlerr();
            err
        })?;

        match self.run_parsed(&command) {
            Ok(result) => {
                self.stat.bump_verb(command.kind);
                if self.dbg.trace.get() {
                    event!(Level::TRACE, table = %command.table, verb = ?command.kind, "statement executed");
                }
                Ok(result)
            }
            Err(err) => {
                if self.dbg.sqlerr.get() {
                    event!(Level::DEBUG, sql = %sql_text, error = %err, "statement failed");
                }
                self.stat.bump_sqlerr();
                Err(err)
            }
        }
    }

    fn run_parsed(&self, command: &Command) -> Result<ExecResult> {
        let (table, index) = self.resolve_table(&command.table)?;
        let (result, should_save) = executor::execute(&table, index, command)?;
        if should_save {
            let path = self.registry.resolve_savefile(&table);
            if let Err(err) = savefile::save(&table, &path) {
                if self.dbg.syserr.get() {
                    event!(Level::WARN, table = %table.name, path = %path, error = %err, "savefile write failed");
                }
                self.stat.bump_syserr();
            }
        }
        Ok(result)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

fn log_options(dbg: &DbgConfig) -> LogOptions {
    LogOptions {
        target: dbg.log_target(),
        ident: dbg.ident.borrow().clone(),
        trace: dbg.trace.get(),
        ..LogOptions::default()
    }
}
