//! Dialect operations
//!
//! SQL fragments the generic query and migration layers ask the backend for:
//! date/time expressions, sequence names, identifier quoting and lookup
//! operators.

pub mod lookups;
pub mod sequence;
pub mod temporal;

pub use lookups::lookup_operator;
pub use sequence::SequenceNamer;
pub use temporal::{Connector, TemporalUnit};

use chrono::Duration;

use crate::config::DialectConfig;
use crate::error::Result;
use crate::utils::naming::IdentifierPolicy;

/// Query parameters accompanying a generated fragment
pub type Params = Vec<String>;

/// Entry point for dialect fragments, keyed by the generic layer's names
#[derive(Debug, Clone)]
pub struct DatabaseOperations {
    policy: IdentifierPolicy,
    sequences: SequenceNamer,
}

impl Default for DatabaseOperations {
    fn default() -> Self {
        Self::new(&DialectConfig::default())
    }
}

impl DatabaseOperations {
    pub fn new(config: &DialectConfig) -> Self {
        let policy = IdentifierPolicy::from_config(config);
        Self {
            policy,
            sequences: SequenceNamer::new(policy, config),
        }
    }

    pub fn max_name_length(&self) -> usize {
        self.policy.max_length()
    }

    pub fn quote_name(&self, name: &str) -> Result<String> {
        self.policy.quote(name)
    }

    pub fn date_extract_sql(&self, lookup: &str, expr: &str) -> Result<String> {
        let unit: TemporalUnit = lookup.parse()?;
        Ok(temporal::extract_sql(unit, expr))
    }

    /// Truncate a timestamp. The time zone is accepted for interface
    /// compatibility and ignored: the engine has no zone-aware timestamps.
    pub fn datetime_trunc_sql(
        &self,
        lookup: &str,
        expr: &str,
        tzname: Option<&str>,
    ) -> Result<(String, Params)> {
        let unit: TemporalUnit = lookup.parse()?;
        if let Some(tz) = tzname {
            tracing::trace!(tz = tz, "Ignoring time zone for timestamp truncation");
        }
        Ok((temporal::datetime_trunc_sql(unit, expr)?, Params::new()))
    }

    pub fn date_trunc_sql(&self, lookup: &str, expr: &str) -> Result<String> {
        let unit: TemporalUnit = lookup.parse()?;
        temporal::date_trunc_sql(unit, expr)
    }

    pub fn date_interval_sql(&self, expr: &str, connector: Connector, duration: Duration) -> String {
        temporal::date_interval_sql(expr, connector, duration)
    }

    pub fn get_sequence_name(&self, table: &str) -> Result<String> {
        self.sequences.sequence_name(table)
    }

    pub fn drop_sequence_sql(&self, table: &str) -> Result<String> {
        self.sequences.drop_sequence_sql(table)
    }

    pub fn last_insert_id_sql(&self, table: &str) -> Result<String> {
        self.sequences.last_insert_id_sql(table)
    }

    pub fn lookup_operator(&self, lookup: &str) -> Option<&'static str> {
        lookups::lookup_operator(lookup)
    }

    pub fn sequences(&self) -> &SequenceNamer {
        &self.sequences
    }
}
