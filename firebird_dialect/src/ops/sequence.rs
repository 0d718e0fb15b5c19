//! Sequence naming for identity columns
//!
//! Firebird has no auto-increment column type. An identity column is emulated
//! with a sequence (generator) per table and a BEFORE INSERT trigger that
//! fills the key from it.

use crate::config::DialectConfig;
use crate::error::Result;
use crate::utils::naming::IdentifierPolicy;

/// Derives sequence and trigger names from table names
#[derive(Debug, Clone)]
pub struct SequenceNamer {
    policy: IdentifierPolicy,
    sequence_suffix: String,
    trigger_suffix: String,
}

impl Default for SequenceNamer {
    fn default() -> Self {
        Self::new(IdentifierPolicy::default(), &DialectConfig::default())
    }
}

impl SequenceNamer {
    pub fn new(policy: IdentifierPolicy, config: &DialectConfig) -> Self {
        Self {
            policy,
            sequence_suffix: config.sequence_suffix.to_uppercase(),
            trigger_suffix: config.trigger_suffix.to_uppercase(),
        }
    }

    /// Normalize `base` so that `base + suffix` fits the identifier limit
    fn suffixed(&self, base: &str, suffix: &str) -> Result<String> {
        let budget = self.policy.max_length().saturating_sub(suffix.len());
        let base = self.policy.normalize_with_max(base, budget)?;
        Ok(format!("\"{}{}\"", base, suffix))
    }

    /// Quoted sequence name, e.g. `"TEST_SQ"` for `TEST`
    pub fn sequence_name(&self, base: &str) -> Result<String> {
        self.suffixed(base, &self.sequence_suffix)
    }

    /// Quoted name of the trigger feeding the sequence
    pub fn trigger_name(&self, base: &str) -> Result<String> {
        self.suffixed(base, &self.trigger_suffix)
    }

    pub fn create_sequence_sql(&self, base: &str) -> Result<String> {
        Ok(format!("CREATE SEQUENCE {}", self.sequence_name(base)?))
    }

    pub fn drop_sequence_sql(&self, base: &str) -> Result<String> {
        Ok(format!("DROP SEQUENCE {}", self.sequence_name(base)?))
    }

    /// Trigger assigning the next sequence value when the key is NULL
    pub fn autoinc_trigger_sql(&self, table: &str, pk_column: &str) -> Result<String> {
        let column = self.policy.quote(pk_column)?;
        Ok(format!(
            "CREATE TRIGGER {} FOR {} ACTIVE BEFORE INSERT POSITION 0 AS BEGIN \
             IF (NEW.{} IS NULL) THEN NEW.{} = NEXT VALUE FOR {}; END",
            self.trigger_name(table)?,
            self.policy.quote(table)?,
            column,
            column,
            self.sequence_name(table)?
        ))
    }

    /// Current sequence value without incrementing it
    pub fn last_insert_id_sql(&self, table: &str) -> Result<String> {
        Ok(format!(
            "SELECT GEN_ID({}, 0) FROM RDB$DATABASE",
            self.sequence_name(table)?
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_sequence_name() {
        let namer = SequenceNamer::default();
        assert_eq!(namer.sequence_name("TEST").unwrap(), "\"TEST_SQ\"");
        assert_eq!(namer.sequence_name("test").unwrap(), "\"TEST_SQ\"");
    }

    #[test]
    fn test_long_base_fits_with_suffix() {
        let namer = SequenceNamer::default();
        let name = namer.sequence_name("inventory_adjustment_history_entries").unwrap();

        // two quote characters around at most 31 bytes
        assert!(name.len() <= 33);
        assert!(name.ends_with("_SQ\""));
        assert_eq!(name, namer.sequence_name("inventory_adjustment_history_entries").unwrap());
    }

    #[test]
    fn test_trigger_sql() {
        let namer = SequenceNamer::default();
        assert_eq!(
            namer.autoinc_trigger_sql("bar", "id").unwrap(),
            "CREATE TRIGGER \"BAR_TR\" FOR \"BAR\" ACTIVE BEFORE INSERT POSITION 0 AS BEGIN \
             IF (NEW.\"ID\" IS NULL) THEN NEW.\"ID\" = NEXT VALUE FOR \"BAR_SQ\"; END"
        );
    }

    #[test]
    fn test_create_and_last_insert_id() {
        let namer = SequenceNamer::default();
        assert_eq!(namer.create_sequence_sql("BAR").unwrap(), "CREATE SEQUENCE \"BAR_SQ\"");
        assert_eq!(
            namer.last_insert_id_sql("BAR").unwrap(),
            "SELECT GEN_ID(\"BAR_SQ\", 0) FROM RDB$DATABASE"
        );
    }

    #[test]
    fn test_suffix_filling_the_limit_is_rejected() {
        let config = DialectConfig {
            max_identifier_length: 3,
            ..DialectConfig::default()
        };
        let namer = SequenceNamer::new(IdentifierPolicy::from_config(&config), &config);
        assert!(matches!(namer.sequence_name("TEST"), Err(Error::UnknownIdentifier(_))));
    }

    #[test]
    fn test_empty_base_is_rejected() {
        let namer = SequenceNamer::default();
        assert!(matches!(namer.drop_sequence_sql(""), Err(Error::UnknownIdentifier(_))));
    }
}
