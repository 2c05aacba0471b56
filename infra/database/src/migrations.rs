use crate::error::{DatabaseError, DatabaseErrorExt};
use fxhash::FxHashMap;
use sha2::{Digest, Sha256};
use std::fmt;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::types::SurrealValue;
use tracing::{debug, info};

const BOOTSTRAP: &str = "DEFINE TABLE IF NOT EXISTS _migration SCHEMALESS;
DEFINE INDEX IF NOT EXISTS _migration_key ON _migration FIELDS module, version UNIQUE;";

/// One versioned schema change owned by a module.
///
/// Scripts are embedded with `include_str!` and must never change once applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub module: &'static str,
    pub version: u32,
    pub description: &'static str,
    pub script: &'static str,
}

impl Migration {
    #[must_use]
    pub const fn new(
        module: &'static str,
        version: u32,
        description: &'static str,
        script: &'static str,
    ) -> Self {
        Self { module, version, description, script }
    }

    /// Hex encoded sha256 of the script.
    #[must_use]
    pub fn checksum(&self) -> String {
        hex::encode(Sha256::digest(self.script.as_bytes()))
    }

    fn key(&self) -> MigrationKey {
        MigrationKey { module: self.module.to_owned(), version: self.version }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MigrationKey {
    pub module: String,
    pub version: u32,
}

impl fmt::Display for MigrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:04}", self.module, self.version)
    }
}

/// Outcome of [`MigrationRunner::run`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub applied: Vec<MigrationKey>,
    pub skipped: Vec<MigrationKey>,
}

#[derive(Debug, SurrealValue)]
struct AppliedRow {
    module: String,
    version: i64,
    checksum: String,
}

/// Applies pending migrations in `(module, version)` order and records them in `_migration`.
#[derive(Debug)]
pub struct MigrationRunner<'a> {
    db: &'a Surreal<Any>,
}

impl<'a> MigrationRunner<'a> {
    #[must_use]
    pub const fn new(db: &'a Surreal<Any>) -> Self {
        Self { db }
    }

    /// # Errors
    /// * [`DatabaseError::Validation`] for duplicate `(module, version)` pairs.
    /// * [`DatabaseError::Migration`] on a checksum mismatch or a failing script.
    pub async fn run(&self, migrations: &[Migration]) -> Result<MigrationReport, DatabaseError> {
        let mut ordered = migrations.to_vec();
        ordered.sort_by_key(|m| (m.module, m.version));
        if let Some(pair) = ordered.windows(2).find(|w| w[0].key() == w[1].key()) {
            return Err(DatabaseError::Validation {
                message: format!("duplicate migration {}", pair[0].key()).into(),
                context: None,
            });
        }

        self.db.query(BOOTSTRAP).await?.check().map_err(surrealdb::Error::from)?;
        let applied = self.applied().await?;

        let mut report = MigrationReport::default();
        for migration in ordered {
            let key = migration.key();
            let checksum = migration.checksum();

            if let Some(existing) = applied.get(&key) {
                if *existing != checksum {
                    return Err(DatabaseError::Migration {
                        message: format!(
                            "checksum mismatch for {key} (recorded {existing}, found {checksum})"
                        )
                        .into(),
                        context: Some("applied migrations are immutable".into()),
                    });
                }
                debug!(migration = %key, "Skipping applied migration");
                report.skipped.push(key);
                continue;
            }

            self.apply(&migration, checksum).await?;
            info!(migration = %key, description = migration.description, "Applied migration");
            report.applied.push(key);
        }

        Ok(report)
    }

    async fn applied(&self) -> Result<FxHashMap<MigrationKey, String>, DatabaseError> {
        let rows = self
            .db
            .query("SELECT module, version, checksum FROM _migration")
            .await
            .context("Loading applied migrations")?
            .take::<Vec<AppliedRow>>(0)
            .context("Parsing applied migrations")?;

        rows.into_iter()
            .map(|row| {
                let version = u32::try_from(row.version).map_err(|_| DatabaseError::Migration {
                    message: format!("invalid recorded version {}", row.version).into(),
                    context: Some(row.module.clone().into()),
                })?;
                Ok((MigrationKey { module: row.module, version }, row.checksum))
            })
            .collect()
    }

    async fn apply(&self, migration: &Migration, checksum: String) -> Result<(), DatabaseError> {
        let statements = format!(
            "{}\nCREATE _migration CONTENT {{ module: $module, version: $version, \
             description: $description, checksum: $checksum, applied_at: time::now() }};",
            migration.script
        );

        self.db
            .query(crate::transactional(&statements))
            .bind(("module", migration.module))
            .bind(("version", i64::from(migration.version)))
            .bind(("description", migration.description))
            .bind(("checksum", checksum))
            .await
            .context(format!("Executing {}", migration.key()))?
            .check()
            .map_err(|e| DatabaseError::Migration {
                message: surrealdb::Error::from(e).to_string().into(),
                context: Some(migration.key().to_string().into()),
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_stable_sha256() {
        let m = Migration::new("products", 1, "init", "DEFINE TABLE product;");
        assert_eq!(m.checksum().len(), 64);
        assert_eq!(m.checksum(), Migration { description: "other", ..m }.checksum());
        assert_ne!(m.checksum(), Migration { script: "DEFINE TABLE item;", ..m }.checksum());
    }

    #[test]
    fn key_display_pads_version() {
        let m = Migration::new("audit", 7, "x", "");
        assert_eq!(m.key().to_string(), "audit:0007");
    }
}
