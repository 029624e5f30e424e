//! Publish coordinator: compare a built table with its last release and promote it

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use tokio_util::sync::CancellationToken;
use super::compare::compare_sql;
use super::error::PublishError;
use super::metadata::TableMetadata;
use super::table_id::{PublishedTableVersionSet, TableId};
use super::warehouse::{with_deadline, Warehouse};
use crate::config::Config;

/// Whether pending publishes are carried out or only reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApprovalPolicy {
    #[default]
    AutoApprove,
    DryRun,
}

/// Where a table ended up in the publish workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    /// Checked that the source and destinations exist; no earlier release to compare with
    Candidate,
    /// Compared with the previous release; changes found
    Compared,
    Published,
    /// Identical to the previous release
    Skipped,
}

impl fmt::Display for PublishState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PublishState::Candidate => "candidate",
            PublishState::Compared => "compared",
            PublishState::Published => "published",
            PublishState::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// Everything `execute` will do for one table, in order
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPublish {
    pub tables: PublishedTableVersionSet,
    /// (source, destination) table copies
    pub copies: Vec<(TableId, TableId)>,
    pub metadata_updates: Vec<(TableId, TableMetadata)>,
    /// Previous versioned table to mark archived
    pub archive: Option<TableId>,
    /// The versioned table of this release already exists and is overwritten
    pub replaces_release: bool,
}

impl PendingPublish {
    /// `Compared` when an earlier release was diffed, `Candidate` for a first release
    pub fn state(&self) -> PublishState {
        if self.tables.previous_versioned.is_some() {
            PublishState::Compared
        } else {
            PublishState::Candidate
        }
    }
}

impl fmt::Display for PendingPublish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Publish {} ({})", self.tables.base_name(), self.tables.release)?;
        for (source, destination) in &self.copies {
            writeln!(f, "  copy {source} -> {destination}")?;
        }
        for (table, metadata) in &self.metadata_updates {
            match &metadata.friendly_name {
                Some(name) => writeln!(f, "  update metadata of {table} (friendly name '{name}')")?,
                None => writeln!(f, "  update metadata of {table}")?,
            }
        }
        if let Some(table) = &self.archive {
            writeln!(f, "  archive {table}")?;
        }
        if self.replaces_release {
            writeln!(f, "  replace published {}", self.tables.versioned)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PublishDecision {
    /// Nothing changed since `previous`
    Skip { previous: TableId },
    Pending(PendingPublish),
}

/// Result of publishing one table
#[derive(Debug, Clone, PartialEq)]
pub struct PublishOutcome {
    pub table: String,
    pub state: PublishState,
    /// The work performed (or, for a dry run, the work that would be)
    pub report: Option<PendingPublish>,
}

/// Results of a [`PublishCoordinator::publish_all`] run
#[derive(Debug, Clone, Default)]
pub struct PublishSummary {
    pub published: Vec<String>,
    pub skipped: Vec<String>,
    /// Changed tables left unpublished by a dry run
    pub pending: Vec<PendingPublish>,
    /// (table, error message)
    pub failed: Vec<(String, String)>,
}

impl PublishSummary {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Drives the candidate → compared → published | skipped workflow
pub struct PublishCoordinator<'a, W: Warehouse + ?Sized> {
    config: &'a Config,
    warehouse: &'a W,
    policy: ApprovalPolicy,
    published_on: NaiveDate,
    cancel: CancellationToken,
}

impl<'a, W: Warehouse + ?Sized> PublishCoordinator<'a, W> {
    pub fn new(config: &'a Config, warehouse: &'a W) -> Self {
        Self {
            config,
            warehouse,
            policy: ApprovalPolicy::default(),
            published_on: chrono::Local::now().date_naive(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_policy(mut self, policy: ApprovalPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Date substituted for the `published-on` template tag
    pub fn with_publish_date(mut self, date: NaiveDate) -> Self {
        self.published_on = date;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Check the candidate and compare it with the latest release at or before this one
    pub async fn prepare(&self, mut tables: PublishedTableVersionSet) -> Result<PublishDecision, PublishError> {
        let timeout = self.config.job_timeout();
        let cancel = &self.cancel;
        let wh = self.warehouse;

        if !with_deadline("table_exists", timeout, cancel, wh.table_exists(&tables.source)).await? {
            return Err(PublishError::MissingSource(tables.source.to_string()));
        }
        for destination in [&tables.current, &tables.versioned] {
            let exists = with_deadline(
                "dataset_exists",
                timeout,
                cancel,
                wh.dataset_exists(&destination.project, &destination.dataset),
            )
            .await?;
            if !exists {
                return Err(PublishError::MissingDataset(destination.dataset_id()));
            }
        }
        tracing::debug!(table = %tables.source, state = %PublishState::Candidate, "Publish candidate");

        let versioned = with_deadline(
            "list_tables",
            timeout,
            cancel,
            wh.list_tables(&tables.versioned.project, &tables.versioned.dataset),
        )
        .await?;
        tables.previous_versioned = tables.find_previous(versioned.iter().map(String::as_str));

        if let Some(previous) = &tables.previous_versioned {
            let schema = with_deadline("table_schema", timeout, cancel, wh.table_schema(&tables.source)).await?;
            let sql = compare_sql(&tables.source, previous, &schema.nan_columns())?;
            let differing = with_deadline("run_query", timeout, cancel, wh.run_query(&sql)).await?;
            tracing::debug!(
                table = %tables.source,
                previous = %previous,
                state = %PublishState::Compared,
                differing,
                "Compared with previous release"
            );
            if differing == 0 {
                return Ok(PublishDecision::Skip {
                    previous: previous.clone(),
                });
            }
        } else {
            tracing::info!(table = %tables.source, "No previous release, publishing as new");
        }

        Ok(PublishDecision::Pending(self.pending(tables)?))
    }

    fn pending(&self, tables: PublishedTableVersionSet) -> Result<PendingPublish, PublishError> {
        let mut tags: BTreeMap<String, String> = self.config.schema_tags.clone();
        tags.insert("release".to_string(), tables.release.to_string());
        tags.insert("published-on".to_string(), self.published_on.format("%Y-%m-%d").to_string());

        let current_metadata = match &self.config.metadata_template {
            Some(template) => template.render(&tags)?,
            None => TableMetadata::default(),
        };
        let friendly_name = current_metadata
            .friendly_name
            .clone()
            .unwrap_or_else(|| tables.base_name().to_uppercase());
        let versioned_metadata = current_metadata
            .clone()
            .with_friendly_name(format!("{} {}", friendly_name, tables.release.to_string().to_uppercase()));

        let mut metadata_updates = vec![(tables.versioned.clone(), versioned_metadata)];
        if !current_metadata.is_empty() {
            metadata_updates.push((tables.current.clone(), current_metadata));
        }

        // a rerun of the same release compares against its own versioned table
        let replaces_release = tables.previous_versioned.as_ref() == Some(&tables.versioned);
        let archive = tables.previous_versioned.clone().filter(|_| !replaces_release);

        Ok(PendingPublish {
            copies: vec![
                (tables.source.clone(), tables.versioned.clone()),
                (tables.source.clone(), tables.current.clone()),
            ],
            metadata_updates,
            archive,
            replaces_release,
            tables,
        })
    }

    /// Carry out a pending publish regardless of the approval policy
    pub async fn execute(&self, pending: &PendingPublish) -> Result<(), PublishError> {
        let timeout = self.config.job_timeout();
        let cancel = &self.cancel;
        let wh = self.warehouse;

        for (source, destination) in &pending.copies {
            if pending.replaces_release && destination == &pending.tables.versioned {
                tracing::warn!(
                    table = %destination,
                    release = %pending.tables.release,
                    "Overwriting the already published versioned table of this release"
                );
            }
            with_deadline("copy_table", timeout, cancel, wh.copy_table(source, destination)).await?;
            tracing::info!(source = %source, destination = %destination, "Copied table");
        }
        for (table, metadata) in &pending.metadata_updates {
            with_deadline(
                "update_table_metadata",
                timeout,
                cancel,
                wh.update_table_metadata(table, metadata),
            )
            .await?;
        }
        if let Some(previous) = &pending.archive {
            with_deadline(
                "update_table_metadata",
                timeout,
                cancel,
                wh.update_table_metadata(previous, &TableMetadata::archived()),
            )
            .await?;
            tracing::info!(table = %previous, "Archived previous release");
        }
        Ok(())
    }

    /// Prepare one table and, unless this is a dry run, publish it
    pub async fn publish_table(&self, tables: PublishedTableVersionSet) -> Result<PublishOutcome, PublishError> {
        let table = tables.base_name().to_string();
        match self.prepare(tables).await? {
            PublishDecision::Skip { previous } => {
                tracing::warn!(table = %table, previous = %previous, "No changes since previous release, skipping");
                Ok(PublishOutcome {
                    table,
                    state: PublishState::Skipped,
                    report: None,
                })
            }
            PublishDecision::Pending(pending) if self.policy == ApprovalPolicy::DryRun => {
                tracing::info!(table = %table, "Dry run, not publishing:\n{pending}");
                Ok(PublishOutcome {
                    table,
                    state: pending.state(),
                    report: Some(pending),
                })
            }
            PublishDecision::Pending(pending) => {
                self.execute(&pending).await?;
                tracing::info!(table = %table, release = %pending.tables.release, "Published");
                Ok(PublishOutcome {
                    table,
                    state: PublishState::Published,
                    report: Some(pending),
                })
            }
        }
    }

    /// Publish every built table in order; one table failing does not stop the rest
    pub async fn publish_all<I, S>(&self, bases: I) -> PublishSummary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut summary = PublishSummary::default();
        for base in bases {
            let base = base.as_ref();
            if self.cancel.is_cancelled() {
                tracing::warn!(table = base, "Publish cancelled before table");
                summary.failed.push((base.to_string(), "cancelled".to_string()));
                continue;
            }
            let tables = PublishedTableVersionSet::for_table(self.config, base);
            match self.publish_table(tables).await {
                Ok(outcome) => match outcome.state {
                    PublishState::Published => summary.published.push(outcome.table),
                    PublishState::Skipped => summary.skipped.push(outcome.table),
                    PublishState::Candidate | PublishState::Compared => {
                        summary.pending.extend(outcome.report);
                    }
                },
                Err(err) => {
                    tracing::error!(table = base, error = %err, "Publish failed");
                    summary.failed.push((base.to_string(), err.to_string()));
                }
            }
        }
        tracing::info!(
            published = summary.published.len(),
            skipped = summary.skipped.len(),
            pending = summary.pending.len(),
            failed = summary.failed.len(),
            "Publish run finished"
        );
        summary
    }
}
