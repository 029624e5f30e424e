//! bqharmony - Harmonized BigQuery clinical tables
//!
//! This library provides:
//! - Type sampling of raw string and JSON values
//! - Type resolution to one BigQuery type per column
//! - Schema building for flat extracts and nested records
//! - Field-group planning (stand-alone tables, count columns, flattening)
//! - Query assembly into a typed SQL plan, and SQL emission
//! - Versioned publishing with change detection
//!
//! # Architecture
//!
//! **Noun modules** (data structures):
//! - `types/` - type tags, BigQuery types, schema fields
//! - `config/` - validated build configuration (field-group hierarchy, datasets, release)
//! - `plan/` - SQL plan types (TableSqlPlan, Expr, Column)
//!
//! **Verb modules** (transformations):
//! - `sampler/` - raw value → TypeTag
//! - `resolver/` - observed TypeTags → BqType
//! - `schema/` - sampled rows or records → TableSchema
//! - `planner/` - Config + ProgramFacts → Placements
//! - `assembler/` - Placement → TableSqlPlan
//! - `emitter/` - TableSqlPlan → SQL
//! - `publish/` - built table → published `_current` and versioned tables
//!
//! # Example
//!
//! ```ignore
//! use bqharmony::{assemble_program, Config, FieldGroupForest, load_facts};
//!
//! let config = Config::from_file("clinical.yaml")?;
//! let facts = load_facts("facts.yaml")?;
//! let forest = FieldGroupForest::new(&config);
//! for build in assemble_program(&forest, facts.get("TCGA").unwrap())? {
//!     println!("{}: {}", build.destination, build.sql()?);
//! }
//! ```

pub mod types;
pub mod config;
pub mod plan;
pub mod sampler;
pub mod resolver;
pub mod schema;
pub mod planner;
pub mod assembler;
pub mod emitter;
pub mod publish;
pub mod error;

// Re-export commonly used types
pub use types::{load_descriptions, BqType, FieldMode, SchemaField, TableSchema, TypeTag};
pub use config::{Config, ConfigError, FieldGroupParams, ReleaseTag};
pub use plan::TableSqlPlan;
pub use sampler::{sample_field, sample_str};
pub use resolver::{resolve, ColumnTypes, ResolveError};
pub use schema::{build_flat, FlatSampler, RecordSampler, SchemaError};
pub use planner::{load_facts, plan_program, FieldGroupForest, PlanError, ProgramFacts, ProgramPlan};
pub use assembler::{assemble, assemble_program, AssembleError, TableBuild};
pub use emitter::{emit_sql, EmitError};
pub use publish::{
    ApprovalPolicy, PublishCoordinator, PublishError, PublishSummary, PublishedTableVersionSet, TableId,
    Warehouse, WarehouseError,
};
pub use error::ParseError;
