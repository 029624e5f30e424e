use anyhow::{bail, Context};
use bqharmony::planner::stats::{multi_row_query, non_null_columns_query};
use bqharmony::{
    assemble_program, load_descriptions, load_facts, Config, FieldGroupForest, FlatSampler, RecordSampler,
    TableSchema,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

mod logging;

#[derive(Parser)]
#[command(name = "bqharmony")]
#[command(about = "Infer BigQuery schemas and build harmonized clinical tables")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer a BigQuery schema from a data extract
    Schema {
        /// Extract to sample
        #[arg(long)]
        input: PathBuf,

        /// Input format (defaults to the file extension)
        #[arg(long, value_enum)]
        format: Option<InputFormat>,

        /// Stop after this many rows or records
        #[arg(long)]
        max_rows: Option<usize>,

        /// JSON object of field descriptions keyed by dotted path
        #[arg(long)]
        descriptions: Option<PathBuf>,
    },
    /// Plan and print the SQL for each stand-alone table of a program
    Plan {
        /// Build configuration YAML
        #[arg(long)]
        config: PathBuf,

        /// Program facts YAML/JSON
        #[arg(long)]
        facts: PathBuf,

        /// Only this program (default: every program in the facts file)
        #[arg(long)]
        program: Option<String>,
    },
    /// Print the queries that gather a program's facts
    StatsSql {
        /// Build configuration YAML
        #[arg(long)]
        config: PathBuf,

        #[arg(long)]
        program: String,

        /// Directory of `<table>.json` schemas; enables the non-null column queries
        #[arg(long)]
        schema_dir: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InputFormat {
    Jsonl,
    Tsv,
    Csv,
}

impl InputFormat {
    fn from_path(path: &Path) -> anyhow::Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("jsonl") | Some("ndjson") | Some("json") => Ok(InputFormat::Jsonl),
            Some("tsv") | Some("txt") => Ok(InputFormat::Tsv),
            Some("csv") => Ok(InputFormat::Csv),
            _ => bail!("Cannot infer format of {}, pass --format", path.display()),
        }
    }
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let args = Args::parse();

    match args.command {
        Commands::Schema {
            input,
            format,
            max_rows,
            descriptions,
        } => {
            let format = match format {
                Some(format) => format,
                None => InputFormat::from_path(&input)?,
            };
            let mut schema = infer_schema(&input, format, max_rows.unwrap_or(usize::MAX))?;
            if let Some(path) = descriptions {
                let descriptions = load_descriptions(&path)
                    .with_context(|| format!("loading descriptions {}", path.display()))?;
                let described = schema.apply_descriptions(&descriptions);
                if described < descriptions.len() {
                    tracing::warn!(
                        unused = descriptions.len() - described,
                        "Some descriptions match no field"
                    );
                }
            }
            println!("{}", schema.to_json_pretty()?);
        }
        Commands::Plan { config, facts, program } => {
            let config = Config::from_file(&config)
                .with_context(|| format!("loading config {}", config.display()))?;
            let facts = load_facts(&facts).with_context(|| format!("loading facts {}", facts.display()))?;
            let forest = FieldGroupForest::new(&config);

            let programs: Vec<_> = match &program {
                Some(name) => vec![facts
                    .get(name)
                    .with_context(|| format!("no facts for program {name}"))?],
                None => facts.programs.iter().collect(),
            };
            for program_facts in programs {
                for build in assemble_program(&forest, program_facts)? {
                    println!("-- {} ({})", build.destination, build.field_group);
                    println!("{};\n", build.sql()?);
                }
            }
        }
        Commands::StatsSql { config, program, schema_dir } => {
            let config = Config::from_file(&config)
                .with_context(|| format!("loading config {}", config.display()))?;
            let forest = FieldGroupForest::new(&config);

            for field_group in forest.bfs_order() {
                if let Some(sql) = multi_row_query(&forest, field_group, &program)? {
                    println!("-- {field_group}: max rows per parent\n{sql};\n");
                }
                let Some(dir) = &schema_dir else { continue };
                let table = forest
                    .params(field_group)
                    .map(|p| p.table_name(field_group))
                    .unwrap_or(field_group);
                let path = dir.join(format!("{table}.json"));
                if !path.exists() {
                    tracing::warn!(field_group, path = %path.display(), "No schema, skipping non-null query");
                    continue;
                }
                let schema = TableSchema::from_file(&path)?;
                let columns: Vec<String> = schema.fields.iter().map(|f| f.name.clone()).collect();
                let sql = non_null_columns_query(&forest, field_group, &program, &columns)?;
                println!("-- {field_group}: non-null columns\n{sql};\n");
            }
        }
    }

    Ok(())
}

fn infer_schema(input: &Path, format: InputFormat, max_rows: usize) -> anyhow::Result<TableSchema> {
    let file = File::open(input).with_context(|| format!("opening {}", input.display()))?;

    let schema = match format {
        InputFormat::Jsonl => {
            let mut sampler = RecordSampler::new();
            for (i, line) in BufReader::new(file).lines().take(max_rows).enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let record: serde_json::Value =
                    serde_json::from_str(&line).with_context(|| format!("line {}", i + 1))?;
                sampler.observe(&record)?;
            }
            tracing::info!(records = sampler.records_sampled(), "Sampled records");
            sampler.finish()?
        }
        InputFormat::Tsv | InputFormat::Csv => {
            let delimiter = if matches!(format, InputFormat::Tsv) { b'\t' } else { b',' };
            let mut reader = csv::ReaderBuilder::new()
                .delimiter(delimiter)
                .flexible(true)
                .from_reader(file);
            let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
            let mut sampler = FlatSampler::new(headers);
            for record in reader.records().take(max_rows) {
                let record = record?;
                let cells: Vec<&str> = record.iter().collect();
                sampler.observe_row(&cells)?;
            }
            tracing::info!(rows = sampler.rows_sampled(), "Sampled rows");
            sampler.finish()?
        }
    };
    Ok(schema)
}
