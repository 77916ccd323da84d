//! Resource Console CLI
//!
//! Command-line interface for browsing and editing backend resources.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use resource_console::{
    inline_choices, language_filtered_view, load_record, normalize, read_only_view,
    selectable_choices, validate_for_submit, writable_view, ClientConfig, ClientError, Failure,
    InputError, Language, Record, ResourceClient, UpdateStrategy, ValidateError,
    DEFAULT_TIMEOUT_MS,
};
use serde::Serialize;
use serde_json::{json, Map, Value};

const LOG_LEVEL_ENV_VAR: &str = "CONSOLE_LOG";
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Parser)]
#[command(name = "resource-console")]
#[command(about = "Browse and edit schema-driven backend resources")]
#[command(version)]
struct Cli {
    /// Backend base URL (e.g. http://localhost:8000)
    #[arg(long, env = "CONSOLE_API_URL")]
    base_url: String,

    /// Request timeout in milliseconds
    #[arg(long, env = "CONSOLE_API_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,

    /// How edited records are sent back: replace (PUT) or patch (PATCH)
    #[arg(long, env = "CONSOLE_UPDATE_STRATEGY", default_value = "replace")]
    update_strategy: UpdateStrategy,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the records of a resource
    List {
        resource: String,

        /// Query parameter as key=value (repeatable)
        #[arg(long, short, value_parser = parse_query_pair)]
        query: Vec<(String, String)>,

        /// Print summary rows (id, title, timestamps) sorted by title
        #[arg(long)]
        summary: bool,
    },

    /// Fetch one record (prints null for an empty id)
    Get { resource: String, id: String },

    /// Create a record from a JSON file
    Create { resource: String, record: PathBuf },

    /// Send an edited record from a JSON file back to the backend
    Update { resource: String, record: PathBuf },

    /// Delete a record
    Delete { resource: String, id: String },

    /// Print a resource's schema, or one view of it
    Schema {
        resource: String,

        /// Which part of the schema to print
        #[arg(long, value_enum, default_value_t = SchemaView::Full)]
        view: SchemaView,

        /// Base name of a field translated into per-language variants (repeatable)
        #[arg(long)]
        translated: Vec<String>,

        /// Language variant to keep for translated fields
        #[arg(long, default_value = "ko")]
        language: Language,
    },

    /// List the selectable values that reference a resource's records
    EnumValues { resource: String },

    /// Print everything an editor form needs for a resource (and record)
    Form { resource: String, id: Option<String> },

    /// Validate a record file against the writable view of a resource's schema
    Validate { resource: String, record: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SchemaView {
    Full,
    Writable,
    ReadOnly,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().filter_or(LOG_LEVEL_ENV_VAR, DEFAULT_LOG_LEVEL))
        .init();

    let cli = Cli::parse();
    let config =
        ClientConfig::new(cli.base_url, cli.timeout_ms).update_strategy(cli.update_strategy);
    let out = Output { pretty: cli.pretty };

    let result = ResourceClient::new(&config)
        .map_err(report_client_error)
        .and_then(|client| run(&client, cli.command, &out));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run(client: &ResourceClient, command: Commands, out: &Output) -> Result<(), u8> {
    match command {
        Commands::List {
            resource,
            query,
            summary,
        } => {
            if summary {
                let rows = client
                    .list_summaries(&resource, &query)
                    .map_err(report_client_error)?;
                out.print(&rows)
            } else {
                let records = client.list(&resource, &query).map_err(report_client_error)?;
                out.print(&records)
            }
        }
        Commands::Get { resource, id } => {
            let record = client.retrieve(&resource, &id).map_err(report_client_error)?;
            out.print(&record)
        }
        Commands::Create { resource, record } => {
            let data = load_record(&record).map_err(report_input_error)?;
            let created = client.create(&resource, &data).map_err(report_client_error)?;
            out.print(&created)
        }
        Commands::Update { resource, record } => {
            let data = load_record(&record).map_err(report_input_error)?;
            let updated = client.update(&resource, &data).map_err(report_client_error)?;
            out.print(&updated)
        }
        Commands::Delete { resource, id } => {
            client.remove(&resource, &id).map_err(report_client_error)?;
            out.print(&json!({ "deleted": id }))
        }
        Commands::Schema {
            resource,
            view,
            translated,
            language,
        } => run_schema(client, &resource, view, &translated, language, out),
        Commands::EnumValues { resource } => {
            let values = client
                .fetch_selectable_enum_values(&resource)
                .map_err(report_client_error)?;
            out.print(&values)
        }
        Commands::Form { resource, id } => run_form(client, &resource, id, out),
        Commands::Validate { resource, record } => run_validate(client, &resource, &record, out),
    }
}

fn run_schema(
    client: &ResourceClient,
    resource: &str,
    view: SchemaView,
    translated: &[String],
    language: Language,
    out: &Output,
) -> Result<(), u8> {
    let definition = client.fetch_schema(resource).map_err(report_client_error)?;
    let schema = language_filtered_view(&definition.schema, translated, language);

    match view {
        SchemaView::Full => out.print(&json!({
            "schema": schema,
            "ui_schema": definition.ui_schema,
        })),
        SchemaView::Writable => out.print(&writable_view(&schema)),
        SchemaView::ReadOnly => out.print(&read_only_view(&schema)),
    }
}

/// Fetch the schema and the record concurrently, then the choices of every
/// foreign-key field concurrently. Writable fields with inline `oneOf`
/// constants get their choices from the schema itself.
fn run_form(
    client: &ResourceClient,
    resource: &str,
    id: Option<String>,
    out: &Output,
) -> Result<(), u8> {
    let id = id.unwrap_or_default();
    let (definition, record) = thread::scope(|s| {
        let definition = s.spawn(|| client.fetch_schema(resource));
        let record = s.spawn(|| client.retrieve(resource, &id));
        (joined(definition.join()), joined(record.join()))
    });
    let definition = definition.map_err(report_client_error)?;
    let record = record.map_err(report_client_error)?;

    for path in definition.orphan_ui_fields() {
        log::warn!("ui schema field {} is not in the {} schema", path, resource);
    }

    let foreign_keys = definition.foreign_key_fields();
    let fetched: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = foreign_keys
            .iter()
            .map(|fk| s.spawn(move || client.fetch_selectable_enum_values(&fk.resource)))
            .collect();
        handles.into_iter().map(|h| joined(h.join())).collect()
    });

    let mut choices = Map::new();
    for (fk, values) in foreign_keys.iter().zip(fetched) {
        let values = values.map_err(report_client_error)?;
        let field_schema = definition.field_schema(&fk.field).unwrap_or(&Value::Null);
        let options = selectable_choices(field_schema, values);
        choices.insert(fk.field.clone(), json!(options));
    }

    let writable = writable_view(&definition.schema);
    if let Some(props) = writable["properties"].as_object() {
        for (field, field_schema) in props {
            let inline = inline_choices(field_schema);
            if !inline.is_empty() && !choices.contains_key(field) {
                let options = selectable_choices(field_schema, inline);
                choices.insert(field.clone(), json!(options));
            }
        }
    }

    let read_only = read_only_view(&definition.schema);
    let values = read_only_values(&read_only, record.as_ref());

    out.print(&json!({
        "writable": writable,
        "read_only": read_only,
        "ui_schema": definition.ui_schema,
        "record": record,
        "values": values,
        "choices": choices,
    }))
}

fn run_validate(
    client: &ResourceClient,
    resource: &str,
    record_path: &Path,
    out: &Output,
) -> Result<(), u8> {
    let record = load_record(record_path).map_err(report_input_error)?;
    let definition = client.fetch_schema(resource).map_err(report_client_error)?;

    match validate_for_submit(&definition, &record) {
        Ok(()) => out.print(&json!({ "valid": true })),
        Err(ValidateError::Invalid { errors }) => {
            out.print(&json!({ "valid": false, "errors": errors }))?;
            Err(1)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(e.exit_code() as u8)
        }
    }
}

/// Values of the read-only fields of a record, for the summary table.
fn read_only_values(read_only: &Value, record: Option<&Record>) -> Record {
    let (Some(record), Some(props)) = (record, read_only["properties"].as_object()) else {
        return Record::new();
    };
    props
        .keys()
        .filter_map(|key| record.get(key).map(|v| (key.clone(), v.clone())))
        .collect()
}

/// Flatten a scoped thread join, turning a panic into a client error.
fn joined<T>(result: thread::Result<Result<T, ClientError>>) -> Result<T, ClientError> {
    result.unwrap_or_else(|_| {
        Err(normalize(&Failure::Fault {
            kind: Some("worker_panic".into()),
            message: "a concurrent request panicked".into(),
        }))
    })
}

fn parse_query_pair(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid query \"{}\": expected key=value", s))?;
    if key.is_empty() {
        return Err(format!("invalid query \"{}\": empty key", s));
    }
    Ok((key.to_string(), value.to_string()))
}

struct Output {
    pretty: bool,
}

impl Output {
    fn print<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), u8> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
        .map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", rendered);
        Ok(())
    }
}

/// Print a client failure as its structured JSON report.
fn report_client_error(err: ClientError) -> u8 {
    eprintln!("{}", err.to_json());
    err.exit_code() as u8
}

fn report_input_error(err: InputError) -> u8 {
    eprintln!("Error: {}", err);
    err.exit_code() as u8
}
