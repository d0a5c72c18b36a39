mod config;
mod http;

use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use entity::{Employee, EmployeeFilter, NewEmployee};
use platform_api::{ApiSettings, HttpEmployeeApi, InMemoryEmployeeApi};
use platform_obs::{ObsConfig, init_tracing};
use products_hr::{
    AnalyticsView, Notice, Notifier, Roster,
    export::{self, EXPORT_FILE_NAME, TEMPLATE_FILE_NAME},
    reconcile,
};
use tracing::info;

use crate::{
    config::{AppConfig, parse_rows_per_page},
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "employee-console", version, about = "Employee management console")]
struct Cli {
    /// Base URL of the employee API (overrides EMPLOYEE_API_URL).
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Console(ConsoleCommand),
    /// Write the CSV import template.
    Template {
        #[arg(long, short, value_name = "FILE", help = "Destination file, `-` for stdout")]
        output: Option<PathBuf>,
    },
    /// Run a development employee API backed by an in-memory store.
    Serve(ServeCommand),
}

/// Commands that talk to the employee API.
#[derive(Subcommand, Debug)]
enum ConsoleCommand {
    /// List employees, optionally filtered, one page at a time.
    List(ListCommand),
    /// Create an employee.
    Add(EmployeeFields),
    /// Update an existing employee.
    Update {
        #[arg(long)]
        id: i64,
        #[command(flatten)]
        fields: EmployeeFields,
    },
    /// Delete one or more employees.
    Delete {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<i64>,
    },
    /// Import employees from a CSV file (creates and updates).
    Import { file: PathBuf },
    /// Export the (filtered) employee list as CSV.
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, short, value_name = "FILE", help = "Destination file, `-` for stdout")]
        output: Option<PathBuf>,
    },
    /// Department and salary breakdown.
    Analytics {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    #[arg(long, value_name = "ID")]
    id: Option<String>,
    #[arg(long, value_name = "NAME")]
    name: Option<String>,
    #[arg(long, value_name = "DEPARTMENT")]
    department: Option<String>,
    #[arg(long, value_name = "SALARY")]
    salary: Option<String>,
}

impl From<FilterArgs> for EmployeeFilter {
    fn from(value: FilterArgs) -> Self {
        EmployeeFilter {
            id: value.id,
            name: value.name,
            department: value.department,
            salary: value.salary,
        }
    }
}

#[derive(Args, Debug)]
struct ListCommand {
    #[command(flatten)]
    filter: FilterArgs,
    /// Zero-based page index.
    #[arg(long, default_value_t = 0)]
    page: usize,
    #[arg(long, value_parser = rows_per_page_arg)]
    rows_per_page: Option<usize>,
    #[arg(long)]
    json: bool,
}

fn rows_per_page_arg(raw: &str) -> Result<usize, String> {
    parse_rows_per_page(raw).map_err(|err| err.to_string())
}

#[derive(Args, Debug)]
struct EmployeeFields {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    department: String,
    #[arg(long, default_value_t = 0)]
    salary: i64,
}

impl From<EmployeeFields> for NewEmployee {
    fn from(value: EmployeeFields) -> Self {
        NewEmployee {
            name: value.name,
            department: value.department,
            salary: value.salary,
        }
    }
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "127.0.0.1")]
    host: std::net::IpAddr,
    #[arg(long, default_value_t = 5000)]
    port: u16,
    /// CSV file imported into the store before serving.
    #[arg(long, value_name = "FILE")]
    seed: Option<PathBuf>,
}

impl From<&ServeCommand> for ServeConfig {
    fn from(value: &ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

/// Prints notices to stderr so they never mix with CSV on stdout.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        eprintln!("[{}] {}", notice.severity, notice.message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let _obs = init_tracing(ObsConfig {
        env_filter: config.log_filter.clone(),
        otlp_endpoint: config.otlp_endpoint.clone(),
        ..ObsConfig::default()
    })?;

    let mut settings = config.api.clone();
    if let Some(url) = cli.api_url {
        settings.base_url = url;
    }

    match cli.command {
        Command::Serve(cmd) => run_server(cmd, &config).await,
        Command::Template { output } => {
            let csv = export::template_csv()?;
            write_output(output.as_deref(), TEMPLATE_FILE_NAME, &csv)
        }
        Command::Console(command) => run_console(command, &settings, config.rows_per_page).await,
    }
}

async fn run_console(
    command: ConsoleCommand,
    settings: &ApiSettings,
    rows_per_page: usize,
) -> Result<()> {
    let api = HttpEmployeeApi::new(settings).context("failed to build employee api client")?;
    info!(base_url = api.base_url(), "using employee api");
    let mut roster = Roster::new(Arc::new(api), Arc::new(ConsoleNotifier));
    roster.set_rows_per_page(rows_per_page);

    match command {
        ConsoleCommand::List(cmd) => {
            if let Some(rows) = cmd.rows_per_page {
                roster.set_rows_per_page(rows);
            }
            apply_filter(&mut roster, cmd.filter.into()).await?;
            roster.set_page(cmd.page);
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(roster.page_rows())?);
            } else {
                print_page(&roster);
            }
        }
        ConsoleCommand::Add(fields) => {
            let saved = roster.add(fields.into()).await?;
            println!("{}", saved.id);
        }
        ConsoleCommand::Update { id, fields } => {
            let employee = NewEmployee::from(fields).with_id(id);
            roster.edit(employee).await?;
        }
        ConsoleCommand::Delete { ids } => {
            roster.delete(&ids).await?;
        }
        ConsoleCommand::Import { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let outcome = roster.import_csv(&text).await?;
            info!(
                success = outcome.success_count,
                failed = outcome.fail_count,
                skipped = outcome.skipped,
                file = %file.display(),
                "import complete"
            );
        }
        ConsoleCommand::Export { filter, output } => {
            apply_filter(&mut roster, filter.into()).await?;
            let csv = roster.export_csv()?;
            write_output(output.as_deref(), EXPORT_FILE_NAME, &csv)?;
        }
        ConsoleCommand::Analytics { filter, json } => {
            apply_filter(&mut roster, filter.into()).await?;
            let view = roster.analytics();
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_analytics(&view);
            }
        }
    }
    Ok(())
}

async fn apply_filter(
    roster: &mut Roster<HttpEmployeeApi>,
    filter: EmployeeFilter,
) -> Result<usize> {
    let loaded = if filter.is_empty() {
        roster.load(&filter).await?
    } else {
        roster.search(filter).await?
    };
    Ok(loaded)
}

async fn run_server(cmd: ServeCommand, config: &AppConfig) -> Result<()> {
    let store = Arc::new(InMemoryEmployeeApi::new());
    if let Some(path) = &cmd.seed {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        let outcome = reconcile(store.as_ref(), &text).await?;
        info!(
            seeded = outcome.success_count,
            failed = outcome.fail_count,
            "store seeded"
        );
    }
    let state = AppState {
        store,
        cors_allowed_origins: Arc::new(config.cors_allowed_origins.clone()),
    };
    http::serve(ServeConfig::from(&cmd), state).await
}

fn write_output(target: Option<&Path>, default_name: &str, contents: &str) -> Result<()> {
    let target = target.unwrap_or_else(|| Path::new(default_name));
    if target == Path::new("-") {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{contents}")?;
        return Ok(());
    }
    std::fs::write(target, contents)
        .with_context(|| format!("failed to write {}", target.display()))?;
    info!(path = %target.display(), "csv written");
    Ok(())
}

fn print_page<A>(roster: &Roster<A>) {
    let total = roster.employees().len();
    println!("Total Staff: {total}");
    println!("{:>6}  {:<24} {:<16} {:>12}", "ID", "Name", "Department", "Salary");
    for employee in roster.page_rows() {
        print_row(employee);
    }
    println!(
        "page {} of {} ({} per page)",
        roster.page() + 1,
        roster.page_count().max(1),
        roster.rows_per_page()
    );
}

fn print_row(employee: &Employee) {
    println!(
        "{:>6}  {:<24} {:<16} {:>12}",
        employee.id,
        employee.name,
        employee.department_label(),
        employee.salary
    );
}

const BAR_WIDTH: usize = 30;

fn bar(fraction: f64) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn print_analytics(view: &AnalyticsView) {
    println!("Department Breakdown ({} employees)", view.total);
    for slice in &view.departments {
        println!(
            "  {:<16} {} {:>4} ({}%)",
            slice.name,
            bar(slice.percent_of_total / 100.0),
            slice.count,
            slice.percent_of_total.round()
        );
    }
    println!("Salary Distribution");
    for bucket in &view.salary {
        println!(
            "  {:<8} {} {:>4} ({}%)",
            bucket.label,
            bar(bucket.weight()),
            bucket.count,
            bucket.percent_of_total.round()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_flags_parse() {
        let cli = Cli::try_parse_from([
            "employee-console",
            "--api-url",
            "http://hr.local/api",
            "list",
            "--department",
            "IT",
            "--rows-per-page",
            "10",
            "--page",
            "1",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://hr.local/api"));
        let Command::Console(ConsoleCommand::List(cmd)) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(cmd.rows_per_page, Some(10));
        assert_eq!(cmd.page, 1);
        let filter = EmployeeFilter::from(cmd.filter);
        assert_eq!(filter.query_pairs(), vec![("Department", "IT")]);
    }

    #[test]
    fn filter_flags_use_field_names() {
        let cli = Cli::try_parse_from(["employee-console", "list", "--id", "3", "--name", "Asha"])
            .unwrap();
        let Command::Console(ConsoleCommand::List(cmd)) = cli.command else {
            panic!("expected list");
        };
        let filter = EmployeeFilter::from(cmd.filter);
        assert_eq!(filter.query_pairs(), vec![("Id", "3"), ("Name", "Asha")]);

        let cli = Cli::try_parse_from(["employee-console", "analytics", "--salary", "10", "--json"])
            .unwrap();
        let Command::Console(ConsoleCommand::Analytics { filter, json }) = cli.command else {
            panic!("expected analytics");
        };
        assert!(json);
        assert_eq!(EmployeeFilter::from(filter).query_pairs(), vec![("Salary", "10")]);
    }

    #[test]
    fn unsupported_page_size_is_rejected() {
        let parsed = Cli::try_parse_from(["employee-console", "list", "--rows-per-page", "7"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn delete_needs_ids() {
        assert!(Cli::try_parse_from(["employee-console", "delete"]).is_err());
        let cli = Cli::try_parse_from(["employee-console", "delete", "3", "7"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Console(ConsoleCommand::Delete { ids }) if ids == vec![3, 7]
        ));
    }

    #[test]
    fn update_builds_full_record() {
        let cli = Cli::try_parse_from([
            "employee-console",
            "update",
            "--id",
            "7",
            "--name",
            "Asha",
            "--salary",
            "900000",
        ])
        .unwrap();
        let Command::Console(ConsoleCommand::Update { id, fields }) = cli.command else {
            panic!("expected update");
        };
        let employee = NewEmployee::from(fields).with_id(id);
        assert_eq!(employee.id, 7);
        assert_eq!(employee.department, "");
        assert_eq!(employee.salary, 900_000);
    }

    #[test]
    fn template_and_serve_stay_top_level() {
        let cli = Cli::try_parse_from(["employee-console", "template", "-o", "-"]).unwrap();
        assert!(matches!(cli.command, Command::Template { output: Some(_) }));
        let cli = Cli::try_parse_from(["employee-console", "serve", "--port", "0"]).unwrap();
        let Command::Serve(cmd) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(cmd.port, 0);
        assert!(cmd.seed.is_none());
    }

    #[test]
    fn bars_scale_to_width() {
        assert_eq!(bar(0.0), ".".repeat(BAR_WIDTH));
        assert_eq!(bar(1.0), "#".repeat(BAR_WIDTH));
        assert_eq!(bar(0.5).matches('#').count(), BAR_WIDTH / 2);
    }
}
