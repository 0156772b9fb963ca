use jobly::JobFilter;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_CONFIG: &str = "jobly.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Jobs,
    JobsList,
    JobsGet,
    JobsCreate,
    JobsUpdate,
    JobsRemove,
    Preview,
    PreviewUpdate,
    PreviewFilter,
    Init,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Jobs(JobsCommand),
    Preview(PreviewCommand),
    Init(InitArgs),
}

/// Options shared by every command that talks to the database.
#[derive(Debug, Clone, PartialEq)]
pub struct DbArgs {
    pub config: PathBuf,
    pub database: Option<String>,
    pub verbose: bool,
}

impl Default for DbArgs {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG),
            database: None,
            verbose: false,
        }
    }
}

impl DbArgs {
    /// Consume `token` if it is a global option.
    fn accept<'a>(
        &mut self,
        token: &'a str,
        it: &mut impl Iterator<Item = &'a str>,
    ) -> anyhow::Result<bool> {
        if let Some(v) = flag_value(token, "--config", it)? {
            self.config = PathBuf::from(v);
        } else if let Some(v) = flag_value(token, "--database", it)? {
            self.database = Some(v.to_string());
        } else if matches!(token, "-v" | "--verbose") {
            self.verbose = true;
        } else {
            return Ok(false);
        }
        Ok(true)
    }
}

#[derive(Debug, Clone)]
pub struct JobsCommand {
    pub db: DbArgs,
    pub action: JobsAction,
}

#[derive(Debug, Clone)]
pub enum JobsAction {
    List(JobsListArgs),
    Get(JobsGetArgs),
    Create(JobsCreateArgs),
    Update(JobsUpdateArgs),
    Remove(JobsRemoveArgs),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterArgs {
    pub title: Option<String>,
    pub min_salary: Option<f64>,
    pub has_equity: bool,
}

impl FilterArgs {
    pub fn to_filter(&self) -> JobFilter {
        JobFilter {
            title: self.title.clone(),
            min_salary: self.min_salary,
            has_equity: self.has_equity.then_some(true),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JobsListArgs {
    pub filter: FilterArgs,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct JobsGetArgs {
    pub id: i32,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct JobsCreateArgs {
    pub title: String,
    pub company: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct JobsUpdateArgs {
    pub id: i32,
    pub data: String,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct JobsRemoveArgs {
    pub id: i32,
}

#[derive(Debug, Clone)]
pub enum PreviewCommand {
    Update(PreviewUpdateArgs),
    Filter(FilterArgs),
}

#[derive(Debug, Clone)]
pub struct PreviewUpdateArgs {
    pub data: String,
    /// `(field, column)` translations in the order given.
    pub columns: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct InitArgs {
    pub config: PathBuf,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" => Ok(Command::Help(HelpTopic::Root)),
        "jobs" => parse_jobs(it.map(|s| s.as_str())),
        "preview" => parse_preview(it.map(|s| s.as_str())),
        "init" => parse_init(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

/// Value of `--name <v>` or `--name=<v>`; `None` when `token` is another argument.
fn flag_value<'a>(
    token: &'a str,
    name: &str,
    it: &mut impl Iterator<Item = &'a str>,
) -> anyhow::Result<Option<&'a str>> {
    if token == name {
        let Some(v) = it.next() else {
            anyhow::bail!("{name} requires a value");
        };
        return Ok(Some(v));
    }
    Ok(token
        .strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('=')))
}

fn parse_number<T: FromStr>(flag: &str, raw: &str) -> anyhow::Result<T> {
    raw.parse::<T>()
        .map_err(|_| anyhow::anyhow!("invalid {flag} value: {raw}"))
}

/// Fail if any option in `seen` is not valid for `cmd`.
fn check_options(cmd: &str, seen: &[&str], allowed: &[&str]) -> anyhow::Result<()> {
    match seen.iter().find(|flag| !allowed.contains(*flag)) {
        Some(flag) => anyhow::bail!("invalid option {flag} for `{cmd}`"),
        None => Ok(()),
    }
}

fn parse_jobs<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut subcmd: Option<&str> = None;
    let mut db = DbArgs::default();

    let mut seen: Vec<&'static str> = Vec::new();
    let mut id: Option<i32> = None;
    let mut title: Option<String> = None;
    let mut company: Option<String> = None;
    let mut salary: Option<i32> = None;
    let mut equity: Option<Decimal> = None;
    let mut min_salary: Option<f64> = None;
    let mut has_equity = false;
    let mut data: Option<String> = None;
    let mut json = false;

    while let Some(token) = it.next() {
        if db.accept(token, &mut it)? {
            continue;
        }
        if let Some(v) = flag_value(token, "--title", &mut it)? {
            seen.push("--title");
            title = Some(v.to_string());
            continue;
        }
        if let Some(v) = flag_value(token, "--company", &mut it)? {
            seen.push("--company");
            company = Some(v.to_string());
            continue;
        }
        if let Some(v) = flag_value(token, "--salary", &mut it)? {
            seen.push("--salary");
            salary = Some(parse_number("--salary", v)?);
            continue;
        }
        if let Some(v) = flag_value(token, "--equity", &mut it)? {
            seen.push("--equity");
            equity = Some(parse_number("--equity", v)?);
            continue;
        }
        if let Some(v) = flag_value(token, "--min-salary", &mut it)? {
            seen.push("--min-salary");
            min_salary = Some(parse_number("--min-salary", v)?);
            continue;
        }
        if let Some(v) = flag_value(token, "--data", &mut it)? {
            seen.push("--data");
            data = Some(v.to_string());
            continue;
        }

        match token {
            "-h" | "--help" => {
                return Ok(Command::Help(match subcmd {
                    None => HelpTopic::Jobs,
                    Some("list") => HelpTopic::JobsList,
                    Some("get") => HelpTopic::JobsGet,
                    Some("create") => HelpTopic::JobsCreate,
                    Some("update") => HelpTopic::JobsUpdate,
                    Some("remove") => HelpTopic::JobsRemove,
                    Some(other) => anyhow::bail!("unknown subcommand: {other}"),
                }));
            }
            "list" | "get" | "create" | "update" | "remove" if subcmd.is_none() => {
                subcmd = Some(token);
            }
            "--has-equity" => {
                seen.push("--has-equity");
                has_equity = true;
            }
            "--json" => {
                seen.push("--json");
                json = true;
            }
            other if other.starts_with('-') && other.parse::<i32>().is_err() => {
                anyhow::bail!("unknown argument: {other}")
            }
            other => {
                if matches!(subcmd, Some("get" | "update" | "remove")) && id.is_none() {
                    id = Some(
                        other
                            .parse::<i32>()
                            .map_err(|_| anyhow::anyhow!("invalid job id: {other}"))?,
                    );
                } else {
                    anyhow::bail!("unexpected positional argument: {other}");
                }
            }
        }
    }

    let action = match subcmd {
        None => return Ok(Command::Help(HelpTopic::Jobs)),
        Some("list") => {
            check_options(
                "jobs list",
                &seen,
                &["--title", "--min-salary", "--has-equity", "--json"],
            )?;
            JobsAction::List(JobsListArgs {
                filter: FilterArgs {
                    title,
                    min_salary,
                    has_equity,
                },
                json,
            })
        }
        Some("get") => {
            check_options("jobs get", &seen, &["--json"])?;
            let Some(id) = id else {
                anyhow::bail!("missing job id: usage `jobly jobs get <ID>`");
            };
            JobsAction::Get(JobsGetArgs { id, json })
        }
        Some("create") => {
            check_options(
                "jobs create",
                &seen,
                &["--title", "--company", "--salary", "--equity", "--json"],
            )?;
            let Some(title) = title else {
                anyhow::bail!("`jobs create` requires --title");
            };
            let Some(company) = company else {
                anyhow::bail!("`jobs create` requires --company");
            };
            JobsAction::Create(JobsCreateArgs {
                title,
                company,
                salary,
                equity,
                json,
            })
        }
        Some("update") => {
            check_options("jobs update", &seen, &["--data", "--json"])?;
            let Some(id) = id else {
                anyhow::bail!("missing job id: usage `jobly jobs update <ID> --data <JSON>`");
            };
            let Some(data) = data else {
                anyhow::bail!("`jobs update` requires --data");
            };
            JobsAction::Update(JobsUpdateArgs { id, data, json })
        }
        Some("remove") => {
            check_options("jobs remove", &seen, &[])?;
            let Some(id) = id else {
                anyhow::bail!("missing job id: usage `jobly jobs remove <ID>`");
            };
            JobsAction::Remove(JobsRemoveArgs { id })
        }
        Some(other) => anyhow::bail!("unknown subcommand: {other}"),
    };

    Ok(Command::Jobs(JobsCommand { db, action }))
}

fn parse_preview<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut subcmd: Option<&str> = None;

    let mut seen: Vec<&'static str> = Vec::new();
    let mut data: Option<String> = None;
    let mut columns: Vec<(String, String)> = Vec::new();
    let mut filter = FilterArgs::default();

    while let Some(token) = it.next() {
        if let Some(v) = flag_value(token, "--data", &mut it)? {
            seen.push("--data");
            data = Some(v.to_string());
            continue;
        }
        if let Some(v) = flag_value(token, "--column", &mut it)? {
            seen.push("--column");
            let Some((field, column)) = v.split_once('=') else {
                anyhow::bail!("invalid --column value: {v} (expected <field>=<column>)");
            };
            if field.is_empty() || column.is_empty() {
                anyhow::bail!("invalid --column value: {v} (expected <field>=<column>)");
            }
            columns.push((field.to_string(), column.to_string()));
            continue;
        }
        if let Some(v) = flag_value(token, "--title", &mut it)? {
            seen.push("--title");
            filter.title = Some(v.to_string());
            continue;
        }
        if let Some(v) = flag_value(token, "--min-salary", &mut it)? {
            seen.push("--min-salary");
            filter.min_salary = Some(parse_number("--min-salary", v)?);
            continue;
        }

        match token {
            "-h" | "--help" => {
                return Ok(Command::Help(match subcmd {
                    None => HelpTopic::Preview,
                    Some("update") => HelpTopic::PreviewUpdate,
                    Some("filter") => HelpTopic::PreviewFilter,
                    Some(other) => anyhow::bail!("unknown subcommand: {other}"),
                }));
            }
            "update" | "filter" if subcmd.is_none() => {
                subcmd = Some(token);
            }
            "--has-equity" => {
                seen.push("--has-equity");
                filter.has_equity = true;
            }
            other if other.starts_with('-') => anyhow::bail!("unknown argument: {other}"),
            other => anyhow::bail!("unexpected positional argument: {other}"),
        }
    }

    let cmd = match subcmd {
        None => return Ok(Command::Help(HelpTopic::Preview)),
        Some("update") => {
            check_options("preview update", &seen, &["--data", "--column"])?;
            let Some(data) = data else {
                anyhow::bail!("`preview update` requires --data");
            };
            PreviewCommand::Update(PreviewUpdateArgs { data, columns })
        }
        Some("filter") => {
            check_options(
                "preview filter",
                &seen,
                &["--title", "--min-salary", "--has-equity"],
            )?;
            PreviewCommand::Filter(filter)
        }
        Some(other) => anyhow::bail!("unknown subcommand: {other}"),
    };

    Ok(Command::Preview(cmd))
}

fn parse_init<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);

    while let Some(token) = it.next() {
        if let Some(v) = flag_value(token, "--config", &mut it)? {
            config = PathBuf::from(v);
            continue;
        }
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Init)),
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Init(InitArgs { config }))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
jobly - job postings on PostgreSQL

USAGE:
  jobly <COMMAND> [OPTIONS]

COMMANDS:
  jobs          List, show, create, update and remove jobs
  preview       Print the SQL a partial update or filter would run
  init          Write a starter config file

Run `jobly <command> --help` for more."
            );
        }
        HelpTopic::Jobs => {
            println!(
                "\
USAGE:
  jobly jobs list [OPTIONS]
  jobly jobs get <ID> [OPTIONS]
  jobly jobs create --title <T> --company <HANDLE> [OPTIONS]
  jobly jobs update <ID> --data <JSON> [OPTIONS]
  jobly jobs remove <ID> [OPTIONS]

GLOBAL OPTIONS:
  --config <FILE>       Config file path (default: jobly.toml)
  --database <URL>      Override database.url from config
  -v, --verbose         Log every SQL statement
  -h, --help            Print help

Run `jobly jobs <subcommand> --help` for more."
            );
        }
        HelpTopic::JobsList => {
            println!(
                "\
USAGE:
  jobly jobs list [OPTIONS]

OPTIONS:
  --title <TEXT>        Case-insensitive substring of the title
  --min-salary <N>      Minimum salary (inclusive)
  --has-equity          Only jobs offering equity
  --json                Print JSON instead of a table
  --config <FILE>       Config file path (default: jobly.toml)
  --database <URL>      Override database.url from config
  -v, --verbose         Log every SQL statement
  -h, --help            Print help"
            );
        }
        HelpTopic::JobsGet => {
            println!(
                "\
USAGE:
  jobly jobs get <ID> [OPTIONS]

OPTIONS:
  --json                Print JSON instead of a table
  --config <FILE>       Config file path (default: jobly.toml)
  --database <URL>      Override database.url from config
  -v, --verbose         Log every SQL statement
  -h, --help            Print help"
            );
        }
        HelpTopic::JobsCreate => {
            println!(
                "\
USAGE:
  jobly jobs create --title <T> --company <HANDLE> [OPTIONS]

OPTIONS:
  --title <T>           Job title (required)
  --company <HANDLE>    Owning company handle (required)
  --salary <N>          Salary, non-negative integer
  --equity <D>          Equity fraction between 0 and 1
  --json                Print JSON instead of a table
  --config <FILE>       Config file path (default: jobly.toml)
  --database <URL>      Override database.url from config
  -v, --verbose         Log every SQL statement
  -h, --help            Print help"
            );
        }
        HelpTopic::JobsUpdate => {
            println!(
                "\
USAGE:
  jobly jobs update <ID> --data <JSON> [OPTIONS]

NOTES:
  <JSON> is an object with any of: title, salary, equity.
  A null value clears the column.

OPTIONS:
  --data <JSON>         Fields to change (required)
  --json                Print JSON instead of a table
  --config <FILE>       Config file path (default: jobly.toml)
  --database <URL>      Override database.url from config
  -v, --verbose         Log every SQL statement
  -h, --help            Print help"
            );
        }
        HelpTopic::JobsRemove => {
            println!(
                "\
USAGE:
  jobly jobs remove <ID> [OPTIONS]

OPTIONS:
  --config <FILE>       Config file path (default: jobly.toml)
  --database <URL>      Override database.url from config
  -v, --verbose         Log every SQL statement
  -h, --help            Print help"
            );
        }
        HelpTopic::Preview => {
            println!(
                "\
USAGE:
  jobly preview update --data <JSON> [--column <FIELD>=<COLUMN>...]
  jobly preview filter [OPTIONS]

SUBCOMMANDS:
  update        Print the SET fragment and its parameters
  filter        Print the WHERE fragment and its parameters

Preview never connects to the database."
            );
        }
        HelpTopic::PreviewUpdate => {
            println!(
                "\
USAGE:
  jobly preview update --data <JSON> [OPTIONS]

OPTIONS:
  --data <JSON>                 Update object (required)
  --column <FIELD>=<COLUMN>     Translate a field to a column (repeatable)
  -h, --help                    Print help"
            );
        }
        HelpTopic::PreviewFilter => {
            println!(
                "\
USAGE:
  jobly preview filter [OPTIONS]

OPTIONS:
  --title <TEXT>        Case-insensitive substring of the title
  --min-salary <N>      Minimum salary (inclusive)
  --has-equity          Only jobs offering equity
  -h, --help            Print help"
            );
        }
        HelpTopic::Init => {
            println!(
                "\
USAGE:
  jobly init [OPTIONS]

OPTIONS:
  --config <FILE>       Output config path (default: jobly.toml)
  -h, --help            Print help"
            );
        }
    }
}
