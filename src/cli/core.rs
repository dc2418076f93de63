//! Shell context, dispatch, and argument helpers shared by the commands.

use std::{io, sync::Arc};

use chrono::{Local, NaiveDate};
use dialoguer::theme::ColorfulTheme;
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use uuid::Uuid;

use crate::advice::{BudgetAdvisor, HeuristicAdvisor};
use crate::config::{Config, ConfigManager};
use crate::core::{LedgerError, LedgerStore};
use crate::domain::{Category, Identifiable, NamedEntity, Payment, YearMonth};
use crate::ledger::CategoryResolver;
use crate::storage::{JsonStorage, LoadReport};

use super::commands;
use super::io as cli_io;

const PROMPT: &str = "flux> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("line editor error: {0}")]
    Readline(#[from] ReadlineError),
    #[error("{0}")]
    Command(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            CommandError::Io(inner) => CliError::Io(inner),
            other => CliError::Command(other.to_string()),
        }
    }
}

pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) store: LedgerStore,
    pub(crate) storage: JsonStorage,
    pub(crate) config: Config,
    pub(crate) advisor: Arc<dyn BudgetAdvisor>,
    pub(crate) theme: ColorfulTheme,
    pub(crate) running: bool,
}

impl ShellContext {
    /// Context wired from the config file in the application directory.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let manager = ConfigManager::new()?;
        let config = manager.load()?;
        let storage = JsonStorage::from_config(&config, manager.base_dir())?;
        Self::with_storage(mode, config, storage)
    }

    pub fn with_storage(
        mode: CliMode,
        config: Config,
        storage: JsonStorage,
    ) -> Result<Self, CliError> {
        let store = LedgerStore::new(Box::new(storage.clone()));
        let report = store.load()?;
        let context = Self {
            mode,
            store,
            storage,
            config,
            advisor: Arc::new(HeuristicAdvisor),
            theme: ColorfulTheme::default(),
            running: true,
        };
        context.report_load(&report);
        Ok(context)
    }

    fn report_load(&self, report: &LoadReport) {
        if report.bootstrapped {
            cli_io::print_info(format!(
                "Created a new ledger at {}.",
                self.storage.path().display()
            ));
        }
        for note in &report.migrations {
            cli_io::print_info(format!("Migrated ledger: {note}."));
        }
        for warning in &report.warnings {
            cli_io::print_warning(warning);
        }
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub(crate) fn prompt(&self) -> String {
        PROMPT.to_string()
    }

    /// Parses and runs one input line, printing command errors.
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CliError> {
        let tokens = match shell_words::split(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                cli_io::print_warning(err);
                return Ok(LoopControl::Continue);
            }
        };
        if tokens.is_empty() {
            return Ok(LoopControl::Continue);
        }

        let raw = &tokens[0];
        let command = raw.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();

        match self.dispatch(&command, raw, &args) {
            Ok(LoopControl::Exit) => {
                self.running = false;
                Ok(LoopControl::Exit)
            }
            Ok(control) => Ok(control),
            Err(err) => {
                self.report_error(err);
                Ok(LoopControl::Continue)
            }
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(spec) = commands::find(command) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        match (spec.handler)(self, args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let mut suggestions: Vec<_> = commands::names()
            .into_iter()
            .map(|name| (levenshtein(name, input), name))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true).map_err(CliError::from)
    }

    /// Asks before destructive commands; scripts always proceed.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, prompt, false)
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(message);
                cli_io::print_hint("Use `help <command>` for usage details.");
            }
            other => cli_io::print_error(other),
        }
    }

    /// Payment addressed by full id, id prefix, or unique case-insensitive name.
    pub(crate) fn find_payment(&self, token: &str) -> Result<Payment, CommandError> {
        let data = self.store.snapshot()?;
        let found = resolve(&data.payments, token)?;
        found
            .cloned()
            .ok_or_else(|| CommandError::InvalidArguments(format!("no payment matches `{token}`")))
    }

    /// Category addressed by case-insensitive name, full id, or id prefix.
    pub(crate) fn find_category(&self, token: &str) -> Result<Category, CommandError> {
        let categories = self.store.categories()?;
        // Names are unique ignoring case, so a name hit is never ambiguous.
        if let Some(category) = CategoryResolver::new(&categories).find_by_name(token) {
            return Ok(category.clone());
        }
        let found = resolve(&categories, token)?;
        found
            .cloned()
            .ok_or_else(|| CommandError::InvalidArguments(format!("no category matches `{token}`")))
    }
}

fn resolve<'a, T: Identifiable + NamedEntity>(
    items: &'a [T],
    token: &str,
) -> Result<Option<&'a T>, CommandError> {
    if let Ok(id) = Uuid::parse_str(token) {
        return Ok(items.iter().find(|item| item.id() == id));
    }

    let needle = token.trim().to_lowercase();
    let by_name: Vec<&T> = items
        .iter()
        .filter(|item| item.name().trim().to_lowercase() == needle)
        .collect();
    let by_prefix: Vec<&T> = items
        .iter()
        .filter(|item| !needle.is_empty() && short_id(item.id()).starts_with(&needle))
        .collect();

    let candidates = if by_name.is_empty() { by_prefix } else { by_name };
    match candidates.as_slice() {
        [] => Ok(None),
        [single] => Ok(Some(*single)),
        _ => Err(CommandError::InvalidArguments(format!(
            "`{token}` is ambiguous; use the id shown in listings"
        ))),
    }
}

pub(crate) fn short_id(id: Uuid) -> String {
    let mut short = id.simple().to_string();
    short.truncate(8);
    short
}

pub(crate) fn current_month() -> YearMonth {
    YearMonth::of(Local::now().date_naive())
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

pub(crate) fn parse_month(input: &str) -> Result<YearMonth, CommandError> {
    input.parse().map_err(|_| {
        CommandError::InvalidArguments(format!("invalid month `{}` (use YYYY-MM)", input))
    })
}

pub(crate) fn month_or_current(arg: Option<&&str>) -> Result<YearMonth, CommandError> {
    arg.map(|value| parse_month(value))
        .unwrap_or_else(|| Ok(current_month()))
}

pub(crate) fn parse_amount(input: &str) -> Result<f64, CommandError> {
    input
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CommandError::InvalidArguments(format!("invalid amount `{}`", input)))
}

pub(crate) fn parse_count(input: &str, what: &str) -> Result<u32, CommandError> {
    input
        .parse::<u32>()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid {what} `{input}`")))
}

#[cfg(test)]
pub(crate) fn process_script(
    storage: JsonStorage,
    lines: &[&str],
) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_storage(CliMode::Script, Config::default(), storage)?;
    for line in lines {
        match app.process_line(line)? {
            LoopControl::Continue => {}
            LoopControl::Exit => break,
        }
    }
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage(temp: &TempDir) -> JsonStorage {
        JsonStorage::new(temp.path().join("data.json"))
    }

    #[test]
    fn resolves_by_name_and_prefix() {
        let categories = vec![Category::new("Food"), Category::new("Rent")];
        let by_name = resolve(&categories, "food").unwrap();
        assert_eq!(by_name.map(|c| c.name.as_str()), Some("Food"));

        let prefix = short_id(categories[1].id);
        let by_prefix = resolve(&categories, &prefix).unwrap();
        assert_eq!(by_prefix.map(|c| c.name.as_str()), Some("Rent"));

        assert!(resolve(&categories, "missing").unwrap().is_none());
    }

    #[test]
    fn categories_resolve_by_name_ignoring_case_and_padding() {
        let temp = TempDir::new().unwrap();
        let app = process_script(storage(&temp), &["add-category \"Eating Out\""]).unwrap();
        let found = app.find_category("  eating out ").unwrap();
        assert_eq!(found.name, "Eating Out");
        let by_prefix = app.find_category(&short_id(found.id)).unwrap();
        assert_eq!(by_prefix.id, found.id);
        assert!(app.find_category("Groceries").is_err());
    }

    #[test]
    fn script_flow_mutates_the_ledger() {
        let temp = TempDir::new().unwrap();
        let app = process_script(
            storage(&temp),
            &[
                "add-category Food",
                "salary 2024-03 2500",
                "add-payment Groceries 120.5 2024-03-05 Food",
                "toggle Groceries paid",
                "exit",
                "add-category Ignored",
            ],
        )
        .unwrap();

        assert!(!app.running);
        let data = app.store().snapshot().unwrap();
        assert_eq!(data.categories.len(), 1);
        assert_eq!(data.payments[0].paid, Some(true));
        assert_eq!(data.payments[0].category_id, Some(data.categories[0].id));
    }

    #[test]
    fn command_errors_do_not_stop_the_shell() {
        let temp = TempDir::new().unwrap();
        let app = process_script(
            storage(&temp),
            &["add-payment Broken -5 2024-01-01", "salary 2024-01 10", "nonsense"],
        )
        .unwrap();
        assert!(app.running);
        let data = app.store().snapshot().unwrap();
        assert!(data.payments.is_empty());
        assert_eq!(data.salary_for("2024-01".parse().unwrap()), 10.0);
    }

    #[test]
    fn parses_arguments() {
        assert!(parse_amount("12.5").is_ok());
        assert!(parse_amount("NaN").is_err());
        assert!(parse_month("2024-13").is_err());
        assert!(parse_date("2024-02-30").is_err());
        assert_eq!(parse_count("3", "installments").unwrap(), 3);
    }
}
