//! Input loops for both modes and the ledger-aware line editor helper.

use std::{
    borrow::Cow,
    collections::BTreeSet,
    io::{self, BufRead},
};

use colored::Colorize;
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use crate::cli::commands::{self, ArgKind, EDIT_FIELDS};
use crate::cli::core::{current_month, CliError, CliMode, LoopControl, ShellContext};
use crate::cli::output;
use crate::domain::{AppData, YearMonth};

/// Set to run commands from stdin without prompts or colors.
pub const SCRIPT_ENV: &str = "FLUX_TRACKER_CLI_SCRIPT";

type LedgerEditor = Editor<LedgerHelper, DefaultHistory>;

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        colored::control::set_override(false);
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = LedgerEditor::new()?;
    editor.set_helper(Some(LedgerHelper::default()));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
    refresh_completions(&mut editor, context);

    while context.running {
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();
                if context.process_line(trimmed)? == LoopControl::Exit {
                    break;
                }
                refresh_completions(&mut editor, context);
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    for line in io::stdin().lock().lines() {
        if context.process_line(&line?)? == LoopControl::Exit || !context.running {
            break;
        }
    }
    Ok(())
}

/// Reloads payment, category and month names after each command.
fn refresh_completions(editor: &mut LedgerEditor, context: &ShellContext) {
    // On a failed load the previous names stay; the next command reports the error.
    let Ok(data) = context.store().snapshot() else {
        return;
    };
    if let Some(helper) = editor.helper_mut() {
        helper.vocabulary = Vocabulary::from_ledger(&data, current_month());
    }
}

/// Names offered as completions after the command word.
#[derive(Debug, Default, Clone, PartialEq)]
struct Vocabulary {
    payments: Vec<String>,
    categories: Vec<String>,
    months: Vec<String>,
}

impl Vocabulary {
    fn from_ledger(data: &AppData, current: YearMonth) -> Self {
        let payments: BTreeSet<String> = data.payments.iter().map(|p| p.name.clone()).collect();
        let categories: BTreeSet<String> =
            data.categories.iter().map(|c| c.name.clone()).collect();
        let mut months: BTreeSet<YearMonth> = data.monthly_salaries.keys().copied().collect();
        months.extend(data.payments.iter().map(|p| YearMonth::of(p.date)));
        months.extend([current.previous(), current, current.next()]);

        Self {
            payments: payments.into_iter().collect(),
            categories: categories.into_iter().collect(),
            months: months.iter().map(YearMonth::to_string).collect(),
        }
    }

    fn options(&self, kind: ArgKind) -> Vec<String> {
        match kind {
            ArgKind::Payment => self.payments.clone(),
            ArgKind::Category => self.categories.clone(),
            ArgKind::Month => self.months.clone(),
            ArgKind::PaidState => vec!["paid".to_string(), "unpaid".to_string()],
            ArgKind::Field => EDIT_FIELDS.iter().map(|field| field.to_string()).collect(),
            ArgKind::Command => commands::names().into_iter().map(String::from).collect(),
            ArgKind::Free => Vec::new(),
        }
    }
}

#[derive(Default)]
struct LedgerHelper {
    vocabulary: Vocabulary,
}

impl LedgerHelper {
    /// Start of the word under the cursor and the words that may replace it.
    fn complete_at(&self, line: &str, pos: usize) -> (usize, Vec<Pair>) {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let needle = prefix[start..].to_lowercase();

        // An open quote before the cursor leaves nothing sensible to offer.
        let Ok(words) = shell_words::split(&prefix[..start]) else {
            return (start, Vec::new());
        };
        let options = match words.split_first() {
            None => commands::names().into_iter().map(String::from).collect(),
            Some((command, args)) => match commands::find(&command.to_lowercase()) {
                Some(spec) => self.vocabulary.options(spec.arg_kind(args.len())),
                None => Vec::new(),
            },
        };

        let pairs = options
            .into_iter()
            .filter(|option| option.to_lowercase().starts_with(&needle))
            .map(|option| Pair {
                replacement: quote_word(&option),
                display: option,
            })
            .collect();
        (start, pairs)
    }

    /// Argument synopsis shown once a bare command word is followed by a space.
    fn usage_hint(&self, line: &str, pos: usize) -> Option<String> {
        if pos < line.len() || !line.ends_with(' ') {
            return None;
        }
        let mut words = line.split_whitespace();
        let command = words.next()?;
        if words.next().is_some() {
            return None;
        }
        let spec = commands::find(&command.to_lowercase())?;
        let rest = spec.usage.strip_prefix(spec.name)?.trim_start();
        (!rest.is_empty()).then(|| rest.to_string())
    }
}

fn quote_word(word: &str) -> String {
    if word
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | '\\'))
    {
        shell_words::quote(word).into_owned()
    } else {
        word.to_string()
    }
}

impl Helper for LedgerHelper {}

impl Completer for LedgerHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.complete_at(line, pos))
    }
}

impl Hinter for LedgerHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &ReadlineContext<'_>) -> Option<String> {
        self.usage_hint(line, pos)
    }
}

impl Highlighter for LedgerHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.dimmed().to_string())
    }
}

impl Validator for LedgerHelper {}
