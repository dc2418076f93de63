//! Command table and handlers for the shell.

use crate::advice::{request_advice, AdviceOutcome};
use crate::domain::{Displayable, PaymentDraft, PaymentPatch, Recurrence};
use crate::ledger::{recurrence, DEFAULT_TIMELINE_SPAN};

use super::core::{
    month_or_current, parse_amount, parse_count, parse_date, parse_month, short_id, CommandError,
    CommandResult, ShellContext,
};
use super::io as cli_io;
use super::output;

/// What a positional argument refers to, used for completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArgKind {
    Free,
    Month,
    Payment,
    Category,
    PaidState,
    /// `field=value` pairs; repeats for every remaining argument.
    Field,
    Command,
}

pub(crate) const EDIT_FIELDS: &[&str] = &[
    "name=",
    "amount=",
    "date=",
    "description=",
    "category=",
    "installments=",
    "recurring=",
];

pub(crate) struct CommandSpec {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
    pub handler: fn(&mut ShellContext, &[&str]) -> CommandResult,
    pub args: &'static [ArgKind],
}

impl CommandSpec {
    /// Kind of the argument at `index` (0 is the first argument after the command).
    pub(crate) fn arg_kind(&self, index: usize) -> ArgKind {
        match self.args.get(index) {
            Some(kind) => *kind,
            None if self.args.last() == Some(&ArgKind::Field) => ArgKind::Field,
            None => ArgKind::Free,
        }
    }
}

pub(crate) const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "month",
        usage: "month [YYYY-MM]",
        summary: "List payments due in a month",
        handler: cmd_month,
        args: &[ArgKind::Month],
    },
    CommandSpec {
        name: "summary",
        usage: "summary [YYYY-MM]",
        summary: "Show income, paid and unpaid totals for a month",
        handler: cmd_summary,
        args: &[ArgKind::Month],
    },
    CommandSpec {
        name: "timeline",
        usage: "timeline [YYYY-MM] [before] [after]",
        summary: "Show totals for the months around a month",
        handler: cmd_timeline,
        args: &[ArgKind::Month],
    },
    CommandSpec {
        name: "schedule",
        usage: "schedule <payment>",
        summary: "List every installment of a payment",
        handler: cmd_schedule,
        args: &[ArgKind::Payment],
    },
    CommandSpec {
        name: "salary",
        usage: "salary [YYYY-MM] [amount]",
        summary: "Show or set the salary of a month",
        handler: cmd_salary,
        args: &[ArgKind::Month],
    },
    CommandSpec {
        name: "add-payment",
        usage: "add-payment <name> <amount> <YYYY-MM-DD> [category] [description]",
        summary: "Add a one-time payment",
        handler: cmd_add_payment,
        args: &[ArgKind::Free, ArgKind::Free, ArgKind::Free, ArgKind::Category],
    },
    CommandSpec {
        name: "add-recurring",
        usage: "add-recurring <name> <amount> <YYYY-MM-DD> <installments> [category] [description]",
        summary: "Add a monthly installment payment",
        handler: cmd_add_recurring,
        args: &[ArgKind::Free, ArgKind::Free, ArgKind::Free, ArgKind::Free, ArgKind::Category],
    },
    CommandSpec {
        name: "edit-payment",
        usage: "edit-payment <payment> <field=value>...",
        summary: "Edit name, amount, date, description, category, installments or recurring",
        handler: cmd_edit_payment,
        args: &[ArgKind::Payment, ArgKind::Field],
    },
    CommandSpec {
        name: "delete-payment",
        usage: "delete-payment <payment>",
        summary: "Delete a payment and all of its installments",
        handler: cmd_delete_payment,
        args: &[ArgKind::Payment],
    },
    CommandSpec {
        name: "toggle",
        usage: "toggle <payment> [YYYY-MM-DD] [paid|unpaid]",
        summary: "Mark a payment, or one installment, paid or unpaid",
        handler: cmd_toggle,
        args: &[ArgKind::Payment, ArgKind::Free, ArgKind::PaidState],
    },
    CommandSpec {
        name: "categories",
        usage: "categories",
        summary: "List categories",
        handler: cmd_categories,
        args: &[],
    },
    CommandSpec {
        name: "add-category",
        usage: "add-category <name>",
        summary: "Create a category",
        handler: cmd_add_category,
        args: &[],
    },
    CommandSpec {
        name: "rename-category",
        usage: "rename-category <category> <new name>",
        summary: "Rename a category",
        handler: cmd_rename_category,
        args: &[ArgKind::Category],
    },
    CommandSpec {
        name: "delete-category",
        usage: "delete-category <category>",
        summary: "Delete a category, leaving its payments uncategorized",
        handler: cmd_delete_category,
        args: &[ArgKind::Category],
    },
    CommandSpec {
        name: "advice",
        usage: "advice [YYYY-MM]",
        summary: "Ask for budget suggestions for a month",
        handler: cmd_advice,
        args: &[ArgKind::Month],
    },
    CommandSpec {
        name: "backups",
        usage: "backups",
        summary: "List document backups, newest first",
        handler: cmd_backups,
        args: &[],
    },
    CommandSpec {
        name: "help",
        usage: "help [command]",
        summary: "Show commands or the usage of one command",
        handler: cmd_help,
        args: &[ArgKind::Command],
    },
    CommandSpec {
        name: "exit",
        usage: "exit",
        summary: "Leave the shell",
        handler: cmd_exit,
        args: &[],
    },
];

pub(crate) fn names() -> Vec<&'static str> {
    COMMANDS.iter().map(|spec| spec.name).collect()
}

pub(crate) fn find(name: &str) -> Option<&'static CommandSpec> {
    let name = if name == "quit" { "exit" } else { name };
    COMMANDS.iter().find(|spec| spec.name == name)
}

fn usage_error(name: &str) -> CommandError {
    let usage = find(name).map(|spec| spec.usage).unwrap_or(name);
    CommandError::InvalidArguments(format!("usage: {usage}"))
}

fn cmd_month(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let month = month_or_current(args.first())?;
    let entries = ctx.store.display_payments_for_month(month)?;
    output::section(month.label());
    if entries.is_empty() {
        cli_io::print_info(format!("No payments due in {month}."));
        return Ok(());
    }
    for entry in &entries {
        output::line(output::payment_row(entry, &short_id(entry.payment.id)));
    }
    Ok(())
}

fn cmd_summary(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let month = month_or_current(args.first())?;
    let summary = ctx.store.month_summary(month)?;
    output::section(format!("Summary for {}", month.label()));
    for line in output::summary_lines(&summary) {
        output::line(line);
    }
    if summary.is_over_budget() {
        cli_io::print_warning("Expenses exceed income this month.");
    }
    Ok(())
}

fn cmd_timeline(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let center = month_or_current(args.first())?;
    let before = match args.get(1) {
        Some(value) => parse_count(value, "month count")?,
        None => DEFAULT_TIMELINE_SPAN,
    };
    let after = match args.get(2) {
        Some(value) => parse_count(value, "month count")?,
        None => DEFAULT_TIMELINE_SPAN,
    };
    output::section(format!("Timeline around {}", center.label()));
    for overview in ctx.store.timeline(center, before, after)? {
        let marker = if overview.month == center { "*" } else { " " };
        output::line(format!(
            "{marker} {}  income {:>10}  expenses {:>10}  payments {}",
            overview.month,
            output::format_amount(overview.income),
            output::format_amount(overview.total_expenses),
            overview.payments.len()
        ));
    }
    Ok(())
}

fn cmd_schedule(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [token] = args else {
        return Err(usage_error("schedule"));
    };
    let payment = ctx.find_payment(token)?;
    let dates = recurrence::schedule(&payment);
    output::section(format!("Schedule for `{}`", payment.name));
    if dates.is_empty() {
        output::line(format!(
            "one-time  {}  {:>10}  {}",
            payment.date,
            output::format_amount(payment.amount),
            output::paid_marker(payment.paid.unwrap_or(false))
        ));
        return Ok(());
    }
    let total = dates.len();
    output::line(format!(
        "{}, final installment in {}",
        payment.display_label(),
        recurrence::last_month(&payment).label()
    ));
    for (index, date) in dates.into_iter().enumerate() {
        output::line(format!(
            "{:>3}/{total}  {date}  {:>10}  {}",
            index + 1,
            output::format_amount(payment.amount),
            output::paid_marker(payment.is_installment_paid(date))
        ));
    }
    Ok(())
}

fn cmd_salary(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | [_] => {
            let month = month_or_current(args.first())?;
            let amount = ctx.store.salary_for_month(month)?;
            cli_io::print_info(format!(
                "Salary for {month}: {}",
                output::format_amount(amount)
            ));
            Ok(())
        }
        [month, amount] => {
            let month = parse_month(month)?;
            let amount = parse_amount(amount)?;
            ctx.store.set_salary(month, amount)?;
            cli_io::print_success(format!(
                "Salary for {month} set to {}.",
                output::format_amount(amount)
            ));
            Ok(())
        }
        _ => Err(usage_error("salary")),
    }
}

/// Applies the optional `[category] [description...]` tail of the add commands.
fn with_extras(
    ctx: &ShellContext,
    mut draft: PaymentDraft,
    rest: &[&str],
) -> Result<PaymentDraft, CommandError> {
    if let Some(category) = rest.first() {
        if !category.is_empty() && *category != "-" {
            draft = draft.with_category(ctx.find_category(category)?.id);
        }
    }
    if rest.len() > 1 {
        draft = draft.with_description(rest[1..].join(" "));
    }
    Ok(draft)
}

fn cmd_add_payment(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name, amount, date, rest @ ..] = args else {
        return Err(usage_error("add-payment"));
    };
    let draft = PaymentDraft::one_time(*name, parse_amount(amount)?, parse_date(date)?);
    let draft = with_extras(ctx, draft, rest)?;
    let id = ctx.store.add_payment(draft)?;
    cli_io::print_success(format!("Added payment `{name}` ({}).", short_id(id)));
    Ok(())
}

fn cmd_add_recurring(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name, amount, date, installments, rest @ ..] = args else {
        return Err(usage_error("add-recurring"));
    };
    let installments = parse_count(installments, "installment count")?;
    let draft = PaymentDraft::recurring(
        *name,
        parse_amount(amount)?,
        parse_date(date)?,
        installments,
    );
    let draft = with_extras(ctx, draft, rest)?;
    let id = ctx.store.add_payment(draft)?;
    cli_io::print_success(format!(
        "Added recurring payment `{name}` with {installments} installments ({}).",
        short_id(id)
    ));
    Ok(())
}

fn cmd_edit_payment(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [token, fields @ ..] = args else {
        return Err(usage_error("edit-payment"));
    };
    if fields.is_empty() {
        return Err(usage_error("edit-payment"));
    }
    let payment = ctx.find_payment(token)?;

    let mut patch = PaymentPatch::default();
    for field in fields {
        let Some((key, value)) = field.split_once('=') else {
            return Err(CommandError::InvalidArguments(format!(
                "expected field=value, got `{field}`"
            )));
        };
        match key.trim().to_lowercase().as_str() {
            "name" => patch.name = Some(value.to_string()),
            "amount" => patch.amount = Some(parse_amount(value)?),
            "date" => patch.date = Some(parse_date(value)?),
            "description" => {
                patch.description = Some((!value.is_empty()).then(|| value.to_string()));
            }
            "category" => {
                patch.category_id = if value.is_empty() || value.eq_ignore_ascii_case("none") {
                    Some(None)
                } else {
                    Some(Some(ctx.find_category(value)?.id))
                };
            }
            "installments" => {
                let installments = parse_count(value, "installment count")?;
                patch.is_recurring = Some(true);
                patch.recurrence = Some(Some(Recurrence::monthly(installments)));
            }
            "recurring" => match value.to_lowercase().as_str() {
                "false" | "no" => {
                    patch.is_recurring = Some(false);
                    patch.recurrence = Some(None);
                }
                "true" | "yes" => patch.is_recurring = Some(true),
                other => {
                    return Err(CommandError::InvalidArguments(format!(
                        "recurring must be true or false, got `{other}`"
                    )))
                }
            },
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown field `{other}`"
                )))
            }
        }
    }

    ctx.store.update_payment(payment.id, &patch)?;
    cli_io::print_success(format!("Updated payment `{}`.", payment.name));
    Ok(())
}

fn cmd_delete_payment(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [token] = args else {
        return Err(usage_error("delete-payment"));
    };
    let payment = ctx.find_payment(token)?;
    if !ctx.confirm(&format!(
        "Delete payment `{}` and all its installments?",
        payment.display_label()
    ))? {
        cli_io::print_info("Deletion cancelled.");
        return Ok(());
    }
    if ctx.store.delete_payment(payment.id)? {
        cli_io::print_success(format!("Deleted payment `{}`.", payment.name));
    } else {
        cli_io::print_info(format!("Payment `{}` was already gone.", payment.name));
    }
    Ok(())
}

fn cmd_toggle(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [token, rest @ ..] = args else {
        return Err(usage_error("toggle"));
    };
    let payment = ctx.find_payment(token)?;

    let mut instance_date = None;
    let mut explicit = None;
    for arg in rest {
        match arg.to_lowercase().as_str() {
            "paid" => explicit = Some(true),
            "unpaid" => explicit = Some(false),
            _ => instance_date = Some(parse_date(arg)?),
        }
    }

    let current = match (payment.active_recurrence(), instance_date) {
        (Some(_), Some(date)) => payment.is_installment_paid(date),
        (Some(_), None) => false,
        (None, _) => payment.paid.unwrap_or(false),
    };
    let paid = explicit.unwrap_or(!current);

    ctx.store.toggle_paid(payment.id, paid, instance_date)?;
    let target = match (payment.active_recurrence(), instance_date) {
        (Some(_), Some(date)) => format!("`{}` installment due {date}", payment.name),
        _ => format!("`{}`", payment.name),
    };
    let state = if paid { "paid" } else { "unpaid" };
    cli_io::print_success(format!("Marked {target} as {state}."));
    Ok(())
}

fn cmd_categories(ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let data = ctx.store.snapshot()?;
    output::section("Categories");
    if data.categories.is_empty() {
        cli_io::print_info("No categories yet. Use `add-category <name>`.");
        return Ok(());
    }
    for category in &data.categories {
        let count = data
            .payments
            .iter()
            .filter(|payment| payment.category_id == Some(category.id))
            .count();
        output::line(format!(
            "{:<20} {:>3} payment(s)  ({})",
            category.name,
            count,
            short_id(category.id)
        ));
    }
    Ok(())
}

fn cmd_add_category(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(usage_error("add-category"));
    }
    let name = args.join(" ");
    let id = ctx.store.add_category(&name)?;
    cli_io::print_success(format!("Added category `{}` ({}).", name.trim(), short_id(id)));
    Ok(())
}

fn cmd_rename_category(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [token, rest @ ..] = args else {
        return Err(usage_error("rename-category"));
    };
    if rest.is_empty() {
        return Err(usage_error("rename-category"));
    }
    let category = ctx.find_category(token)?;
    let new_name = rest.join(" ");
    ctx.store.update_category(category.id, &new_name)?;
    cli_io::print_success(format!(
        "Renamed category `{}` to `{}`.",
        category.name,
        new_name.trim()
    ));
    Ok(())
}

fn cmd_delete_category(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(usage_error("delete-category"));
    }
    let category = ctx.find_category(&args.join(" "))?;
    if !ctx.confirm(&format!(
        "Delete category `{}`? Its payments become uncategorized.",
        category.name
    ))? {
        cli_io::print_info("Deletion cancelled.");
        return Ok(());
    }
    let cleared = ctx.store.delete_category(category.id)?;
    cli_io::print_success(format!(
        "Deleted category `{}`; {cleared} payment(s) are now uncategorized.",
        category.name
    ));
    Ok(())
}

fn cmd_advice(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let month = month_or_current(args.first())?;
    let input = ctx.store.advisory_input(month)?;
    let outcome = request_advice(ctx.advisor.clone(), input, ctx.config.advice_timeout());
    match outcome {
        AdviceOutcome::Ready(advice) => {
            output::section(format!("Advice for {}", month.label()));
            output::line(&advice.summary);
            if advice.suggestions.is_empty() {
                cli_io::print_info("No suggestions; spending looks on track.");
            }
            for suggestion in &advice.suggestions {
                output::line(format!("  - {suggestion}"));
            }
        }
        AdviceOutcome::Unavailable(reason) => {
            cli_io::print_warning(format!("Advice unavailable: {reason}"));
        }
    }
    Ok(())
}

fn cmd_backups(ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let backups = ctx.storage.list_backups()?;
    if backups.is_empty() {
        cli_io::print_info("No backups yet.");
        return Ok(());
    }
    output::section(format!("Backups in {}", ctx.storage.backups_dir().display()));
    for name in backups {
        output::line(name);
    }
    Ok(())
}

fn cmd_help(_ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        let spec = find(&name.to_lowercase()).ok_or_else(|| {
            CommandError::InvalidArguments(format!("unknown command `{name}`"))
        })?;
        output::line(format!("{}\n  {}", spec.usage, spec.summary));
        return Ok(());
    }
    output::section("Commands");
    for spec in COMMANDS {
        output::line(format!("  {:<48} {}", spec.usage, spec.summary));
    }
    Ok(())
}

fn cmd_exit(_ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    cli_io::print_info("Exiting shell.");
    Err(CommandError::ExitRequested)
}
