use colored::Colorize;
use std::fmt;

use crate::ledger::{DisplayPayment, MonthSummary};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Hint,
    Section,
}

fn build_label(kind: MessageKind) -> (&'static str, &'static str) {
    match kind {
        MessageKind::Info => ("INFO", "[i]"),
        MessageKind::Success => ("SUCCESS", "[✓]"),
        MessageKind::Warning => ("WARNING", "[!]"),
        MessageKind::Error => ("ERROR", "[x]"),
        MessageKind::Hint => ("HINT", ""),
        MessageKind::Section => ("", ""),
    }
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    let formatted = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        _ => {
            let (label, icon) = build_label(kind);
            if icon.is_empty() {
                format!("{label}: {text}")
            } else {
                format!("{label}: {icon} {text}")
            }
        }
    };

    match kind {
        MessageKind::Success => formatted.bright_green().to_string(),
        MessageKind::Warning => formatted.bright_yellow().to_string(),
        MessageKind::Error => formatted.bright_red().to_string(),
        MessageKind::Hint => formatted.bright_cyan().to_string(),
        MessageKind::Section => formatted.bold().to_string(),
        MessageKind::Info => formatted,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = apply_style(kind, message);
    match kind {
        MessageKind::Section => println!("\n{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn hint(message: impl fmt::Display) {
    print(MessageKind::Hint, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Plain line with no label, used for table rows.
pub fn line(message: impl fmt::Display) {
    println!("{}", message);
}

pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

pub fn paid_marker(paid: bool) -> String {
    if paid {
        "paid".green().to_string()
    } else {
        "unpaid".yellow().to_string()
    }
}

/// One month-view row: date, name, amount, category, installment, paid state, short id.
pub fn payment_row(entry: &DisplayPayment, short_id: &str) -> String {
    let installment = entry
        .installment_label()
        .map(|label| format!(" [{label}]"))
        .unwrap_or_default();
    format!(
        "{}  {:<24} {:>10}  {:<16} {}{}  ({})",
        entry.instance_date,
        entry.payment.name,
        format_amount(entry.amount()),
        entry.category_label(),
        paid_marker(entry.is_paid_in_month),
        installment,
        short_id
    )
}

pub fn summary_lines(summary: &MonthSummary) -> Vec<String> {
    let remaining = format_amount(summary.remaining_income);
    let remaining = if summary.is_over_budget() {
        remaining.bright_red().to_string()
    } else {
        remaining
    };
    let mut lines = vec![
        format!("Income:          {}", format_amount(summary.income)),
        format!("Paid:            {}", format_amount(summary.total_paid)),
        format!("Unpaid:          {}", format_amount(summary.total_unpaid)),
        format!("Total expenses:  {}", format_amount(summary.total_expenses)),
        format!("Remaining:       {}", remaining),
    ];
    let ranked = summary.ranked_spending();
    if !ranked.is_empty() {
        lines.push("Paid by category:".to_string());
        for (name, amount) in ranked {
            lines.push(format!("  {:<20} {:>10}", name, format_amount(amount)));
        }
    }
    lines
}
