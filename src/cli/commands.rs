//! Command handlers for the billing shell.

use chrono::NaiveDate;
use uuid::Uuid;

use super::output::{self, render_table};
use super::registry::{CommandEntry, CommandRegistry};
use super::shell::{CommandError, CommandResult, LoopControl, ShellContext};
use crate::{
    billing::{self, CardConfig, InvoiceWindow},
    calendar::{self, TimeUnit},
    forecast::{ForecastItem, ForecastTotals},
    installments::{self, Purchase},
    money::{self, format_amount, parse_amount},
    recurring::{self, Frequency, RecurringExpenseDef},
    services::{CardService, ForecastService, PurchaseService},
};

const DEFAULT_CATEGORY: &str = "Geral";

pub fn registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    for entry in [
        CommandEntry::new("help", "List available commands", "help", cmd_help),
        CommandEntry::new("version", "Show version information", "version", cmd_version),
        CommandEntry::new(
            "split",
            "Split an amount into exact installments",
            "split <total> <count>",
            cmd_split,
        ),
        CommandEntry::new(
            "advance",
            "Step a date by days, weeks, months or years",
            "advance <date> <steps> <day|week|month|year>",
            cmd_advance,
        ),
        CommandEntry::new(
            "invoice",
            "Resolve the invoice window due in a month",
            "invoice <closing_day> <due_day> <month> <year> [today]",
            cmd_invoice,
        ),
        CommandEntry::new(
            "schedule",
            "Preview the installments of a purchase",
            "schedule <description> <total> <date> <count> [category]",
            cmd_schedule,
        ),
        CommandEntry::new(
            "project",
            "Project a recurring expense into a window",
            "project <description> <value> <anchor> <weekly|monthly|yearly> <start> <end>",
            cmd_project,
        ),
        CommandEntry::new(
            "card",
            "Register a card for this session",
            "card <closing_day> <due_day> <credit_limit>",
            cmd_card,
        ),
        CommandEntry::new(
            "buy",
            "Register a purchase on a session card",
            "buy <card#> <description> <total> <date> <count> [category]",
            cmd_buy,
        ),
        CommandEntry::new(
            "statement",
            "Show a card invoice and its installments",
            "statement <card#> <month> <year>",
            cmd_statement,
        ),
        CommandEntry::new(
            "limit",
            "Show the available credit of a card",
            "limit <card#>",
            cmd_limit,
        ),
        CommandEntry::new(
            "recurring",
            "Register a recurring expense for this session",
            "recurring <description> <value> <anchor> <weekly|monthly|yearly> [category]",
            cmd_recurring,
        ),
        CommandEntry::new(
            "forecast",
            "Forecast installments and recurring expenses",
            "forecast [months]",
            cmd_forecast,
        ),
        CommandEntry::new("config", "Show the active configuration", "config", cmd_config),
        CommandEntry::new("exit", "Leave the shell (alias: quit)", "exit", cmd_exit)
            .with_aliases(&["quit"]),
    ] {
        registry.register(entry);
    }
    registry
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        let entry = context
            .registry()
            .get(&name.to_lowercase())
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;
        output::info(format!("{} - {}", entry.name, entry.description));
        output::info(format!("usage: {}", entry.usage));
        return Ok(LoopControl::Continue);
    }
    output::section("Available commands");
    let rows: Vec<Vec<String>> = context
        .registry()
        .list()
        .map(|entry| vec![entry.usage.to_string(), entry.description.to_string()])
        .collect();
    render_table(&["usage", "description"], &rows);
    Ok(LoopControl::Continue)
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info(format!("Billing Core version {}", env!("CARGO_PKG_VERSION")));
    Ok(LoopControl::Continue)
}

fn cmd_split(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 2, "split <total> <count>")?;
    let total = parse_amount(args[0])?;
    let count = parse_number::<u32>(args[1], "count")?;
    let parts = money::split(total, count)?;
    let rows: Vec<Vec<String>> = parts
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            vec![
                format!("{}/{}", idx + 1, count),
                format_amount(*value, &context.config.currency),
            ]
        })
        .collect();
    render_table(&["#", "value"], &rows);
    Ok(LoopControl::Continue)
}

fn cmd_advance(_context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 3, "advance <date> <steps> <day|week|month|year>")?;
    let date = parse_date(args[0])?;
    let steps = parse_number::<i32>(args[1], "steps")?;
    let unit = TimeUnit::parse(args[2])?;
    output::info(calendar::advance(date, steps, unit)?);
    Ok(LoopControl::Continue)
}

fn cmd_invoice(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 4, "invoice <closing_day> <due_day> <month> <year> [today]")?;
    let card = CardConfig::new(
        parse_number(args[0], "closing day")?,
        parse_number(args[1], "due day")?,
        rust_decimal::Decimal::ZERO,
    )?;
    let month = parse_number(args[2], "month")?;
    let year = parse_number(args[3], "year")?;
    let window = match args.get(4) {
        Some(raw) => billing::resolve(&card, month, year, parse_date(raw)?)?,
        None => billing::resolve_with_clock(&card, month, year, context.clock.as_ref())?,
    };
    print_window(&window);
    Ok(LoopControl::Continue)
}

fn cmd_schedule(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 4, "schedule <description> <total> <date> <count> [category]")?;
    let purchase = purchase_from_args(args)?;
    let records = installments::schedule(&purchase)?;
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            vec![
                record.date.to_string(),
                record.description.clone(),
                format_amount(record.value, &context.config.currency),
            ]
        })
        .collect();
    render_table(&["date", "description", "value"], &rows);
    Ok(LoopControl::Continue)
}

fn cmd_project(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(
        args,
        6,
        "project <description> <value> <anchor> <weekly|monthly|yearly> <start> <end>",
    )?;
    let definition = RecurringExpenseDef::new(
        args[0],
        parse_amount(args[1])?,
        parse_date(args[2])?,
        args[3].parse::<Frequency>()?,
        DEFAULT_CATEGORY,
    )?;
    let items = recurring::project(&definition, parse_date(args[4])?, parse_date(args[5])?)?;
    print_forecast(&items, &context.config.currency);
    Ok(LoopControl::Continue)
}

fn cmd_card(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 3, "card <closing_day> <due_day> <credit_limit>")?;
    let card = CardConfig::new(
        parse_number(args[0], "closing day")?,
        parse_number(args[1], "due day")?,
        parse_amount(args[2])?,
    )?;
    let id = context.store.add_card(card)?;
    context.cards.push(id);
    output::success(format!("Card #{} registered.", context.cards.len()));
    Ok(LoopControl::Continue)
}

fn cmd_buy(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(
        args,
        5,
        "buy <card#> <description> <total> <date> <count> [category]",
    )?;
    let card_id = session_card(context, args[0])?;
    let purchase = purchase_from_args(&args[1..])?;
    let records = PurchaseService::register(&mut context.store, card_id, &purchase, &context.config)?;
    output::success(format!(
        "Registered {} installment(s) for {}.",
        records.len(),
        purchase.description
    ));
    Ok(LoopControl::Continue)
}

fn cmd_statement(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 3, "statement <card#> <month> <year>")?;
    let card_id = session_card(context, args[0])?;
    let statement = CardService::statement(
        &context.store,
        card_id,
        parse_number(args[1], "month")?,
        parse_number(args[2], "year")?,
        context.clock.as_ref(),
    )?;
    print_window(&statement.window);
    let currency = &context.config.currency;
    let rows: Vec<Vec<String>> = statement
        .items
        .iter()
        .map(|record| {
            vec![
                record.date.to_string(),
                record.description.clone(),
                format_amount(record.value, currency),
            ]
        })
        .collect();
    render_table(&["date", "description", "value"], &rows);
    output::info(format!("total: {}", format_amount(statement.total, currency)));
    Ok(LoopControl::Continue)
}

fn cmd_limit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 1, "limit <card#>")?;
    let card_id = session_card(context, args[0])?;
    let available = CardService::available_limit(&context.store, card_id, context.clock.as_ref())?;
    output::info(format!(
        "available: {}",
        format_amount(available, &context.config.currency)
    ));
    if available.is_sign_negative() {
        output::warning("Card is over its credit limit.");
    }
    Ok(LoopControl::Continue)
}

fn cmd_recurring(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(
        args,
        4,
        "recurring <description> <value> <anchor> <weekly|monthly|yearly> [category]",
    )?;
    let definition = RecurringExpenseDef::new(
        args[0],
        parse_amount(args[1])?,
        parse_date(args[2])?,
        args[3].parse::<Frequency>()?,
        args.get(4).copied().unwrap_or(DEFAULT_CATEGORY),
    )?;
    let label = format!(
        "{} ({})",
        definition.description,
        definition.frequency.interval().label()
    );
    context.store.add_recurring(definition)?;
    output::success(format!("Recurring expense {label} registered."));
    Ok(LoopControl::Continue)
}

fn cmd_forecast(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let months = match args.first() {
        Some(raw) => parse_number(raw, "months")?,
        None => context.config.forecast_horizon_months,
    };
    let items = ForecastService::horizon(&context.store, context.clock.as_ref(), months)?;
    print_forecast(&items, &context.config.currency);
    Ok(LoopControl::Continue)
}

fn cmd_config(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let config = &context.config;
    output::section("Configuration");
    output::info(format!("currency: {}", config.currency));
    output::info(format!("locale: {}", config.locale));
    output::info(format!(
        "forecast horizon: {} month(s)",
        config.forecast_horizon_months
    ));
    output::info(format!("max installments: {}", config.max_installments));
    Ok(LoopControl::Continue)
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info("Bye.");
    Ok(LoopControl::Exit)
}

fn print_window(window: &InvoiceWindow) {
    output::info(format!("start: {}", window.start_date));
    output::info(format!("closing: {}", window.end_date));
    output::info(format!("due: {}", window.due_date));
    output::info(format!("status: {}", window.status.label()));
}

fn print_forecast(items: &[ForecastItem], currency: &str) {
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            vec![
                item.date.to_string(),
                item.description.clone(),
                format!("{:?}", item.origin).to_lowercase(),
                format_amount(item.value, currency),
            ]
        })
        .collect();
    render_table(&["date", "description", "origin", "value"], &rows);
    let totals = ForecastTotals::from_items(items);
    output::info(format!(
        "{} item(s), total {}",
        totals.count,
        format_amount(totals.total, currency)
    ));
}

fn purchase_from_args(args: &[&str]) -> Result<Purchase, CommandError> {
    Ok(Purchase::new(
        args[0],
        parse_amount(args[1])?,
        parse_date(args[2])?,
        parse_number(args[3], "count")?,
        args.get(4).copied().unwrap_or(DEFAULT_CATEGORY),
    )?)
}

fn session_card(context: &ShellContext, raw: &str) -> Result<Uuid, CommandError> {
    let index: usize = parse_number(raw.trim_start_matches('#'), "card number")?;
    index
        .checked_sub(1)
        .and_then(|idx| context.cards.get(idx))
        .copied()
        .ok_or_else(|| CommandError::InvalidArguments(format!("no card #{index} in this session")))
}

fn expect_args(args: &[&str], minimum: usize, usage: &str) -> Result<(), CommandError> {
    if args.len() < minimum {
        return Err(CommandError::InvalidArguments(format!("usage: {usage}")));
    }
    Ok(())
}

fn parse_date(raw: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| CommandError::InvalidArguments(format!("`{raw}` is not a YYYY-MM-DD date")))
}

fn parse_number<T: std::str::FromStr>(raw: &str, field: &str) -> Result<T, CommandError> {
    raw.parse::<T>()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid {field} `{raw}`")))
}
