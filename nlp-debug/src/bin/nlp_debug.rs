//! NLP Debug CLI - send commands to the NLP API and inspect the analysis
//!
//! Usage:
//!   nlp-debug [MESSAGE] [--lang <code>] [--url <url>] [--config <path>] [--json] [--verbose]
//!
//! Example:
//!   nlp-debug "Show my inventory"
//!   nlp-debug "मेरे ऑर्डर दिखाओ" --lang hi --url http://10.0.0.5:5000

use anyhow::{Context, Result};
use chrono::Local;
use colored::{Color, Colorize};
use nlp_debug::controller::SubmissionState;
use nlp_debug::form::{validate_form, validate_language};
use nlp_debug::health::HealthState;
use nlp_debug::model::{ParsedCommand, SupportedIntents};
use nlp_debug::preview::{render_preview, Transcript};
use nlp_debug::render::{ResultView, RESULTS_TITLE};
use nlp_debug::samples::{self, CATEGORIES};
use nlp_debug::{
    ApiHealthStatus, CommandResult, DebugConfig, DebugConsole, LanguagePreference, SubmitOutcome,
};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const BOX_WIDTH: usize = 62;
const PREVIEW_WIDTH: usize = 60;

fn print_usage() {
    eprintln!(
        r#"
{} - Exercise the multilingual WhatsApp command NLP API

{}
    nlp-debug [MESSAGE] [OPTIONS]

{}
    [MESSAGE]    Command to analyze once; omit it for the interactive console

{}
    -l, --lang <CODE>        Language preference: auto, en, hi, mixed (default: auto)
    -u, --url <URL>          NLP API base URL (default: http://localhost:5000)
    -c, --config <PATH>      TOML config file
    --json                   Print the normalized result as JSON
    -v, --verbose            Log requests
    -vv                      Extra verbose (debug logging)
    -h, --help               Print this help message

{}
    NLP_API_BASE_URL         Base URL override (--url wins)

{}
    nlp-debug "Show my inventory"
    nlp-debug "Stock dikhao" --lang mixed
    nlp-debug "मेरे ऑर्डर दिखाओ" -l hi --json
    nlp-debug --url http://10.0.0.5:5000
"#,
        "NLP Debug CLI".bold(),
        "USAGE:".bold(),
        "ARGS:".bold(),
        "OPTIONS:".bold(),
        "ENVIRONMENT:".bold(),
        "EXAMPLES:".bold(),
    );
}

fn print_repl_help() {
    eprintln!("{}", "Commands:".bold());
    eprintln!("  {}      Show this help", ":help".yellow());
    eprintln!("  {} Set language preference (auto, en, hi, mixed)", ":lang <code>".yellow());
    eprintln!("  {}   List sample commands", ":samples".yellow());
    eprintln!("  {} Load sample <n> into the form", ":sample <n>".yellow());
    eprintln!("  {}      Submit the form", ":send".yellow());
    eprintln!("  {}     Re-check API health", ":retry".yellow());
    eprintln!("  {}     Clear form, result and preview", ":reset".yellow());
    eprintln!("  {}   List supported intents", ":intents".yellow());
    eprintln!("  {} Rule-based parse of <text>", ":parse <text>".yellow());
    eprintln!("  {}   Show the API request/response example", ":example".yellow());
    eprintln!("  {}    Show console state", ":status".yellow());
    eprintln!("  {}      Exit", ":quit".yellow());
    eprintln!("  Anything else is sent as a command.");
}

#[derive(Debug)]
struct CliArgs {
    message: Option<String>,
    language: LanguagePreference,
    url: Option<String>,
    config: Option<PathBuf>,
    json: bool,
    verbose: u8, // 0=warn, 1=info, 2=debug
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        std::process::exit(0);
    }

    let mut message: Option<String> = None;
    let mut language = LanguagePreference::Auto;
    let mut url = None;
    let mut config = None;
    let mut json = false;
    let mut verbose: u8 = 0;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--lang" | "-l" => {
                i += 1;
                let code = args.get(i).context("--lang needs a language code")?;
                language = validate_language(code)
                    .with_context(|| format!("Unknown language: {}", code))?;
            }
            "--url" | "-u" => {
                i += 1;
                url = Some(args.get(i).context("--url needs a value")?.clone());
            }
            "--config" | "-c" => {
                i += 1;
                config = Some(PathBuf::from(args.get(i).context("--config needs a path")?));
            }
            "--json" => {
                json = true;
            }
            "--verbose" | "-v" => {
                verbose = verbose.max(1);
            }
            "-vv" => {
                verbose = 2;
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                anyhow::bail!("Unknown option: {}", flag);
            }
            word => {
                message = Some(match message {
                    Some(existing) => format!("{} {}", existing, word),
                    None => word.to_string(),
                });
            }
        }
        i += 1;
    }

    Ok(CliArgs {
        message,
        language,
        url,
        config,
        json,
        verbose,
    })
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Box with a title row; rows are padded by character count and rows not
/// starting with a space are dimmed as section headings
fn print_box(title: &str, rows: &[String], color: Color) {
    let inner = BOX_WIDTH - 2;
    let bar = "─".repeat(inner);
    let edge = "│".color(color);

    eprintln!("{}", format!("╭{}╮", bar).color(color));
    let pad = inner.saturating_sub(title.chars().count() + 2);
    eprintln!("{}  {}{}{}", edge, title.bold(), " ".repeat(pad), edge);
    eprintln!("{}", format!("├{}┤", bar).color(color));
    for row in rows {
        let pad = inner.saturating_sub(row.chars().count() + 2);
        let shown = if row.starts_with(' ') {
            row.normal()
        } else {
            row.as_str().dimmed()
        };
        eprintln!("{}  {}{}{}", edge, shown, " ".repeat(pad), edge);
    }
    eprintln!("{}", format!("╰{}╯", bar).color(color));
}

fn print_header(console: &DebugConsole) {
    eprintln!();
    print_box(
        "NLP Debug Console",
        &[
            format!("  API:       {}", console.config().api.base_url),
            format!("  Language:  {}", console.form().language().label()),
            format!("  Timeout:   {}s", console.config().api.timeout_secs),
        ],
        Color::Blue,
    );
    eprintln!();
}

fn print_health(state: &HealthState) {
    match state.status {
        ApiHealthStatus::Checking => {
            eprintln!("{} {}", "●".yellow(), "Checking API status...".dimmed())
        }
        ApiHealthStatus::Online => eprintln!("{} {}", "●".green(), "API Online".green()),
        ApiHealthStatus::Offline => {
            eprintln!("{} {}", "●".red(), "API Offline".red());
            if let Some(error) = &state.error {
                eprintln!("  {} {}", "Error:".red().bold(), error);
                eprintln!("  {}", "Type :retry to check again".dimmed());
            }
        }
    }
}

fn print_result(result: &CommandResult) {
    eprintln!();
    print_box(RESULTS_TITLE, &result_rows(&ResultView::new(result)), Color::Green);
}

/// Rendered result with a blank row between sections
fn result_rows(view: &ResultView) -> Vec<String> {
    let mut rows = Vec::new();
    for line in view.lines() {
        if !line.starts_with(' ') && !rows.is_empty() {
            rows.push(String::new());
        }
        rows.push(line);
    }
    rows
}

fn print_preview(transcript: &Transcript) {
    if transcript.is_empty() {
        return;
    }
    eprintln!();
    eprintln!("{}", "┌─ WhatsApp Preview ─────────────────────────────────────────".cyan());
    for line in render_preview(transcript, PREVIEW_WIDTH, Local::now().time()) {
        eprintln!("{} {}", "│".cyan(), line);
    }
    eprintln!("{}", "└────────────────────────────────────────────────────────────".cyan());
}

fn print_submission(state: &SubmissionState) {
    if let Some(error) = &state.error {
        eprintln!("{} {}", "Error:".red().bold(), error);
    }
    if let Some(result) = &state.result {
        print_result(result);
    }
    print_preview(&state.transcript);
    let _ = std::io::stderr().flush();
}

fn print_samples() {
    let mut number = 1;
    for category in CATEGORIES {
        eprintln!("{}", category.name.bold());
        for sample in category.commands {
            eprintln!(
                "  {:>2}. {}  {}",
                number,
                sample.text,
                format!("({})", sample.language).dimmed()
            );
            number += 1;
        }
    }
}

fn print_example(config: &DebugConfig) -> Result<()> {
    eprintln!("{}", "Endpoints".bold());
    for (label, url) in samples::endpoint_urls(&config.api) {
        eprintln!("  {:<8} {}", format!("{}:", label).dimmed(), url);
    }
    eprintln!();
    eprintln!("{}", "Example Request".bold());
    for line in serde_json::to_string_pretty(&samples::example_request())?.lines() {
        eprintln!("  {}", line.yellow());
    }
    eprintln!();
    eprintln!("{}", "Example Response".bold());
    for line in serde_json::to_string_pretty(&samples::example_response())?.lines() {
        eprintln!("  {}", line.cyan());
    }
    Ok(())
}

fn print_intents(intents: &SupportedIntents) {
    eprintln!(
        "{} {}",
        "Languages:".dimmed(),
        intents.languages.join(", ")
    );
    for (intent, examples) in &intents.intents {
        eprintln!("{}", intent.bold());
        for example in examples {
            eprintln!("  - {}", example);
        }
    }
}

fn print_parsed(parsed: &ParsedCommand) -> Result<()> {
    eprintln!("{}  {}", "Intent:".dimmed(), parsed.intent.bold());
    eprintln!("{}  {}", "Language:".dimmed(), parsed.language);
    eprintln!("{}  {}", "Normalized:".dimmed(), parsed.normalized_text);
    eprintln!(
        "{}  {}",
        "Entities:".dimmed(),
        serde_json::to_string(&parsed.entities)?
    );
    Ok(())
}

/// Interactive console input
#[derive(Debug, PartialEq)]
enum ReplCommand {
    Help,
    Lang(String),
    Samples,
    Sample(String),
    Send,
    Retry,
    Reset,
    Intents,
    Parse(String),
    Example,
    Status,
    Quit,
    Unknown(String),
    Message(String),
    Empty,
}

fn parse_repl_line(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    let Some(command) = line.strip_prefix(':') else {
        return ReplCommand::Message(line.to_string());
    };

    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim().to_string()),
        None => (command, String::new()),
    };
    match name {
        "help" | "h" | "?" => ReplCommand::Help,
        "lang" | "l" => ReplCommand::Lang(rest),
        "samples" => ReplCommand::Samples,
        "sample" | "s" => ReplCommand::Sample(rest),
        "send" => ReplCommand::Send,
        "retry" => ReplCommand::Retry,
        "reset" => ReplCommand::Reset,
        "intents" => ReplCommand::Intents,
        "parse" => ReplCommand::Parse(rest),
        "example" => ReplCommand::Example,
        "status" => ReplCommand::Status,
        "quit" | "q" | "exit" => ReplCommand::Quit,
        other => ReplCommand::Unknown(other.to_string()),
    }
}

async fn report_submission(console: &DebugConsole, outcome: &SubmitOutcome) {
    match outcome {
        SubmitOutcome::Ignored => eprintln!("{}", "Nothing to send".dimmed()),
        SubmitOutcome::Busy => eprintln!("{}", "A command is already being processed".yellow()),
        SubmitOutcome::Superseded => eprintln!("{}", "Response discarded after reset".dimmed()),
        SubmitOutcome::Rejected(_) | SubmitOutcome::Completed(_) | SubmitOutcome::Failed(_) => {
            print_submission(&console.snapshot().await.submission);
        }
    }
}

async fn submit_with_notice(console: &DebugConsole) -> SubmitOutcome {
    eprintln!("{}", "Processing...".dimmed());
    let _ = std::io::stderr().flush();
    console.submit().await
}

async fn run_interactive(mut console: DebugConsole) -> Result<()> {
    print_header(&console);
    print_health(&HealthState {
        status: ApiHealthStatus::Checking,
        error: None,
    });
    console.start().await;
    print_health(&console.snapshot().await.health);
    eprintln!("{}", "Type :help for commands, :quit to exit".dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("{} ", format!("nlp[{}]>", console.form().language()).cyan().bold());
        let _ = std::io::stderr().flush();

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        match parse_repl_line(&line) {
            ReplCommand::Empty => {}
            ReplCommand::Help => print_repl_help(),
            ReplCommand::Quit => break,
            ReplCommand::Lang(code) => match validate_language(&code) {
                Ok(language) => {
                    console.set_language(language);
                    eprintln!("{} {}", "Language:".dimmed(), language.label());
                }
                Err(e) => eprintln!("{} {} ({})", "Error:".red().bold(), e, code),
            },
            ReplCommand::Samples => print_samples(),
            ReplCommand::Sample(n) => {
                match n.parse::<usize>().ok().and_then(|n| console.select_sample(n)) {
                    Some(sample) => eprintln!(
                        "{} {}  {}",
                        "Loaded:".dimmed(),
                        sample.text,
                        "(:send to submit)".dimmed()
                    ),
                    None => eprintln!("{} No sample {:?}, see :samples", "Error:".red().bold(), n),
                }
            }
            ReplCommand::Send => {
                let outcome = submit_with_notice(&console).await;
                report_submission(&console, &outcome).await;
            }
            ReplCommand::Message(message) => {
                console.set_message(message);
                let outcome = submit_with_notice(&console).await;
                report_submission(&console, &outcome).await;
            }
            ReplCommand::Retry => {
                print_health(&HealthState {
                    status: ApiHealthStatus::Checking,
                    error: None,
                });
                console.retry_health().await;
                print_health(&console.snapshot().await.health);
            }
            ReplCommand::Reset => {
                console.reset().await;
                eprintln!("{}", "Console reset".dimmed());
            }
            ReplCommand::Intents => match console.api().supported_intents().await {
                Ok(intents) => print_intents(&intents),
                Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
            },
            ReplCommand::Parse(text) => {
                if text.is_empty() {
                    eprintln!("{} :parse needs some text", "Error:".red().bold());
                    continue;
                }
                match console.api().parse_command(&text, None).await {
                    Ok(parsed) => print_parsed(&parsed)?,
                    Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
                }
            }
            ReplCommand::Example => print_example(console.config())?,
            ReplCommand::Status => {
                let snapshot = console.snapshot().await;
                print_health(&snapshot.health);
                eprintln!("{} {:?}", "Form:".dimmed(), snapshot.form.message());
                eprintln!("{} {}", "Language:".dimmed(), snapshot.form.language().label());
                eprintln!(
                    "{} {}",
                    "Loading:".dimmed(),
                    if snapshot.submission.loading { "yes" } else { "no" }
                );
                print_submission(&snapshot.submission);
            }
            ReplCommand::Unknown(name) => {
                eprintln!("{} Unknown command :{} (try :help)", "Error:".red().bold(), name);
            }
        }
    }

    Ok(())
}

/// Whole-form check for a one-shot command; `None` when it can be sent
fn form_error(console: &DebugConsole, message: &str) -> Option<String> {
    let validation = validate_form(
        message,
        console.form().language().code(),
        console.config().form.max_message_chars,
    );
    (!validation.is_valid()).then(|| validation.summary())
}

async fn run_once(mut console: DebugConsole, message: String, json: bool) -> Result<bool> {
    if !json {
        print_header(&console);
    }
    if console.start().await == ApiHealthStatus::Offline {
        print_health(&console.snapshot().await.health);
    }

    if let Some(error) = form_error(&console, &message) {
        if json {
            println!("{}", serde_json::json!({ "error": error }));
        } else {
            eprintln!("{} {}", "Error:".red().bold(), error);
        }
        return Ok(false);
    }

    let outcome = console.submit_message(message).await;
    let state = console.snapshot().await.submission;

    if json {
        match &outcome {
            SubmitOutcome::Completed(result) => {
                println!("{}", serde_json::to_string_pretty(result)?);
            }
            _ => {
                let error = state.error.clone().unwrap_or_else(|| "Nothing to send".to_string());
                println!("{}", serde_json::json!({ "error": error }));
            }
        }
    } else {
        report_submission(&console, &outcome).await;
    }

    Ok(matches!(outcome, SubmitOutcome::Completed(_)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let args = parse_args(&args)?;
    init_logging(args.verbose)?;

    let config = DebugConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?
        .with_base_url_override(args.url.clone());

    let mut console = DebugConsole::connect(config).context("Failed to create NLP API client")?;
    console.set_language(args.language);

    match args.message {
        Some(message) => {
            if !run_once(console, message, args.json).await? {
                std::process::exit(1);
            }
        }
        None => run_interactive(console).await?,
    }

    Ok(())
}
