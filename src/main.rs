// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use portfolio_filter::{
    init_tracing, init_tracing_file, Category, FilterController, RecordingView, SourceArgs,
};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "portfolio-filter", version, about = "Filter a portfolio grid by category")]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    /// More log output (RUST_LOG overrides the level)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Where the TUI writes its log (the TUI logs nothing without it)
    #[arg(long, global = true, env = "PORTFOLIO_LOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every card (nothing filtered)
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Select a category ("*" for all, "web" or ".web" for a tag) and print the result
    Select {
        category: String,
        #[arg(long)]
        json: bool,
    },
    /// List the buttons and the tags present on cards
    Categories,
    /// Interactive terminal UI (default)
    Tui,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Tui);
    let level = if cli.verbose { "debug" } else { "warn" };

    match log_sink(&command, cli.log_file.as_deref()) {
        LogSink::File(path) => init_tracing_file(level, path)?,
        LogSink::Stderr => init_tracing(level),
        LogSink::Off => {}
    }

    let mut controller = cli.source.load_controller_with_view(RecordingView::new())?;

    match command {
        Command::Show { json } => print!("{}", render_output(&controller, json)?),
        Command::Select { category, json } => {
            controller.select_category(Category::parse(&category));
            print!("{}", render_output(&controller, json)?);
        }
        Command::Categories => print!("{}", format_categories(&controller)),
        Command::Tui => run_ui_mode(controller)?,
    }

    Ok(())
}

#[derive(Debug, PartialEq)]
enum LogSink<'a> {
    Stderr,
    File(&'a Path),
    Off,
}

/// stderr shares the terminal with the TUI's alternate screen
fn log_sink<'a>(command: &Command, log_file: Option<&'a Path>) -> LogSink<'a> {
    match (command, log_file) {
        (Command::Tui, Some(path)) => LogSink::File(path),
        (Command::Tui, None) => LogSink::Off,
        _ => LogSink::Stderr,
    }
}

fn render_output(controller: &FilterController<RecordingView>, json: bool) -> Result<String> {
    if json {
        Ok(format!("{}\n", serde_json::to_string_pretty(&controller.snapshot())?))
    } else {
        Ok(format_listing(controller))
    }
}

/// Plain listing, drawn from the signals the view last received
fn format_listing(controller: &FilterController<RecordingView>) -> String {
    let view = controller.view();
    let mut out = String::new();

    let selected: Vec<&str> = controller
        .buttons()
        .iter()
        .enumerate()
        .filter(|(i, _)| view.button_selected(*i).unwrap_or(false))
        .map(|(_, b)| b.label.as_str())
        .collect();

    let _ = writeln!(out, "🔎 Filter: {}", controller.active().selector());
    if selected.is_empty() {
        let _ = writeln!(out, "   Button: (none)");
    } else {
        let _ = writeln!(out, "   Button: {}", selected.join(", "));
    }
    let _ = writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mut shown = 0;
    for card in controller.cards() {
        let visible = view.card_visible(&card.id).unwrap_or(false);
        if visible {
            shown += 1;
        }
        let marker = if visible { "✓" } else { "·" };
        let _ = writeln!(
            out,
            "{} {:<8} {:<36} {}",
            marker,
            card.id,
            card.title,
            card.tags().join(" ")
        );
    }

    let _ = writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    let _ = writeln!(out, "{} of {} cards visible", shown, controller.cards().len());
    out
}

fn format_categories<V: portfolio_filter::FilterView>(controller: &FilterController<V>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "🏷️  Buttons");
    for (i, button) in controller.buttons().iter().enumerate() {
        let _ = writeln!(out, "  {}. {:<20} {}", i + 1, button.label, button.category.selector());
    }

    let _ = writeln!(out, "\n🗂️  Tags on cards");
    for category in controller.categories() {
        let count = controller
            .cards()
            .iter()
            .filter(|c| c.matches(&category))
            .count();
        let _ = writeln!(out, "  {:<24} {} card(s)", category.selector(), count);
    }
    out
}

#[cfg(feature = "tui")]
fn run_ui_mode(controller: FilterController<RecordingView>) -> Result<()> {
    let mut app = ui::App::new(controller);
    ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_controller: FilterController<RecordingView>) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: portfolio-filter show | select <category> | categories");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_filter::{Card, CategoryButton};

    fn controller() -> FilterController<RecordingView> {
        let buttons = vec![
            CategoryButton::wildcard("All"),
            CategoryButton::new("Web", Category::tag("web")),
            CategoryButton::new("App", Category::tag("app")),
        ];
        let cards = vec![
            Card::new("1", "Web Shop", ["web"]),
            Card::new("2", "Mobile App", ["app"]),
            Card::new("3", "Web + App", ["web", "app"]),
        ];
        FilterController::with_view(buttons, cards, RecordingView::new())
    }

    fn select_from_argv(argv: &[&str]) -> FilterController<RecordingView> {
        let cli = Cli::parse_from(argv);
        let mut controller = controller();
        match cli.command {
            Some(Command::Select { category, .. }) => controller.select_category(Category::parse(&category)),
            other => panic!("expected select, got {:?}", other),
        }
        controller
    }

    #[test]
    fn test_show_lists_everything() {
        let out = format_listing(&controller());

        assert!(out.contains("🔎 Filter: *"));
        assert!(out.contains("   Button: All"));
        assert!(out.contains("3 of 3 cards visible"));
    }

    #[test]
    fn test_select_dotted_tag_from_argv() {
        let controller = select_from_argv(&["portfolio-filter", "select", ".web"]);
        let out = format_listing(&controller);

        assert!(out.contains("🔎 Filter: .web"));
        assert!(out.contains("   Button: Web"));
        assert!(out.contains("✓ 1"));
        assert!(out.contains("· 2"));
        assert!(out.contains("2 of 3 cards visible"));
    }

    #[test]
    fn test_select_unlisted_tag_shows_no_button() {
        let controller = select_from_argv(&["portfolio-filter", "select", "mobile"]);
        let out = format_listing(&controller);

        assert!(out.contains("   Button: (none)"));
        assert!(out.contains("0 of 3 cards visible"));
    }

    #[test]
    fn test_select_wildcard_from_argv() {
        let controller = select_from_argv(&["portfolio-filter", "select", "*", "--json"]);
        let out = render_output(&controller, true).unwrap();

        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["active"], "*");
        assert_eq!(json["visible_count"], 3);
    }

    #[test]
    fn test_format_categories() {
        let out = format_categories(&controller());

        assert!(out.contains("  1. All"));
        assert!(out.contains("  2. Web"));
        assert!(out.contains(".web"));
        assert!(out.contains("2 card(s)"));
    }

    #[test]
    fn test_tui_never_logs_to_stderr() {
        let log = Path::new("ui.log");

        assert_eq!(log_sink(&Command::Tui, None), LogSink::Off);
        assert_eq!(log_sink(&Command::Tui, Some(log)), LogSink::File(log));
        assert_eq!(log_sink(&Command::Categories, Some(log)), LogSink::Stderr);
        assert_eq!(
            log_sink(&Command::Show { json: false }, None),
            LogSink::Stderr
        );
    }

    #[test]
    fn test_default_command_is_tui() {
        let cli = Cli::parse_from(["portfolio-filter", "--log-file", "ui.log"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.log_file, Some(PathBuf::from("ui.log")));
    }
}
