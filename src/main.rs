mod app;
mod domain;
mod error;
mod input;
mod persistence;
mod report;
mod server;
mod ticker;
mod tracker;
mod ui;

use anyhow::{Context, Result};
use app::DashboardApp;
use chrono::{Datelike, Local, Utc};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use domain::{format_clock, format_duration, Task, TimerState};
use persistence::{
    get_data_dir, init_local_data_dir, load_settings, load_settings_unchecked, settings_file,
    update_settings, FileStore,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use report::{day_total, group_by_date, local_date, target_percentage, MonthReport, Statistics};
use std::io;
use std::path::{Path, PathBuf};
use ticker::Ticker;
use tracker::Tracker;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "timecard")]
#[command(about = "A single-timer personal time tracker with pause/resume and a monthly calendar", long_about = None)]
struct Cli {
    /// Data directory. Defaults to the nearest local .timecard, else ~/.timecard
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Override the daily target for this invocation
    #[arg(long, global = true)]
    target_hours: Option<f64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .timecard directory in the current directory
    Init,
    /// Start timing a new task
    Start {
        /// Task name (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Pause the running task
    Pause,
    /// Resume the paused task
    Resume,
    /// Stop the active task and record it
    Stop,
    /// Show the active task and its elapsed time
    Status,
    /// List recorded tasks
    History,
    /// Show per-day totals for a month
    Calendar {
        #[arg(short, long)]
        year: Option<i32>,
        #[arg(short, long)]
        month: Option<u32>,
    },
    /// Show today's total, month count and daily average
    Stats,
    /// Generate a monthly markdown report
    Report {
        #[arg(short, long)]
        year: Option<i32>,
        #[arg(short, long)]
        month: Option<u32>,
        /// Output file path. Defaults to <data-dir>/report-YYYY-MM.md
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show or update settings
    Config {
        /// Listen address for `serve`
        #[arg(long)]
        listen: Option<String>,
    },
    /// Run the HTTP API
    Serve {
        #[arg(short, long)]
        listen: Option<String>,
    },
    /// Live terminal dashboard
    Watch,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("timecard=info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The dashboard owns the terminal; log lines would corrupt it
    if !matches!(cli.command, Commands::Watch) {
        init_tracing();
    }

    if let Commands::Init = cli.command {
        let current_dir = std::env::current_dir().context("Could not determine current directory")?;
        let data_dir = init_local_data_dir(current_dir)?;
        println!("Initialized timecard directory: {}", data_dir.display());
        println!();
        println!("timecard will now use this local directory for task storage.");
        println!("Run 'timecard start <name>' to start tracking.");
        return Ok(());
    }

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => get_data_dir()?,
    };
    let config_path = settings_file(&data_dir);

    // Runs before validation so an invalid config.json can be repaired
    if let Commands::Config { listen } = cli.command {
        persistence::files::ensure_dir(&data_dir)?;
        return run_config(&config_path, cli.target_hours, listen);
    }

    let mut settings = load_settings(&config_path)?;

    if let Some(target_hours) = cli.target_hours {
        settings.target_hours = target_hours;
        settings.validate()?;
    }

    let mut tracker = Tracker::new(FileStore::open(&data_dir)?);

    match cli.command {
        Commands::Start { name } => {
            let task = tracker.start(&name.join(" "), Utc::now())?;
            println!("Started {}", describe(&task));
        }
        Commands::Pause => {
            let task = tracker.pause(Utc::now())?;
            println!("Paused {} at {}", task.name, format_clock(task.observe_elapsed(Utc::now())));
        }
        Commands::Resume => {
            let task = tracker.resume(Utc::now())?;
            println!("Resumed {} (paused {} so far)", task.name, format_duration(task.paused_duration));
        }
        Commands::Stop => {
            let task = tracker.stop(Utc::now())?;
            println!(
                "Stopped {} after {}",
                task.name,
                format_duration(task.duration.unwrap_or_default())
            );
        }
        Commands::Status => print_status(tracker.state()?, tracker.current()?.as_ref()),
        Commands::History => print_history(&tracker.history()?),
        Commands::Calendar { year, month } => {
            let (year, month) = resolve_month(year, month)?;
            print_calendar(&tracker.history()?, year, month, settings.target_hours);
        }
        Commands::Stats => {
            let today = local_date(&Utc::now(), &Local);
            let stats = Statistics::compute(&tracker.history()?, today, &Local, settings.target_hours);
            print_stats(&stats);
        }
        Commands::Report { year, month, output } => {
            let (year, month) = resolve_month(year, month)?;
            let history = tracker.history()?;
            let active = tracker.current()?;
            let report = MonthReport {
                year,
                month,
                history: &history,
                active: active.as_ref(),
                target_hours: settings.target_hours,
                tz: &Local,
                now: Utc::now(),
            };
            println!("Generating report for {}-{:02}...", year, month);
            let path = report.write(&data_dir, output)?;
            println!("Report generated: {}", path.display());
        }
        Commands::Serve { listen } => {
            let listen = listen.unwrap_or(settings.listen);
            let state = server::AppState::new(tracker, Local, settings.target_hours);
            let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            runtime.block_on(server::serve(state, &listen))?;
        }
        Commands::Watch => run_watch(tracker, settings.target_hours)?,
        Commands::Init | Commands::Config { .. } => {}
    }

    Ok(())
}

fn run_config(config_path: &Path, target_hours: Option<f64>, listen: Option<String>) -> Result<()> {
    if target_hours.is_none() && listen.is_none() {
        let settings = load_settings_unchecked(config_path)?;
        println!("config:       {}", config_path.display());
        println!("target_hours: {}", settings.target_hours);
        println!("listen:       {}", settings.listen);
        if let Err(e) = settings.validate() {
            println!();
            println!("warning: {}", e);
        }
        return Ok(());
    }

    update_settings(config_path, target_hours, listen)?;
    println!("Saved {}", config_path.display());
    Ok(())
}

/// Year/month from flags, defaulting to the current local month
fn resolve_month(year: Option<i32>, month: Option<u32>) -> Result<(i32, u32)> {
    let today = Local::now().date_naive();
    let month = month.unwrap_or(today.month());
    if !(1..=12).contains(&month) {
        anyhow::bail!("Invalid month: {} (expected 1-12)", month);
    }
    Ok((year.unwrap_or(today.year()), month))
}

fn describe(task: &Task) -> String {
    format!(
        "{} (started {})",
        task.name,
        task.start_time.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    )
}

fn print_status(state: TimerState, active: Option<&Task>) {
    match active {
        None => println!("No task in progress"),
        Some(task) => println!(
            "[{}] {}  {}",
            state.to_tag(),
            describe(task),
            format_clock(task.observe_elapsed(Utc::now()))
        ),
    }
}

fn print_history(history: &[Task]) {
    if history.is_empty() {
        println!("No tasks recorded yet");
        return;
    }
    for task in history {
        println!(
            "{}  {:>8}  {}",
            task.start_time.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            format_duration(task.duration.unwrap_or_default()),
            task.name
        );
    }
}

fn print_calendar(history: &[Task], year: i32, month: u32, target_hours: f64) {
    let days = group_by_date(history, year, month, &Local);
    if days.is_empty() {
        println!("No tasks recorded in {}-{:02}", year, month);
        return;
    }
    for (date, entries) in &days {
        let total = day_total(entries);
        println!(
            "{}  {:>8}  {:>5.1}%",
            date,
            format_duration(total),
            target_percentage(total, target_hours)
        );
        for entry in entries {
            println!("    {:<30} {}h {}m", entry.task.name, entry.hours, entry.minutes);
        }
    }
}

fn print_stats(stats: &Statistics) {
    println!(
        "Today:         {}h {}m of {}h ({:.1}%)",
        stats.today_hours, stats.today_minutes, stats.target_hours, stats.today_percentage
    );
    println!("This month:    {} tasks", stats.month_count);
    println!("Daily average: {}", format_duration(stats.daily_average));
}

fn run_watch(tracker: Tracker<FileStore>, target_hours: f64) -> Result<()> {
    let mut app = DashboardApp::new(tracker, Local, target_hours, Utc::now());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut DashboardApp<FileStore>,
) -> Result<()> {
    let tick_rate = ticker::tick_duration();
    let mut ticker = Ticker::default();

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press && input::handle_key(app, key, Utc::now()) {
                    return Ok(());
                }
            }
        }

        app.tick(Utc::now());
        if ticker.tick() {
            app.reload();
        }
    }
}
