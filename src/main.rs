use std::io::{self, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{Local, SecondsFormat};
use clap::Parser;

use rivu_knn::evaluation::Snapshot;
use rivu_knn::tasks::PrequentialEvaluator;
use rivu_knn::ui::cli::args::{Cli, Command};
use rivu_knn::ui::cli::{drivers::InquireDriver, wizard::prompt_choice};
use rivu_knn::ui::types::build::{build_evaluator, build_learner, build_stream};
use rivu_knn::ui::types::choices::{PrequentialParams, TaskChoice};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const FG_CYAN: &str = "\x1b[36m";
const FG_GREEN: &str = "\x1b[32m";
const FG_MAGENTA: &str = "\x1b[35m";
const FG_GREY: &str = "\x1b[90m";

const REPAINT_EVERY: Duration = Duration::from_millis(150);
const BAR_WIDTH: usize = 15;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let task = match cli.command {
        Some(Command::Run(args)) => args.into_task_choice()?,
        None => prompt_choice::<TaskChoice, _>(&InquireDriver)
            .context("failed while prompting for task")?,
    };

    match task {
        TaskChoice::EvaluatePrequential(p) => run_prequential(p),
    }
}

fn run_prequential(p: PrequentialParams) -> Result<()> {
    let learner = build_learner(p.learner).context("failed to build learner")?;
    let stream = build_stream(p.stream).context("failed to build stream")?;
    let evaluator = build_evaluator(p.evaluator).context("failed to build evaluator")?;

    let limits = Limits {
        instances: p.max_instances,
        seconds: p.max_seconds,
    };
    let header = vec![
        format!("{BOLD}{FG_CYAN}▶ Prequential Evaluation{RESET}"),
        format!(
            "{DIM}sample_freq={}  mem_check_freq={}  {}{RESET}",
            p.sample_frequency,
            p.mem_check_frequency,
            Local::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
        format!("{FG_GREY}{}{RESET}", "─".repeat(72)),
    ];

    let (tx, rx) = std::sync::mpsc::channel();
    let render = std::thread::spawn(move || render_status(rx, &header, limits));

    let mut runner = PrequentialEvaluator::new(
        learner,
        stream,
        evaluator,
        p.max_instances,
        p.max_seconds,
        p.sample_frequency,
        p.mem_check_frequency,
    )
    .context("failed to construct PrequentialEvaluator")?
    .with_progress(tx);

    let outcome = runner.run().context("evaluation failed");
    let curve = runner.curve().clone();
    drop(runner);
    let _ = render.join();
    outcome?;

    if let Some(path) = p.dump_file.filter(|path| !path.as_os_str().is_empty()) {
        curve
            .export(&path, p.dump_format.into())
            .with_context(|| format!("failed to export learning curve to {}", path.display()))?;
        println!("{DIM}learning curve written to {}{RESET}", path.display());
    }

    Ok(())
}

#[derive(Clone, Copy)]
struct Limits {
    instances: Option<u64>,
    seconds: Option<u64>,
}

/// Prints the header once, then repaints one status line until the
/// evaluator hangs up.
fn render_status(rx: Receiver<Snapshot>, header: &[String], limits: Limits) {
    for line in header {
        println!("{line}");
    }
    println!();

    let mut last_draw = Instant::now();
    let mut latest: Option<Snapshot> = None;

    loop {
        match rx.recv_timeout(REPAINT_EVERY) {
            Ok(s) => latest = Some(s),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                if let Some(s) = &latest {
                    print!("\r{}\x1B[K\n", format_status(s, limits));
                    let _ = io::stdout().flush();
                }
                return;
            }
        }

        if last_draw.elapsed() >= REPAINT_EVERY {
            if let Some(s) = &latest {
                print!("\r{}\x1B[K", format_status(s, limits));
                let _ = io::stdout().flush();
            }
            last_draw = Instant::now();
        }
    }
}

fn format_status(s: &Snapshot, limits: Limits) -> String {
    let mut line = format!(
        "{FG_GREEN}{BOLD}seen{RESET} {:>9}  \
         {FG_CYAN}{BOLD}acc{RESET} {:>7}%  \
         {FG_MAGENTA}{BOLD}κ{RESET} {:>7}%",
        s.instances_seen,
        percent(s.accuracy),
        percent(s.kappa),
    );
    for (name, value) in s.ordered_extras() {
        line.push_str(&format!("  {DIM}{name}{RESET} {}", fixed(value, 4)));
    }
    line.push_str(&format!(
        "  {DIM}ram_h{RESET} {:.3e}  {DIM}t{RESET} {:.2}s",
        s.ram_hours, s.seconds
    ));

    if let Some(max) = limits.instances {
        let bar = progress_bar(s.instances_seen as f64, max as f64);
        line.push_str(&format!("  {DIM}[inst]{RESET} {bar}"));
    }
    if let Some(max) = limits.seconds {
        let bar = progress_bar(s.seconds, max as f64);
        line.push_str(&format!("  {DIM}[time]{RESET} {bar}"));
    }
    line
}

fn progress_bar(current: f64, total: f64) -> String {
    if !(total.is_finite() && total > 0.0) {
        return String::new();
    }
    let ratio = (current / total).clamp(0.0, 1.0);
    let filled = (ratio * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH.saturating_sub(filled)),
        ratio * 100.0
    )
}

fn percent(x: f64) -> String {
    fixed(x * 100.0, 2)
}

fn fixed(x: f64, prec: usize) -> String {
    if x.is_nan() {
        format!("{DIM}NaN{RESET}")
    } else {
        format!("{x:>6.prec$}")
    }
}
