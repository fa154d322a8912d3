//! The `levelcheck take` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use levelcheck_core::config::load_config_from;
use levelcheck_core::engine::Assessment;
use levelcheck_core::parser;
use levelcheck_core::session::format_clock;
use levelcheck_core::ticker::{TickEvent, Ticker};

use super::output::{parse_formats, print_summary, write_reports, ConsoleObserver};

type InputLines = Lines<BufReader<Stdin>>;

/// One line of user input while the session is active.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Choose(usize),
    Next,
    Previous,
    GoTo(String),
    Extend,
    Status,
    Submit,
    Quit,
    Help,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if let Ok(n) = line.parse::<usize>() {
        return Some(Command::Choose(n));
    }
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(w, r)| (w, r.trim()))
        .unwrap_or((line, ""));
    match (word.to_ascii_lowercase().as_str(), rest) {
        ("n" | "next", "") => Some(Command::Next),
        ("p" | "prev", "") => Some(Command::Previous),
        ("g" | "go", id) if !id.is_empty() => Some(Command::GoTo(id.to_string())),
        ("x" | "extend", "") => Some(Command::Extend),
        ("t" | "time", "") => Some(Command::Status),
        ("s" | "submit", "") => Some(Command::Submit),
        ("q" | "quit", "") => Some(Command::Quit),
        ("h" | "?" | "help", "") => Some(Command::Help),
        _ => None,
    }
}

const HELP: &str = "Commands: <number> answer | n next | p previous | g <id> go to question | \
x extend time | t status | s submit | q abandon";

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    bank_path: PathBuf,
    name: Option<String>,
    timer: bool,
    seed: Option<u64>,
    output: Option<PathBuf>,
    format: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let formats = parse_formats(format.as_deref().unwrap_or(&config.default_format))?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let bank = parser::load_bank(&bank_path)?;
    anyhow::ensure!(!bank.is_empty(), "question bank '{}' has no questions", bank.id);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let name = match name {
        Some(name) => name,
        None => prompt(&mut lines, "Your name: ")
            .await?
            .context("no student name given")?,
    };

    println!(
        "{} | {} questions{}",
        bank.name,
        bank.len(),
        if timer {
            format!(" | {} on the clock", format_clock(u64::from(config.time_limit_secs)))
        } else {
            String::new()
        }
    );

    let mut assessment =
        Assessment::with_config(Arc::new(bank), &config).with_observer(Arc::new(ConsoleObserver));
    let lease = match seed {
        Some(seed) => assessment.start_session_with_rng(&name, timer, &mut StdRng::seed_from_u64(seed))?,
        None => assessment.start_session(&name, timer)?,
    };
    let order: Vec<String> = assessment.questions().iter().map(|q| q.id.clone()).collect();

    let engine = Arc::new(Mutex::new(assessment));
    let mut ticker = Ticker::spawn(engine.clone(), lease, config.tick_interval());
    println!("{HELP}");

    let mut current = 0usize;
    let mut show = true;
    loop {
        if show {
            render_question(&*engine.lock().await, &order, current);
            show = false;
        }
        print_flush("> ").await?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read input")?,
            Some(event) = ticker.recv() => {
                tracing::debug!(?event, "clock event");
                match event {
                    TickEvent::TimeCritical { remaining_secs } => {
                        eprintln!("\n{} left.", format_clock(u64::from(remaining_secs)));
                    }
                    TickEvent::TimeExhausted if config.auto_submit_on_timeout => {
                        engine.lock().await.submit()?;
                        break;
                    }
                    TickEvent::TimeExhausted => {
                        eprintln!("Enter 's' to submit your answers.");
                    }
                }
                continue;
            }
        };

        let Some(line) = line else {
            eprintln!("\nEnd of input, submitting.");
            engine.lock().await.submit()?;
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let mut assessment = engine.lock().await;
        match parse_command(&line) {
            Some(Command::Choose(n)) => {
                let id = &order[current];
                let key = assessment
                    .options_for(id)
                    .and_then(|options| options.get(n.wrapping_sub(1)))
                    .map(|o| o.key.clone());
                match key {
                    Some(key) => match assessment.record_answer(id, &key) {
                        Ok(()) => {
                            if current + 1 < order.len() {
                                current += 1;
                            } else {
                                println!("That was the last question. Enter 's' to submit.");
                            }
                            show = true;
                        }
                        Err(e) => println!("{e}"),
                    },
                    None => println!("Choose an option between 1 and {}.", option_count(&assessment, id)),
                }
            }
            Some(Command::Next) => {
                current = (current + 1).min(order.len() - 1);
                show = true;
            }
            Some(Command::Previous) => {
                current = current.saturating_sub(1);
                show = true;
            }
            Some(Command::GoTo(id)) => match order.iter().position(|q| q.eq_ignore_ascii_case(&id)) {
                Some(idx) => {
                    current = idx;
                    show = true;
                }
                None => println!("No question with id '{id}'."),
            },
            Some(Command::Extend) => match assessment.extend_time() {
                Ok(remaining) => println!(
                    "Extended. {} left, {} extension(s) remaining.",
                    format_clock(u64::from(remaining)),
                    assessment.session().extensions_left()
                ),
                Err(e) => println!("{e}"),
            },
            Some(Command::Status) => print_status(&assessment),
            Some(Command::Submit) => {
                assessment.submit()?;
                break;
            }
            Some(Command::Quit) => {
                assessment.restart();
                drop(assessment);
                ticker.join().await;
                return Ok(());
            }
            Some(Command::Help) => println!("{HELP}"),
            None => println!("Unrecognised input. {HELP}"),
        }
    }

    // The ticker stops on its first tick after submission.
    ticker.join().await;

    let report = engine.lock().await.report()?;
    print_summary(&report);
    println!("\n{}\n", report.narrative);
    write_reports(&report, &output, &formats)?;

    Ok(())
}

async fn print_flush(text: &str) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

async fn prompt(lines: &mut InputLines, text: &str) -> Result<Option<String>> {
    print_flush(text).await?;
    Ok(lines.next_line().await?.map(|l| l.trim().to_string()))
}

fn option_count(engine: &Assessment, question_id: &str) -> usize {
    engine.options_for(question_id).map_or(0, <[_]>::len)
}

fn render_question(engine: &Assessment, order: &[String], current: usize) {
    let id = &order[current];
    let Some(question) = engine.bank().get(id) else {
        return;
    };
    let selected = engine.session().answer_for(id);

    println!(
        "\n[{}/{}] {} | {} ({})",
        current + 1,
        order.len(),
        question.section,
        question.id,
        if selected.is_some() { "answered" } else { "unanswered" }
    );
    println!("{}", question.text);
    for (i, option) in engine.options_for(id).unwrap_or_default().iter().enumerate() {
        let marker = if selected == Some(option.key.as_str()) { "*" } else { " " };
        println!(" {marker}{}. {}", i + 1, option.text);
    }
}

fn print_status(engine: &Assessment) {
    let session = engine.session();
    let progress = engine.progress();
    let clock = if session.timer_enabled() {
        let flag = if session.is_time_critical() { " (hurry)" } else { "" };
        format!(
            "{} left{flag}, {} extension(s) remaining",
            format_clock(u64::from(session.time_remaining_secs())),
            session.extensions_left()
        )
    } else {
        format!("{} elapsed", format_clock(session.elapsed_secs()))
    };
    println!(
        "{}/{} answered ({:.0}%) | {clock}",
        progress.answered,
        progress.total,
        progress.percent_complete()
    );
}
