use std::fmt;
use std::io::{BufRead, Write as _};

use quiz_core::model::{AttemptId, Difficulty};
use services::{AppServices, Clock, QuizFlow, QuizService, QuizState, ResultsService};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingAttemptId { command: &'static str },
    InvalidAttemptId { raw: String },
    InvalidCategory { raw: String },
    InvalidDifficulty { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingAttemptId { command } => {
                write!(f, "{command} requires an attempt id")
            }
            ArgsError::InvalidAttemptId { raw } => write!(f, "invalid attempt id: {raw}"),
            ArgsError::InvalidCategory { raw } => write!(f, "invalid --category value: {raw}"),
            ArgsError::InvalidDifficulty { raw } => {
                write!(f, "invalid --difficulty value: {raw} (easy|medium|hard)")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- quiz         [--db <sqlite_url>] [--category <id>] [--difficulty <easy|medium|hard>]");
    eprintln!("  cargo run -p app -- history      [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- review <id>  [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- retry <id>   [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- delete <id>  [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:dailyquiz.sqlite3");
    eprintln!("  --category 9 (General Knowledge)");
    eprintln!("  --difficulty easy");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  DAILYQUIZ_DB_URL, DAILYQUIZ_CATEGORY, DAILYQUIZ_DIFFICULTY");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quiz,
    History,
    Review,
    Retry,
    Delete,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "quiz" => Some(Self::Quiz),
            "history" => Some(Self::History),
            "review" => Some(Self::Review),
            "retry" => Some(Self::Retry),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::History => "history",
            Self::Review => "review",
            Self::Retry => "retry",
            Self::Delete => "delete",
        }
    }

    fn takes_attempt_id(self) -> bool {
        matches!(self, Self::Review | Self::Retry | Self::Delete)
    }
}

struct Args {
    db_url: String,
    category: u32,
    difficulty: Difficulty,
    attempt_id: Option<AttemptId>,
}

impl Args {
    fn parse(command: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("DAILYQUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://dailyquiz.sqlite3".into(), normalize_sqlite_url);
        let mut category = std::env::var("DAILYQUIZ_CATEGORY")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(9);
        let mut difficulty = std::env::var("DAILYQUIZ_DIFFICULTY")
            .ok()
            .and_then(|value| value.parse::<Difficulty>().ok())
            .unwrap_or(Difficulty::Easy);
        let mut attempt_id = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--category" => {
                    let value = require_value(args, "--category")?;
                    category = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidCategory { raw: value.clone() })?;
                }
                "--difficulty" => {
                    let value = require_value(args, "--difficulty")?;
                    difficulty = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidDifficulty { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other if command.takes_attempt_id() && !other.starts_with('-') && attempt_id.is_none() => {
                    let parsed: AttemptId = other
                        .parse()
                        .map_err(|_| ArgsError::InvalidAttemptId { raw: arg.clone() })?;
                    attempt_id = Some(parsed);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if command.takes_attempt_id() && attempt_id.is_none() {
            return Err(ArgsError::MissingAttemptId {
                command: command.name(),
            });
        }

        Ok(Self {
            db_url,
            category,
            difficulty,
            attempt_id,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

fn print_question(
    question: &quiz_core::model::Question,
    index: usize,
    total: usize,
    selected: Option<&str>,
) {
    println!();
    println!("Question {} of {total}", index + 1);
    println!("{}", question.question_text());
    for (i, answer) in question.all_shuffled_answers().iter().enumerate() {
        let marker = if selected == Some(answer.as_str()) {
            ">"
        } else {
            " "
        };
        println!(" {marker} {}. {answer}", i + 1);
    }
}

/// Drive one quiz to completion from stdin.
///
/// Numbers toggle the answer for the current question, `n` moves on once an
/// answer is selected, `b` abandons the run, `q` quits.
async fn run_quiz_loop(
    services: &AppServices,
    quiz: &QuizService,
    mut flow: QuizFlow,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        match flow.state().clone() {
            QuizState::Welcome => return Ok(()),
            QuizState::Loading => {
                // Fetches resolve before the loop sees Loading; reaching it
                // means the flow was left mid-start.
                return Ok(());
            }
            QuizState::Error { message } => {
                println!();
                println!("Something went wrong: {message}");
                match read_line("Press r to retry, anything else to exit: ").as_deref() {
                    Some("r" | "R") => {
                        quiz.start_quiz(&mut flow).await;
                    }
                    _ => return Ok(()),
                }
            }
            QuizState::InProgress {
                question,
                index,
                total,
                selected,
                next_enabled,
            } => {
                print_question(&question, index, total, selected.as_deref());
                let hint = if next_enabled {
                    "Pick a number to change, n for next, b to go back: "
                } else {
                    "Pick a number, b to go back: "
                };
                let Some(input) = read_line(hint) else {
                    return Ok(());
                };
                match input.as_str() {
                    "n" | "N" if next_enabled => {
                        if let Some(completed) = quiz.next(&mut flow).await? {
                            let results = services.results_for(completed);
                            show_results(results).await?;
                            return Ok(());
                        }
                    }
                    "n" | "N" => {
                        println!("Select an answer first.");
                    }
                    "b" | "B" => {
                        flow.back();
                        println!("Quiz abandoned.");
                        return Ok(());
                    }
                    "q" | "Q" => return Ok(()),
                    number => match number.parse::<usize>() {
                        Ok(choice) if choice >= 1 && choice <= question.all_shuffled_answers().len() => {
                            let answer = question.all_shuffled_answers()[choice - 1].clone();
                            flow.select(&answer)?;
                        }
                        _ => println!("Enter a number between 1 and {}.", question.all_shuffled_answers().len()),
                    },
                }
            }
        }
    }
}

async fn show_results(mut results: ResultsService) -> Result<(), Box<dyn std::error::Error>> {
    println!();
    println!("{}", results.state().result_title);
    println!("{}", results.state().result_subtitle);

    if let Some("r" | "R") = read_line("Press r to review your answers, anything else to exit: ").as_deref() {
        results.toggle_review().await?;
        if let Some(review) = &results.state().review {
            print_review(review);
        }
    }
    Ok(())
}

fn print_review(review: &quiz_core::model::QuizReview) {
    println!();
    println!("{} · {}", review.category, review.difficulty);
    for (i, question) in review.questions.iter().enumerate() {
        let verdict = if question.was_correct {
            "correct"
        } else if question.user_answer.is_empty() {
            "unanswered"
        } else {
            "wrong"
        };
        println!();
        println!("{}. {} [{verdict}]", i + 1, question.question_text);
        for answer in &question.all_answers {
            let mut marks = String::new();
            if *answer == question.correct_answer {
                marks.push('+');
            }
            if *answer == question.user_answer {
                marks.push('*');
            }
            println!("   {marks:<2} {answer}");
        }
    }
    println!();
    println!("(+ correct answer, * your answer)");
}

async fn run_history(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let state = services.history().load().await?;
    if state.is_empty {
        println!("No quiz attempts yet.");
        return Ok(());
    }
    for item in &state.attempts {
        println!(
            "#{}  {}  {}  {} · {}",
            item.id,
            item.timestamp.format("%Y-%m-%d %H:%M"),
            item.score,
            item.category,
            item.difficulty,
        );
    }
    Ok(())
}

async fn run_review(
    services: &AppServices,
    attempt_id: AttemptId,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut results = services.results_for_attempt(attempt_id).await?;
    println!("{}", results.state().result_title);
    println!("{}", results.state().result_subtitle);
    results.toggle_review().await?;
    if let Some(review) = &results.state().review {
        print_review(review);
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: start a quiz when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Quiz,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Quiz,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && Command::from_arg(&argv[0]).is_some() {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(cmd, &mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    log::debug!("opening database {}", parsed.db_url);
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::default_clock()).await?;

    match cmd {
        Command::Quiz => {
            let quiz = services
                .quiz()
                .clone()
                .with_category(parsed.category)
                .with_difficulty(parsed.difficulty);
            let mut flow = QuizFlow::new();
            quiz.start_quiz(&mut flow).await;
            run_quiz_loop(&services, &quiz, flow).await
        }
        Command::History => run_history(&services).await,
        Command::Review => {
            let id = parsed.attempt_id.ok_or(ArgsError::MissingAttemptId {
                command: cmd.name(),
            })?;
            run_review(&services, id).await
        }
        Command::Retry => {
            let id = parsed.attempt_id.ok_or(ArgsError::MissingAttemptId {
                command: cmd.name(),
            })?;
            let mut flow = QuizFlow::new();
            services.quiz().start_retry(&mut flow, id).await;
            run_quiz_loop(&services, services.quiz(), flow).await
        }
        Command::Delete => {
            let id = parsed.attempt_id.ok_or(ArgsError::MissingAttemptId {
                command: cmd.name(),
            })?;
            services.history().delete(id).await?;
            println!("Deleted attempt #{id}.");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer, printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
