use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use studyhub::dashboard::DashboardMetrics;
use studyhub::quiz::{FileSessionStore, QuestionBank, QuizError, QuizSession, SessionStore};
use studyhub::tutor::{ApiKeyManager, KeySource, TutorError, TutorGateway, explain_question_prompt};
use studyhub::{App, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Column width for wrapped terminal output
const OUTPUT_WIDTH: usize = 80;

#[derive(Parser)]
#[command(name = "studyhub")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Quiz session to use (defaults to the configured session)
    #[arg(long, global = true, env = "STUDYHUB_SESSION")]
    session: Option<String>,

    /// Question bank file (defaults to questions.json in the data directory)
    #[arg(long, global = true)]
    bank: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show study metrics
    Dashboard,
    /// Ask the AI tutor a question
    Ask {
        /// The question to ask
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
    /// Practice multiple-choice questions
    Quiz {
        #[command(subcommand)]
        action: QuizCommand,
    },
    /// Inspect the question bank
    Bank {
        #[command(subcommand)]
        action: BankCommand,
    },
    /// Manage the tutor API key
    Key {
        #[command(subcommand)]
        action: KeyCommand,
    },
}

#[derive(Subcommand)]
enum QuizCommand {
    /// Show the current question and progress
    Show,
    /// Draw a random question
    Next {
        /// Only draw from this topic (repeatable)
        #[arg(long = "topic", value_name = "TOPIC")]
        topics: Vec<String>,
    },
    /// Choose an option by label ("b") or text
    Select {
        #[arg(required = true, num_args = 1..)]
        choice: Vec<String>,
    },
    /// Submit the selected option
    Submit,
    /// Ask the tutor to explain the current question
    Explain,
    /// Start the session over
    Reset,
}

#[derive(Subcommand)]
enum BankCommand {
    /// Load the bank and report skipped records
    Check,
}

#[derive(Subcommand)]
enum KeyCommand {
    /// Store an API key in the system keyring
    Set {
        /// The API key
        key: String,
    },
    /// Remove the stored API key
    Clear,
    /// Show where the API key comes from
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal, so only errors are logged while it runs
    let default_filter = if cli.command.is_none() { "studyhub=error" } else { "studyhub=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let config = Config::load()?;
    let session_id = cli.session.clone().unwrap_or_else(|| config.default_session.clone());
    let bank_path = match &cli.bank {
        Some(path) => path.clone(),
        None => config.bank_path()?,
    };

    match cli.command {
        Some(Commands::Dashboard) => {
            let bank = QuestionBank::load(&bank_path);
            let store = FileSessionStore::open_default()?;
            print_dashboard(&DashboardMetrics::compute(&bank, &store.snapshot(&session_id)?));
        }
        Some(Commands::Ask { prompt }) => {
            let gateway = TutorGateway::from_settings(config.tutor.clone());
            println!("{}", wrap_output(&gateway.explain(&prompt.join(" ")).await));
        }
        Some(Commands::Quiz { action }) => {
            let store = FileSessionStore::open_default()?;
            run_quiz(action, &bank_path, &store, &session_id, &config).await?;
        }
        Some(Commands::Bank { action: BankCommand::Check }) => check_bank(&bank_path),
        Some(Commands::Key { action }) => run_key(action, &config)?,
        None => {
            // Launch TUI
            let bank = QuestionBank::load(&bank_path);
            let store = FileSessionStore::open_default()?;
            let gateway = TutorGateway::from_settings(config.tutor.clone());
            let mut app = App::new(bank, store, session_id, gateway, config.active_theme())?;
            app.run().await?;
        }
    }

    Ok(())
}

async fn run_quiz(
    action: QuizCommand,
    bank_path: &Path,
    store: &FileSessionStore,
    session_id: &str,
    config: &Config,
) -> Result<()> {
    match action {
        QuizCommand::Show => print_session(&store.snapshot(session_id)?),
        QuizCommand::Next { topics } => {
            let bank = QuestionBank::load(bank_path);
            let pool = bank.in_topics(&topics);
            let drawn = store.with_session(session_id, |s| s.draw_question(&pool).map(|_| ()))?;
            match drawn {
                Err(QuizError::EmptyBank) if !topics.is_empty() && !bank.is_empty() => {
                    println!("No questions for the selected topics: {}", topics.join(", "));
                    println!("Available topics: {}", bank.topics().join(", "));
                }
                drawn => {
                    if report(drawn).is_some() {
                        print_session(&store.snapshot(session_id)?);
                    }
                }
            }
        }
        QuizCommand::Select { choice } => {
            let choice = choice.join(" ");
            let selected = store.with_session(session_id, |s| {
                let question = s.active_question.as_ref().ok_or(QuizError::NoActiveQuestion)?;
                let option =
                    question.resolve_choice(&choice).unwrap_or(choice.as_str()).to_string();
                s.select_option(&option)?;
                Ok(option)
            })?;
            if let Some(option) = report(selected) {
                println!("Selected: {}", option);
            }
        }
        QuizCommand::Submit => {
            if let Some(outcome) = report(store.with_session(session_id, |s| s.submit_answer())?) {
                if outcome.is_correct {
                    println!("Correct!");
                } else {
                    println!("Incorrect. The correct answer is {}.", outcome.correct_label);
                }
                if !outcome.explanation.trim().is_empty() {
                    println!("\n{}", wrap_output(&outcome.explanation));
                }
                println!();
                print_score(&store.snapshot(session_id)?);
            }
        }
        QuizCommand::Explain => {
            let session = store.snapshot(session_id)?;
            let Some(question) = &session.active_question else {
                report::<()>(Err(QuizError::NoActiveQuestion));
                return Ok(());
            };

            let gateway = TutorGateway::from_settings(config.tutor.clone());
            let prompt = explain_question_prompt(question, session.selected_option.as_deref());
            println!("{}", wrap_output(&gateway.explain(&prompt).await));
        }
        QuizCommand::Reset => {
            if store.reset(session_id)? {
                println!("Session '{}' has been reset.", session_id);
            } else {
                println!("Session '{}' had no saved progress.", session_id);
            }
        }
    }
    Ok(())
}

/// Print a quiz rejection with its hint; rejections are not failures
fn report<T>(result: Result<T, QuizError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(QuizError::EmptyBank) => {
            println!("{}", QuizError::EmptyBank.hint());
            None
        }
        Err(e) => {
            println!("{}. {}", e, e.hint());
            None
        }
    }
}

fn print_session(session: &QuizSession) {
    match &session.active_question {
        None => println!("No question drawn yet. Run `studyhub quiz next`."),
        Some(question) => {
            println!("[{}]", question.topic);
            println!("{}\n", wrap_output(&question.prompt));
            for option in &question.options {
                let selected = session.selected_option.as_deref() == Some(option.as_str());
                let marker = match (session.revealed, question.is_correct(option), selected) {
                    (true, true, _) => "\u{2713}", // ✓
                    (true, false, true) => "\u{2717}", // ✗
                    (_, _, true) => "\u{25CF}", // ●
                    _ => " ",
                };
                println!("  {} {}", marker, option);
            }
            println!();
            if session.revealed {
                println!("Answer revealed. Run `studyhub quiz next` for another question.");
            }
        }
    }
    print_score(session);
}

fn print_score(session: &QuizSession) {
    println!(
        "Score: {}/{} ({}%)  Streak: {} (best {})",
        session.score,
        session.attempts,
        session.accuracy_percent(),
        session.streak,
        session.best_streak
    );
}

fn print_dashboard(metrics: &DashboardMetrics) {
    if metrics.has_no_data() {
        println!("No data available. Add questions to the question bank to see metrics.");
        return;
    }

    println!("Questions: {} across {} topics", metrics.total_questions, metrics.topic_count());
    if metrics.rejected_records > 0 {
        println!("Skipped records: {} (run `studyhub bank check`)", metrics.rejected_records);
    }
    println!(
        "Score: {}/{} ({}%)  Streak: {} (best {})",
        metrics.score, metrics.attempts, metrics.accuracy_percent, metrics.streak, metrics.best_streak
    );

    println!("\nTopics:");
    for (topic, count) in &metrics.questions_per_topic {
        let accuracy = metrics
            .topic_accuracy
            .iter()
            .find(|t| &t.topic == topic)
            .map(|t| format!("  {}% ({}/{})", t.percent, t.correct, t.attempted))
            .unwrap_or_default();
        println!("  {:<24} {:>3} questions{}", topic, count, accuracy);
    }

    if !metrics.weak_topics.is_empty() {
        println!("\nNeeds practice:");
        for topic in &metrics.weak_topics {
            println!("  {:<24} {}%", topic.topic, topic.percent);
        }
    }
}

fn check_bank(path: &Path) {
    if !path.exists() {
        println!("No question bank at {}", path.display());
        return;
    }

    let bank = QuestionBank::load(path);
    println!(
        "{}: {} questions in {} topics, {} skipped",
        path.display(),
        bank.len(),
        bank.topics().len(),
        bank.rejected().len()
    );
    for rejected in bank.rejected() {
        println!("  record #{}: {}", rejected.index, rejected.reason);
    }
}

fn run_key(action: KeyCommand, config: &Config) -> Result<()> {
    match action {
        KeyCommand::Set { key } => {
            ApiKeyManager::set_api_key(&key)?;
            println!("API key saved to the system keyring.");
        }
        KeyCommand::Clear => match ApiKeyManager::delete_api_key() {
            Ok(()) => println!("API key removed."),
            Err(TutorError::NotConfigured) => println!("No API key stored."),
            Err(e) => return Err(e.into()),
        },
        KeyCommand::Status => {
            match ApiKeyManager::find_api_key() {
                Some((key, source)) => {
                    let source = match source {
                        KeySource::Environment => "environment",
                        KeySource::Keyring => "system keyring",
                    };
                    println!("API key: {} (from {})", ApiKeyManager::mask_key(&key), source);
                }
                None => println!("API key: not set"),
            }
            match &config.tutor.endpoint {
                Some(endpoint) if config.tutor.is_configured() => println!("Endpoint: {}", endpoint),
                _ => println!("Endpoint: not configured"),
            }
        }
    }
    Ok(())
}

fn wrap_output(text: &str) -> String {
    text.lines().map(|line| textwrap::fill(line, OUTPUT_WIDTH)).collect::<Vec<_>>().join("\n")
}
