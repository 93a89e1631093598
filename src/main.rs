//! Terminal driver for the perception survey.
//!
//! Reads commands from stdin: `l`/`r` to choose, `b` to take back the last
//! choice, `s` to skip a pair, `q` to quit. Logs go to stderr.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use perception_survey::application::{
    CastVoteCommand, CastVoteHandler, FinishSurveyHandler, ResponseStore, SyncStatus,
};
use perception_survey::config::{AppConfig, LoggingConfig};
use perception_survey::domain::catalog::ItemCatalog;
use perception_survey::domain::responses::ExportArtifact;
use perception_survey::domain::survey::{
    Locale, ParticipantRole, Side, SurveyError, SurveySession, TrialSequencer,
};
use perception_survey::ports::ItemSource;

type Input = Lines<BufReader<Stdin>>;

enum Outcome {
    Completed,
    Quit,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load_validated()?;
    init_tracing(&config.logging);

    let catalog = config
        .catalog
        .source()
        .load(config.catalog.case.as_deref())
        .await?;
    info!(items = catalog.len(), "Loaded image catalog");

    let store = Arc::new(
        ResponseStore::new(Arc::new(config.storage.results_sink()))
            .with_fallback(Arc::new(config.storage.fallback_sink())),
    );
    let cast_vote = CastVoteHandler::new(Arc::clone(&store), config.storage.mode);
    let finish = FinishSurveyHandler::new(Arc::clone(&store));

    let mut sequencer = match config.survey.seed {
        Some(seed) => TrialSequencer::seeded(seed),
        None => TrialSequencer::from_entropy(),
    };
    let mut session = SurveySession::new(config.survey.settings()?)?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if !onboard(&mut session, &mut sequencer, &mut input).await? {
            break;
        }
        match vote(&mut session, &mut sequencer, &catalog, &cast_vote, &mut input).await? {
            Outcome::Quit => break,
            Outcome::Completed => {}
        }

        let report = finish.handle(&session).await?;
        println!();
        println!("Thank you! {} choices recorded as {}.", report.rows, report.role);
        match report.sync {
            SyncStatus::Synced => println!("Your answers have been saved."),
            SyncStatus::Pending => println!("Your answers will be saved shortly."),
            SyncStatus::Degraded { reason, export } => {
                println!("Saving failed ({reason}).");
                if let Some(export) = export {
                    write_export(&config.storage.results_dir, &export).await;
                }
            }
        }

        if !ask_yes(&mut input, "Start a new survey? [y/N] ").await? {
            break;
        }
        session.reset();
        store.reset().await;
    }
    Ok(())
}

/// Consent, role and language. Returns `false` if the participant leaves.
async fn onboard(
    session: &mut SurveySession,
    sequencer: &mut TrialSequencer,
    input: &mut Input,
) -> Result<bool, Box<dyn Error>> {
    println!("Welcome to the street perception survey.");
    if session.settings().require_consent {
        println!("Your choices are recorded anonymously for research.");
        if !ask_yes(input, "Do you agree to take part? [y/N] ").await? {
            return Ok(false);
        }
        session.acknowledge_consent()?;
    }

    let role = loop {
        let Some(line) = ask(input, "Are you a resident or a tourist? ").await? else {
            return Ok(false);
        };
        match line.parse::<ParticipantRole>() {
            Ok(role) => break role,
            Err(_) => println!("Please answer 'resident' or 'tourist'."),
        }
    };

    let language = loop {
        let Some(line) = ask(input, "Preferred language (blank to skip): ").await? else {
            return Ok(false);
        };
        if line.is_empty() {
            break None;
        }
        match Locale::new(&line) {
            Ok(locale) => break Some(locale),
            Err(err) => println!("{err}"),
        }
    };

    session.begin(role, language, sequencer)?;
    Ok(true)
}

async fn vote(
    session: &mut SurveySession,
    sequencer: &mut TrialSequencer,
    catalog: &ItemCatalog,
    handler: &CastVoteHandler,
    input: &mut Input,
) -> Result<Outcome, Box<dyn Error>> {
    loop {
        let position = session.consumed_count() + 1;
        let target = session.target_count();
        let trial = session.current_trial(sequencer, catalog)?.clone();

        println!();
        println!("[{position}/{target}] {}", trial.prompt());
        println!("  l) {}", trial.left());
        println!("  r) {}", trial.right());
        let Some(line) = ask(input, "Choose l/r, b(ack), s(kip), q(uit): ").await? else {
            return Ok(Outcome::Quit);
        };

        let chosen = match line.to_ascii_lowercase().as_str() {
            "l" | "left" => Side::Left,
            "r" | "right" => Side::Right,
            "b" | "back" => {
                match session.undo(&*sequencer) {
                    Ok(_) => println!("Took back your last choice."),
                    Err(SurveyError::EmptyLog) => println!("Nothing to take back yet."),
                    Err(err) => return Err(err.into()),
                }
                continue;
            }
            "s" | "skip" => {
                session.skip(&*sequencer)?;
                continue;
            }
            "q" | "quit" => return Ok(Outcome::Quit),
            _ => {
                println!("Unknown command.");
                continue;
            }
        };

        let result = handler
            .handle(session, &*sequencer, CastVoteCommand { chosen })
            .await?;
        if result.completed {
            return Ok(Outcome::Completed);
        }
    }
}

async fn ask(input: &mut Input, prompt: &str) -> Result<Option<String>, Box<dyn Error>> {
    use std::io::Write;
    print!("{prompt}");
    std::io::stdout().flush()?;
    Ok(input.next_line().await?.map(|line| line.trim().to_string()))
}

async fn ask_yes(input: &mut Input, prompt: &str) -> Result<bool, Box<dyn Error>> {
    let answer = ask(input, prompt).await?.unwrap_or_default();
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

async fn write_export(dir: &Path, export: &ExportArtifact) {
    let path = dir.join(&export.file_name);
    match tokio::fs::write(&path, &export.body).await {
        Ok(()) => println!("A copy of your answers was saved to {}.", path.display()),
        Err(err) => {
            error!(path = %path.display(), error = %err, "Could not write export file");
            println!("Your answers could not be saved. Copy them below:\n{}", export.body);
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| logging.level.clone()),
    );

    if logging.is_json() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
