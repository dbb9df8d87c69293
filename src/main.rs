use clap::{Args, Parser, Subcommand};
use std::{
    error::Error,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing_subscriber::EnvFilter;
use wordladder::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore, SettingsPatch},
    dictionary::{DictionaryPort, TimeoutDictionary, WordListDictionary},
    engine::LadderEngine,
    ladder::{Difficulty, LadderState},
    runtime::{run_countdown, FixedTicker, InputSource, LadderEvent, Runner, StdinSource},
    stats::{SessionStats, TimeAttackStats},
    store::{load_json, PersistencePort, SqliteStore, StoreKey},
    time_attack::TimeAttackEngine,
    util::format_clock,
};

/// How often the time attack loop reminds the player of the clock.
const CLOCK_REMINDER_SECS: u32 = 15;

/// word ladder puzzles in the terminal
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Change one letter at a time to turn the start word into the target word. Play classic ladders at your own pace or race the clock in time attack."
)]
pub struct Cli {
    /// directory for the saved state and config (defaults to the platform dirs)
    #[clap(long, global = true)]
    data_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// play a classic ladder (a random one unless --start and --end are given)
    Play(PlayArgs),
    /// solve as many ladders as possible before the clock runs out
    TimeAttack {
        /// session length in seconds (defaults to the configured length)
        #[clap(short, long)]
        secs: Option<u32>,

        /// word difficulty for this session
        #[clap(short, long, value_enum)]
        difficulty: Option<Difficulty>,
    },
    /// show classic and time attack statistics
    Stats,
    /// show or change settings
    Settings {
        #[clap(long, value_enum)]
        difficulty: Option<Difficulty>,

        #[clap(long)]
        sound_effects: Option<bool>,

        #[clap(long)]
        hints: Option<bool>,
    },
}

#[derive(Args, Debug, Default)]
struct PlayArgs {
    /// start word
    #[clap(long, requires = "end")]
    start: Option<String>,

    /// target word
    #[clap(long, requires = "start")]
    end: Option<String>,

    /// continue the saved game
    #[clap(long, conflicts_with_all = ["start", "end"])]
    resume: bool,

    /// word difficulty for a random ladder
    #[clap(short, long, value_enum)]
    difficulty: Option<Difficulty>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
}

fn open_stores(data_dir: Option<&Path>) -> Result<(FileConfigStore, SqliteStore), Box<dyn Error>> {
    match data_dir {
        Some(dir) => {
            let (db_path, config_path) = AppDirs::within(dir);
            Ok((FileConfigStore::with_path(config_path), SqliteStore::open(db_path)?))
        }
        None => Ok((FileConfigStore::new(), SqliteStore::new()?)),
    }
}

fn open_dictionary(config: &Config) -> Result<Arc<dyn DictionaryPort>, Box<dyn Error>> {
    let words = WordListDictionary::embedded().map_err(|e| e as Box<dyn Error>)?;
    Ok(Arc::new(TimeoutDictionary::new(
        words,
        config.dictionary_timeout(),
    )))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();

    let (config_store, store) = open_stores(cli.data_dir.as_deref())?;
    let store: Arc<dyn PersistencePort> = Arc::new(store);
    let mut config = config_store.load();

    match cli.command.unwrap_or(Command::Play(PlayArgs::default())) {
        Command::Play(args) => {
            let engine = LadderEngine::new(open_dictionary(&config)?, store, &config);
            play(&engine, &config, args).await
        }
        Command::TimeAttack { secs, difficulty } => {
            config.time_attack_secs = secs.unwrap_or(config.time_attack_secs);
            config.difficulty = difficulty.unwrap_or(config.difficulty);
            let engine = Arc::new(TimeAttackEngine::new(
                open_dictionary(&config)?,
                store,
                &config,
            ));
            time_attack(engine, &config).await
        }
        Command::Stats => {
            print_stats(store.as_ref());
            Ok(())
        }
        Command::Settings {
            difficulty,
            sound_effects,
            hints,
        } => {
            let patch = SettingsPatch {
                difficulty,
                sound_effects,
                hints,
            };
            if !patch.is_empty() {
                config.apply(&patch);
                config_store.save(&config)?;
            }
            print_settings(&config);
            Ok(())
        }
    }
}

async fn play(engine: &LadderEngine, config: &Config, args: PlayArgs) -> Result<(), Box<dyn Error>> {
    if args.resume {
        if !engine.has_saved_game() {
            println!("No saved game to resume.");
            return Ok(());
        }
    } else if let (Some(start), Some(end)) = (args.start.as_deref(), args.end.as_deref()) {
        let difficulty = args
            .difficulty
            .unwrap_or_else(|| Difficulty::for_length(start.trim().chars().count()));
        engine.start(start, end, difficulty)?;
    } else {
        engine
            .start_random(args.difficulty.unwrap_or(config.difficulty))
            .await?;
    }

    let Some(ladder) = engine.snapshot() else {
        return Ok(());
    };
    println!(
        "{} -> {} ({}, {} moves at best)",
        ladder.start_word,
        ladder.end_word,
        ladder.difficulty,
        ladder.optimal_moves()
    );
    println!("Commands: :undo :reset :hint :abandon :quit");
    print_chain(&ladder);

    let mut input = StdinSource::new();
    while let Some(line) = input.next_line().await {
        match line.trim() {
            ":quit" => {
                println!("Game saved. Continue with `play --resume`.");
                break;
            }
            ":abandon" => {
                engine.abandon();
                println!("Ladder abandoned.");
                break;
            }
            ":undo" => {
                if engine.undo() {
                    print_snapshot(engine);
                } else {
                    println!("Nothing to undo.");
                }
            }
            ":reset" => {
                engine.reset();
                print_snapshot(engine);
            }
            ":hint" => {
                if !config.hints {
                    println!("Hints are turned off.");
                    continue;
                }
                let hints = engine.hints().await;
                if hints.is_empty() {
                    println!("No hints available.");
                } else {
                    println!("Try: {}", hints.join(", "));
                }
            }
            word => match engine.submit_word(word).await {
                Ok(accepted) if accepted.completed => {
                    print_snapshot(engine);
                    if let Some(ladder) = engine.snapshot() {
                        println!(
                            "{}Solved {} -> {} in {} moves ({})!",
                            bell(config),
                            ladder.start_word,
                            ladder.end_word,
                            ladder.moves,
                            format_clock(engine.elapsed_secs())
                        );
                    }
                    print_classic_stats(&engine.stats());
                    break;
                }
                Ok(_) => print_snapshot(engine),
                Err(e) => println!("{e}"),
            },
        }
    }

    Ok(())
}

async fn time_attack(engine: Arc<TimeAttackEngine>, config: &Config) -> Result<(), Box<dyn Error>> {
    println!(
        "Time attack: {} seconds, {} words. Type :quit to stop.",
        config.time_attack_secs, config.difficulty
    );
    if let Err(e) = engine.start_session().await {
        println!("{e}");
        return Ok(());
    }
    print_current_ladder(&engine);

    let clock = tokio::spawn(run_countdown(engine.clone(), FixedTicker::per_second()));
    let mut runner = Runner::new(StdinSource::new(), FixedTicker::per_second());

    while engine.is_active() {
        match runner.step().await {
            LadderEvent::Input(line) => match line.trim() {
                ":quit" => {
                    engine.end_session();
                }
                word => match engine.submit_word(word).await {
                    Ok(accepted) if accepted.completed => {
                        let session = engine.snapshot();
                        println!("{}Solved! Score: {}", bell(config), session.score);
                        print_current_ladder(&engine);
                    }
                    Ok(accepted) => {
                        let marker = match accepted.item.is_optimal_step {
                            Some(false) => " (away from the target)",
                            _ => "",
                        };
                        if let Some(ladder) = engine.snapshot().current_ladder {
                            println!("{}{marker}", ladder_line(&ladder));
                        }
                    }
                    Err(e) => println!("{e}"),
                },
            },
            LadderEvent::Tick => {
                let session = engine.snapshot();
                if session.is_active && session.remaining_time % CLOCK_REMINDER_SECS == 0 {
                    println!(
                        "{} left, score {}",
                        format_clock(session.remaining_time.into()),
                        session.score
                    );
                }
            }
            LadderEvent::Closed => {
                engine.end_session();
            }
        }
    }
    clock.await?;

    let session = engine.snapshot();
    println!("Session over! Final score: {}", session.score);
    let stats = engine.stats();
    println!(
        "Sessions played: {}  Highest score: {}  Ladders solved: {}",
        stats.sessions_played, stats.highest_score, stats.total_words_solved
    );
    Ok(())
}

fn bell(config: &Config) -> &'static str {
    if config.sound_effects {
        "\x07"
    } else {
        ""
    }
}

fn ladder_line(ladder: &LadderState) -> String {
    let words: Vec<&str> = ladder.chain.iter().map(|item| item.word.as_str()).collect();
    format!("{}  [{}%]", words.join(" > "), ladder.progress())
}

fn print_chain(ladder: &LadderState) {
    println!("{}", ladder_line(ladder));
}

fn print_snapshot(engine: &LadderEngine) {
    if let Some(ladder) = engine.snapshot() {
        print_chain(&ladder);
    }
}

fn print_current_ladder(engine: &TimeAttackEngine) {
    if let Some(ladder) = engine.snapshot().current_ladder {
        println!("Next: {} -> {}", ladder.start_word, ladder.end_word);
    }
}

fn print_classic_stats(stats: &SessionStats) {
    println!(
        "Games won: {}  Win rate: {}%  Best time: {}  Average steps: {}  Longest chain: {}",
        stats.games_won,
        stats.win_rate(),
        format_clock(stats.best_time),
        stats.average_steps,
        stats.longest_chain
    );
}

fn print_stats(store: &dyn PersistencePort) {
    let classic: SessionStats = load_json(store, StoreKey::ClassicStats).unwrap_or_default();
    let timed: TimeAttackStats = load_json(store, StoreKey::TimeAttackStats).unwrap_or_default();

    println!("Classic");
    print_classic_stats(&classic);
    println!("Time attack");
    println!(
        "Sessions played: {}  Highest score: {}  Ladders solved: {}",
        timed.sessions_played, timed.highest_score, timed.total_words_solved
    );
}

fn print_settings(config: &Config) {
    println!("difficulty = {}", config.difficulty);
    println!("sound_effects = {}", config.sound_effects);
    println!("hints = {}", config.hints);
    println!("time_attack_secs = {}", config.time_attack_secs);
}
