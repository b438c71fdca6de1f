//! Lightsouls - Entry Point
//!
//! Runs a boss battle (or the generated ten-round adventure) in the terminal.
//! Virtual time is advanced in small steps, so reveals and delays play out
//! instantly while keeping their order.

use lightsouls::adventure::{Adventure, AdventureEvent, AdventurePhase};
use lightsouls::combat::{Action, BossProfile, BossRoster, Outcome, RngDice};
use lightsouls::core::config::{GameConfig, TimingConfig};
use lightsouls::core::error::{GameError, Result};
use lightsouls::llm::story::{LlmStoryGenerator, MAX_ROUNDS};
use lightsouls::session::{BattleSession, SessionEvent};
use lightsouls::speech::{
    AudioClip, AudioSink, SpeechClient, SpeechController, SpeechSynthesizer, SpeechTicket,
};

use clap::{Parser, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

/// Virtual milliseconds per presentation step
const STEP_MS: u64 = 100;

type SeededDice = RngDice<rand_chacha::ChaCha8Rng>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Battle,
    Adventure,
}

/// Lightsouls - turn-based boss battles
#[derive(Parser, Debug)]
#[command(name = "lightsouls")]
#[command(about = "Fight a boss, or walk the ten-round path")]
struct Args {
    /// Timing and speech config (TOML)
    #[arg(long, default_value = "lightsouls.toml")]
    config: PathBuf,

    /// Boss roster (TOML); falls back to the built-in roster
    #[arg(long, default_value = lightsouls::combat::boss::DEFAULT_ROSTER_PATH)]
    roster: PathBuf,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = Mode::Battle)]
    mode: Mode,

    /// Directory to write synthesized narration audio into
    #[arg(long, default_value = "speech")]
    speech_dir: PathBuf,
}

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lightsouls=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = if args.config.exists() {
        GameConfig::load(&args.config)?
    } else {
        tracing::debug!("No config at {:?}, using defaults", args.config);
        GameConfig::default()
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!("Lightsouls starting (seed {})", seed);
    let dice = RngDice::seeded(seed);

    // Create the async runtime for network calls
    let rt = Runtime::new()?;

    match args.mode {
        Mode::Battle => run_battle(&rt, &args, config, dice),
        Mode::Adventure => run_adventure(&rt, config.timing, dice),
    }
}

fn load_roster(path: &Path) -> BossRoster {
    match BossRoster::load(path) {
        Ok(roster) => roster,
        Err(e) => {
            tracing::warn!("{} - using built-in roster", e);
            BossRoster::default()
        }
    }
}

fn pick_boss(roster: &BossRoster, dice: &mut SeededDice) -> Result<BossProfile> {
    roster
        .choose(dice)
        .ok_or_else(|| GameError::ConfigError("Roster has no bosses".into()))
}

fn run_battle(
    rt: &Runtime,
    args: &Args,
    config: GameConfig,
    mut dice: SeededDice,
) -> Result<()> {
    let roster = load_roster(&args.roster);
    let boss = pick_boss(&roster, &mut dice)?;
    let mut session = BattleSession::new(boss, config.timing.clone());

    // Speech is optional - works without it
    let speech_client = SpeechClient::from_env(config.speech.clone()).ok();
    if speech_client.is_none() {
        tracing::warn!("TTS_API_KEY not set - narration will not be voiced");
    }
    let mut speech = SpeechController::new(FileSink::new(args.speech_dir.clone()));

    println!("\n=== LIGHTSOULS ===");
    println!("Boss: {}", session.encounter().boss().name);
    println!();
    println!("Commands:");
    println!("  attack / a      - Strike the boss");
    println!("  dodge / d       - Try to evade and counter");
    println!("  heal / h        - Drink a flask");
    println!("  special / s     - Special attack (3 turn cooldown)");
    println!("  status          - Show health and cooldowns");
    println!("  log             - Show the battle log");
    if speech_client.is_some() {
        println!("  voice / v       - Play, pause or resume the narration");
    }
    println!("  restart / r     - Fight a new boss once the battle ends");
    println!("  quit / q        - Exit the game");
    println!();

    settle(&mut session);

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim().to_lowercase();

        match input.as_str() {
            "" => continue,
            "quit" | "q" => break,
            "status" => display_status(&session),
            "log" => {
                for line in session.encounter().battle_log() {
                    println!("  {}", line);
                }
            }
            "voice" | "v" => match &speech_client {
                Some(client) => toggle_speech(rt, &mut speech, client, session.current_text()),
                None => println!("Speech is not configured."),
            },
            "restart" | "r" => {
                let boss = pick_boss(&roster, &mut dice)?;
                match session.restart(boss) {
                    Ok(()) => {
                        speech.cancel();
                        println!("\nBoss: {}", session.encounter().boss().name);
                        settle(&mut session);
                    }
                    Err(e) => println!("{}", e),
                }
            }
            other => match other.parse::<Action>() {
                Ok(action) => match session.choose(action, &mut dice) {
                    Ok(_) => {
                        speech.cancel();
                        settle(&mut session);
                    }
                    Err(e) => println!("{}", e),
                },
                Err(e) => println!("{}", e),
            },
        }
    }

    Ok(())
}

/// Advance until the player can act again or the battle is over
fn settle(session: &mut BattleSession) {
    let mut events = session.take_events();
    loop {
        for event in events.drain(..) {
            match event {
                SessionEvent::TextChanged(text) => println!("\n{}", text),
                SessionEvent::EnrageBanner(banner) => println!("\n!!! {} !!!", banner),
                SessionEvent::Concluded(Outcome::Victory) => println!("\n--- VICTORY ---"),
                SessionEvent::Concluded(_) => println!("\n--- YOU DIED ---"),
                SessionEvent::InputUnlocked => {
                    let actions: Vec<&str> =
                        session.available_actions().iter().map(|a| a.label()).collect();
                    println!("\nChoose: {}", actions.join(", "));
                    return;
                }
                SessionEvent::ResetUnlocked => {
                    println!("\nType 'restart' to face another boss.");
                    return;
                }
                SessionEvent::RevealStarted | SessionEvent::RevealCompleted => {}
            }
        }
        events = session.advance(STEP_MS);
    }
}

fn display_status(session: &BattleSession) {
    let state = session.encounter().state();
    println!("  Turn: {}", state.turn);
    println!("  Your health: {}", state.player_health);
    println!("  {} health: {}", session.encounter().boss().name, state.boss_health);
    if state.enraged {
        println!("  The boss is ENRAGED");
    }
    if state.special_cooldown > 0 {
        println!("  Special ready in {} turn(s)", state.special_cooldown);
    }
}

fn toggle_speech(
    rt: &Runtime,
    speech: &mut SpeechController<FileSink>,
    client: &SpeechClient,
    text: &str,
) {
    match speech.toggle(text) {
        Ok(Some(ticket)) => {
            println!("Generating narration audio...");
            let audio = rt.block_on(client.synthesize(text));
            if let Err(e) = speech.finish_generation(ticket, audio) {
                println!("Speech failed: {}", e);
            }
        }
        Ok(None) => println!("Speech {:?}", speech.status()),
        Err(e) => println!("{}", e),
    }
}

/// Writes each clip to its own file in place of playing it
struct FileSink {
    dir: PathBuf,
    written: u32,
}

impl FileSink {
    fn new(dir: PathBuf) -> Self {
        Self { dir, written: 0 }
    }
}

impl AudioSink for FileSink {
    fn play(&mut self, _ticket: SpeechTicket, clip: AudioClip) {
        self.written += 1;
        let path = self.dir.join(format!("narration-{:03}.mp3", self.written));
        let result =
            std::fs::create_dir_all(&self.dir).and_then(|_| std::fs::write(&path, &clip.bytes));
        match result {
            Ok(()) => println!("Narration audio written to {:?}", path),
            Err(e) => tracing::warn!("Failed to write narration audio: {}", e),
        }
    }

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn stop(&mut self) {}
}

fn run_adventure(
    rt: &Runtime,
    timing: TimingConfig,
    dice: SeededDice,
) -> Result<()> {
    let generator = LlmStoryGenerator::from_env()?;
    let wait = timing.next_round_delay_ms.max(timing.adventure_end_delay_ms);
    let mut adventure = Adventure::new(generator, dice, timing);

    println!("\n=== LIGHTSOULS: THE PATH ===");
    println!("Commands: start, 1 / 2 (pick a choice), retry, reset, quit");

    if let Err(e) = rt.block_on(adventure.load_backstory()) {
        println!("Could not reach the story teller: {}", e);
    }
    display_adventure(&adventure);

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let result = match input.trim() {
            "" => continue,
            "quit" | "q" => break,
            "start" => rt.block_on(adventure.start()),
            "retry" => rt.block_on(adventure.retry()),
            "reset" => rt.block_on(adventure.reset()),
            pick @ ("1" | "2") => {
                let index = if pick == "1" { 0 } else { 1 };
                match adventure.choose(index) {
                    Ok(choice) => {
                        println!("\n{}", choice.reason);
                        for event in rt.block_on(adventure.advance(wait)) {
                            if let AdventureEvent::FetchFailed(e) = event {
                                println!("The story falters: {}", e);
                            }
                        }
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
            _ => Err(GameError::InvalidAction(format!("Unknown command: {}", input.trim()))),
        };
        if let Err(e) = result {
            println!("{}", e);
        }
        display_adventure(&adventure);
    }

    Ok(())
}

fn display_adventure<G, D>(adventure: &Adventure<G, D>)
where
    G: lightsouls::llm::story::StoryGenerator,
    D: lightsouls::combat::Dice,
{
    match adventure.phase() {
        AdventurePhase::Loading => println!("\n..."),
        AdventurePhase::Backstory => {
            println!("\n{}", adventure.backstory().unwrap_or_default());
            println!("\nType 'start' to begin the journey.");
        }
        AdventurePhase::Round => {
            println!("\nRound {}/{}", adventure.round(), MAX_ROUNDS);
            println!("{}", adventure.story().unwrap_or_default());
            for (i, choice) in adventure.choices().iter().enumerate() {
                println!("  {}. {}", i + 1, choice.text);
            }
        }
        AdventurePhase::Reveal => {}
        AdventurePhase::FetchFailed => println!("\nType 'retry' to ask again."),
        AdventurePhase::Over { victory: true } => {
            println!("\nYou walked all ten rounds and live. Type 'reset' to begin anew.")
        }
        AdventurePhase::Over { victory: false } => {
            println!("\nThe path ends here. Type 'reset' to begin anew.")
        }
    }
}
