use std::io::Write;
use std::ops::ControlFlow;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio::io::AsyncBufReadExt;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use soundbox::{probe_clip, Dispatcher, RodioBackend, SoundboxConfig};

#[derive(Parser)]
#[command(name = "soundbox")]
#[command(about = "A terminal soundboard that plays clips one after another")]
#[command(version)]
struct Cli {
    /// TOML file describing the title, sounds directory and buttons
    #[arg(short, long, global = true, env = "SOUNDBOX_CONFIG")]
    config: Option<PathBuf>,

    /// Directory the clip files are loaded from
    #[arg(short, long, global = true, env = "SOUNDBOX_SOUNDS_DIR")]
    sounds_dir: Option<PathBuf>,

    /// Playback volume (0.0 to 1.0)
    #[arg(long, global = true)]
    volume: Option<f32>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Press buttons interactively (default)
    Run,
    /// Queue buttons or clip files in order and wait until they have all played
    Play {
        /// Button numbers, button labels or clip file names
        #[arg(required = true)]
        clips: Vec<String>,
    },
    /// List the configured buttons
    Buttons,
}

struct SoundboxApp {
    config: SoundboxConfig,
    dispatcher: Dispatcher<RodioBackend>,
}

impl SoundboxApp {
    fn new(config: SoundboxConfig) -> Result<Self> {
        let backend = RodioBackend::new(config.sounds_dir.clone(), config.volume)
            .context("Failed to open audio output")?;

        Ok(Self {
            config,
            dispatcher: Dispatcher::new(backend),
        })
    }

    fn press(&mut self, input: &str) {
        let clip = self.config.resolve_clip(input).to_string();
        match self.dispatcher.play_clip(&clip) {
            Ok(id) => info!(request = id, clip = %clip, "queued"),
            Err(e) => eprintln!("{} {}", "Error:".red(), e),
        }
    }

    fn handle_list(&self) {
        println!("{}", self.dispatcher.scheduler().display_queue());
    }

    async fn handle_play(&mut self, clips: &[String]) -> Result<()> {
        for input in clips {
            self.press(input);
        }
        self.dispatcher.run_until_idle().await
    }

    async fn handle_interactive(&mut self) -> Result<()> {
        println!("{}", self.config.title.bold());
        print_buttons(&self.config);
        println!("Type a button number or label. Other commands: list, buttons, quit");

        let stdin = tokio::io::stdin();
        let mut lines = tokio::io::BufReader::new(stdin).lines();

        prompt()?;
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read input")? else {
                        break;
                    };
                    if self.handle_line(line.trim()).is_break() {
                        break;
                    }
                    prompt()?;
                }
                Some(event) = self.dispatcher.next_event() => {
                    if self.dispatcher.handle_event(event).is_break() {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    println!();
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> ControlFlow<()> {
        match line {
            "" => {}
            "quit" | "exit" => return ControlFlow::Break(()),
            "list" => self.handle_list(),
            "buttons" => print_buttons(&self.config),
            input => {
                if self.config.find_button(input).is_some() {
                    self.press(input);
                } else {
                    eprintln!("Unknown button: {}", input);
                }
            }
        }
        ControlFlow::Continue(())
    }
}

fn prompt() -> Result<()> {
    print!("soundbox> ");
    std::io::stdout().flush().context("Failed to flush stdout")
}

fn print_buttons(config: &SoundboxConfig) {
    for (index, button) in config.buttons.iter().enumerate() {
        println!("  [{}] {}", (index + 1).to_string().as_str().cyan(), button.label);
    }
}

fn handle_buttons(config: &SoundboxConfig) {
    println!("{}", config.title.bold());
    for (index, button) in config.buttons.iter().enumerate() {
        let path = config.sounds_dir.join(&button.clip);
        let detail = match probe_clip(&path) {
            Ok(info) => info.to_string().as_str().green(),
            Err(e) => e.to_string().as_str().red(),
        };
        println!("  [{}] {:<16} {}", index + 1, button.label, detail);
    }
}

fn load_config(cli: &Cli) -> Result<SoundboxConfig> {
    let mut config = SoundboxConfig::load_or_default(cli.config.as_deref())?;

    if let Some(dir) = &cli.sounds_dir {
        config.sounds_dir = dir.clone();
    }
    if let Some(volume) = cli.volume {
        config.volume = volume;
    }

    config.validate()?;
    if !config.sounds_dir.is_dir() {
        warn!(sounds_dir = %config.sounds_dir.display(), "sounds directory does not exist");
    }
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soundbox=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Buttons => handle_buttons(&config),
        Commands::Play { clips } => {
            let mut app = SoundboxApp::new(config)?;
            app.handle_play(&clips).await?;
        }
        Commands::Run => {
            let mut app = SoundboxApp::new(config)?;
            app.handle_interactive().await?;
        }
    }

    Ok(())
}
