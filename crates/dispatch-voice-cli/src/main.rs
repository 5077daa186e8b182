//! Operator console for the dispatch voice alert engine

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dispatch_voice_core::bridge::{self, BridgeEvent};
use dispatch_voice_core::voice_manager::resolve_voice;
use dispatch_voice_core::{
    AlertTriggers, AlertType, AudioContext, CommandSpeechProvider, ConfigStore, Department,
    FileStore, KeyValueStore, MemoryStore, Priority, SpeakOptions, TonePattern, ToneSynthesizer,
    VoiceAlertEngine, VoiceCatalog, VoiceConfigUpdate, VoiceManager,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Dispatch voice alerts from the command line")]
struct Cli {
    /// Directory holding the config and preset files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Keep all state in memory for this run
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Local synthesizer program
    #[arg(long, global = true, default_value = "espeak-ng")]
    synth: String,

    /// Output device for tones and cloud speech (name substring)
    #[arg(long, global = true)]
    output_device: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Speak a line of text
    Say {
        text: String,
        #[arg(short, long, default_value = "normal")]
        priority: String,
        #[arg(short = 't', long = "type", default_value = "notification")]
        alert_type: String,
        #[arg(short, long)]
        department: Option<String>,
        /// Supervisor override: bypasses mute and the queue
        #[arg(long = "override")]
        supervisor_override: bool,
        /// Skip the tone cue
        #[arg(long)]
        no_tone: bool,
    },
    /// Speak the diagnostic sentence
    Test,
    /// Play a tone cue
    Tone {
        #[arg(default_value = "info")]
        pattern: String,
    },
    /// Route a named event as if raised by another component
    Event {
        name: String,
        /// JSON payload
        detail: String,
    },
    /// Show or change the configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// Manage saved presets
    Presets {
        #[command(subcommand)]
        action: Option<PresetAction>,
    },
    /// List local voices
    Voices {
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Run a short burst of typical dispatch traffic
    Demo,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the active configuration
    Show,
    /// Merge a JSON object of settings over the active configuration
    Set { json: String },
    /// Flip the master switch
    Toggle,
}

#[derive(Subcommand)]
enum PresetAction {
    /// List presets
    List,
    /// Save the active configuration
    Save { name: String },
    /// Apply a preset
    Load { id: String },
    /// Delete a preset
    Delete { id: String },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("DISPATCH_VOICE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_store(cli: &Cli) -> Result<ConfigStore> {
    let store: Arc<dyn KeyValueStore> = if cli.ephemeral {
        Arc::new(MemoryStore::new())
    } else if let Some(dir) = &cli.data_dir {
        Arc::new(FileStore::new(dir))
    } else {
        Arc::new(FileStore::new_with_default_dir()?)
    };
    Ok(ConfigStore::new(store))
}

#[cfg(feature = "native-audio")]
fn audio_context(cli: &Cli) -> Arc<AudioContext> {
    Arc::new(AudioContext::with_native_output(cli.output_device.clone()))
}

#[cfg(not(feature = "native-audio"))]
fn audio_context(cli: &Cli) -> Arc<AudioContext> {
    tracing::warn!("Built without the native-audio feature; tone cues and cloud speech are not audible");
    if cli.output_device.is_some() {
        tracing::warn!("--output-device has no effect without the native-audio feature");
    }
    Arc::new(AudioContext::with_default_device())
}

fn build_engine(cli: &Cli) -> Result<VoiceAlertEngine> {
    Ok(VoiceAlertEngine::builder()
        .store(open_store(cli)?)
        .audio_context(audio_context(cli))
        .local_provider(Arc::new(CommandSpeechProvider::new(cli.synth.clone())))
        .build())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if let Commands::Tone { pattern } = &cli.command {
        play_tone(audio_context(&cli), pattern).await;
        return Ok(());
    }
    if let Commands::Voices { language } = &cli.command {
        list_voices(language.as_deref());
        return Ok(());
    }

    let engine = build_engine(&cli)?;
    let result = run(&cli.command, &engine);
    engine.wait_until_idle().await;
    engine.shutdown().await;
    result
}

fn run(command: &Commands, engine: &VoiceAlertEngine) -> Result<()> {
    match command {
        Commands::Say {
            text,
            priority,
            alert_type,
            department,
            supervisor_override,
            no_tone,
        } => {
            let mut options =
                SpeakOptions::new(priority.parse::<Priority>()?, alert_type.parse::<AlertType>()?)
                    .with_sound_effect(!no_tone);
            if let Some(department) = department {
                options = options.with_department(department.parse::<Department>()?);
            }
            if *supervisor_override {
                options = options.with_supervisor_override();
            }
            report(engine.speak(text.as_str(), options));
        }
        Commands::Test => report(engine.test_voice()),
        Commands::Event { name, detail } => {
            let event = BridgeEvent {
                name: name.clone(),
                detail: serde_json::from_str(detail).context("Event detail must be JSON")?,
            };
            report(bridge::route(&AlertTriggers::new(engine.clone()), &event)?);
        }
        Commands::Config { action } => match action.as_ref().unwrap_or(&ConfigAction::Show) {
            ConfigAction::Show => println!("{}", serde_json::to_string_pretty(&engine.config())?),
            ConfigAction::Set { json } => {
                let update: VoiceConfigUpdate =
                    serde_json::from_str(json).context("Settings must be a JSON object")?;
                if update.is_empty() {
                    bail!("No recognised settings in {json}");
                }
                let config = engine.update_config(&update)?;
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigAction::Toggle => {
                let enabled = engine.toggle();
                println!("Voice alerts {}", if enabled { "enabled" } else { "disabled" });
            }
        },
        Commands::Presets { action } => match action.as_ref().unwrap_or(&PresetAction::List) {
            PresetAction::List => {
                for preset in engine.presets() {
                    println!(
                        "{}  {}  {}",
                        preset.id,
                        preset.created_at.format("%Y-%m-%d %H:%M"),
                        preset.name
                    );
                }
            }
            PresetAction::Save { name } => {
                let preset = engine.save_preset(name)?;
                println!("Saved preset {} ({})", preset.name, preset.id);
            }
            PresetAction::Load { id } => {
                engine.load_preset(id)?;
                println!("Loaded preset {id}");
            }
            PresetAction::Delete { id } => {
                engine.delete_preset(id)?;
                println!("Deleted preset {id}");
            }
        },
        Commands::Demo => run_demo(engine),
        Commands::Tone { .. } | Commands::Voices { .. } => {}
    }
    Ok(())
}

fn report<T: std::fmt::Display>(id: Option<T>) {
    match id {
        Some(id) => info!("Queued alert {}", id),
        None => println!("Alert dropped (voice alerts disabled or alert type switched off)"),
    }
}

fn run_demo(engine: &VoiceAlertEngine) {
    let triggers = AlertTriggers::new(engine.clone());
    triggers.announce_unit_available("14");
    triggers.announce_new_call(
        "24-1001",
        "Burglary in progress",
        "HIGH",
        "5th and Main",
        Some(Department::Police),
    );
    triggers.announce_shift_start("B", 15);
    triggers.announce_bolo_hit("7ABC123", "armed robbery suspect", "Highway 9 northbound");
    triggers.announce_medical_emergency("24-1002", "cardiac arrest", "220 Oak Street");
    triggers.announce_panic_button("12", "Riverside Park", Some(Department::Police));
    info!("Demo queued; {} alerts pending", engine.queue_len());
}

async fn play_tone(context: Arc<AudioContext>, name: &str) {
    let pattern = TonePattern::from_name(name);
    let config = dispatch_voice_core::VoiceConfig::default();
    let tones = ToneSynthesizer::new(context, config.sound_effects);
    info!("Playing {:?} cue ({} ms)", pattern, pattern.total_duration().as_millis());
    tones.play(pattern).await;
}

fn list_voices(language: Option<&str>) {
    let manager = VoiceManager::new();
    let voices = match language {
        Some(language) => manager.get_voices_by_language(language),
        None => manager.list_available_voices(),
    };
    let preferred = resolve_voice(&voices, "", language.unwrap_or("en-US")).map(|v| v.id);
    for voice in voices {
        let marker = if preferred.as_deref() == Some(voice.id.as_str()) { "*" } else { " " };
        println!(
            "{marker} {:<10} {:<8} {:<7} {}",
            voice.id,
            voice.language,
            voice.gender.to_string(),
            voice.name
        );
    }
}
