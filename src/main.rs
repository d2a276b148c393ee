use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use magic_mirror::voice::{
    AudioCapture, AudioPlayback, PLAYBACK_SAMPLE_RATE, TypedInput, calculate_rms,
};
use magic_mirror::{Config, SpeechInput, SpeechOutput, live_session, mirror};

/// Magic Mirror - talk to your mirror, and let it look at you
#[derive(Parser)]
#[command(name = "mirror", version, about)]
struct Cli {
    /// Path to a config file (defaults to ~/.config/magic-mirror/config.toml)
    #[arg(short, long, env = "MIRROR_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Type utterances instead of speaking them
    #[arg(long)]
    typed: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Mirror, mirror, on the wall. This is a test of my voice.")]
        text: String,
    },
    /// Capture one frame from the camera
    TestCamera {
        /// Where to write the frame
        #[arg(short, long, default_value = "capture.jpg")]
        out: PathBuf,
    },
    /// Ask the mirror one question
    Ask {
        /// The question
        text: String,
        /// Let the mirror look at you before answering
        #[arg(long)]
        see: bool,
    },
    /// Let the mirror look at you once
    Look {
        /// What to ask about your appearance
        #[arg(default_value = "what do you think of me")]
        prompt: String,
    },
    /// Print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,magic_mirror=info",
        1 => "info,magic_mirror=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestSpeaker => test_speaker().await,
            Command::TestTts { text } => test_tts(&config, &text).await,
            Command::TestCamera { out } => test_camera(&config, &out).await,
            Command::Ask { text, see } => ask(&config, &text, see).await,
            Command::Look { prompt } => look(&config, &prompt).await,
            Command::Config => {
                println!("{config:#?}");
                Ok(())
            }
        };
    }

    tracing::info!(
        ollama_url = %config.ollama_url,
        speech_url = %config.speech_url,
        typed = cli.typed,
        "starting magic mirror"
    );

    if cli.typed {
        run_mirror(&config, TypedInput::stdin()).await
    } else {
        run_mirror(&config, mirror::microphone(&config)?).await
    }
}

/// Run the turn loop until farewell or Ctrl-C
async fn run_mirror<I: SpeechInput>(config: &Config, input: I) -> anyhow::Result<()> {
    let mut session = live_session(config, input)?;

    tokio::select! {
        turns = session.run() => {
            tracing::info!(turns, "mirror asleep");
        }
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("interrupted");
        }
    }

    Ok(())
}

/// One chat turn, optionally with what the camera sees
async fn ask(config: &Config, text: &str, see: bool) -> anyhow::Result<()> {
    let mut session = live_session(config, TypedInput::new(tokio::io::empty()))?;

    let visual = if see {
        let prompt = session.persona().vision_request(text);
        match session.observe(&prompt).await {
            Ok(description) => Some(description),
            Err(e) => {
                tracing::warn!(error = %e, "could not look before answering");
                None
            }
        }
    } else {
        None
    };

    let outcome = session.ask_with_context(text, visual.as_deref()).await;
    println!("{outcome:?}");
    Ok(())
}

/// One vision turn
async fn look(config: &Config, prompt: &str) -> anyhow::Result<()> {
    let mut session = live_session(config, TypedInput::new(tokio::io::empty()))?;
    let outcome = session.look(&prompt.to_lowercase()).await;
    println!("{outcome:?}");
    Ok(())
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new()?;
    capture.start()?;

    let sample_rate = capture.sample_rate();
    println!("Sample rate: {sample_rate} Hz");
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.take_buffer();
        let energy = calculate_rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        // Visual meter
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "█".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );
    }

    capture.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check:");
    println!("  1. Is your mic plugged in?");
    println!("  2. Run: pactl info | grep 'Default Source'");
    println!("  3. Run: arecord -l (to list devices)");

    Ok(())
}

/// Test speaker output with a sine wave
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let frequency = 440.0_f32;
    let duration_secs = 2.0_f32;
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let num_samples = (PLAYBACK_SAMPLE_RATE as f32 * duration_secs) as usize;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / PLAYBACK_SAMPLE_RATE as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3 // 30% volume
        })
        .collect();

    println!("Playing {} samples at {PLAYBACK_SAMPLE_RATE} Hz...", samples.len());

    tokio::task::spawn_blocking(move || AudioPlayback::new()?.play_samples_blocking(samples))
        .await??;

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");
    println!("If you didn't hear anything, check:");
    println!("  1. Run: pactl info | grep 'Default Sink'");
    println!("  2. Run: pactl list sinks short");

    Ok(())
}

/// Test TTS output against the speech service
async fn test_tts(config: &Config, text: &str) -> anyhow::Result<()> {
    println!("Testing TTS at {} with text: \"{text}\"\n", config.speech_url);

    mirror::speaker(config).speak(text).await;

    println!("\n---");
    println!("If you heard the speech, TTS is working!");
    println!("If not, run with -v to see the synthesis error.");

    Ok(())
}

/// Capture one frame to a file
async fn test_camera(config: &Config, out: &std::path::Path) -> anyhow::Result<()> {
    println!(
        "Capturing from {} ({})...",
        config.camera.device, config.camera.input_format
    );

    let frame = magic_mirror::Camera::new(config.camera.clone())
        .capture()
        .await?;
    tokio::fs::write(out, &frame.bytes).await?;

    println!("Wrote {} bytes to {}", frame.bytes.len(), out.display());
    Ok(())
}
