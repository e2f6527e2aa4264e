//! voice-cli: 翻译 / 语音转文字 / 文字转语音 命令行工具
//!
//! Usage:
//!   voice-cli translate <text> --from <lang> --to <lang>
//!   voice-cli languages
//!   voice-cli transcribe <audio-file> [--language <lang>] [--model <model>]
//!   voice-cli detect <audio-file>
//!   voice-cli stream <audio-file> [--language <lang>] [--chunk-bytes <n>]
//!   voice-cli synthesize <text> --out <file> [--language <lang>] [--voice <id>]
//!   voice-cli voices [--language <lang>]
//!   voice-cli health

use ai_voice_rust::{
    AudioInput, SessionEvent, SttOptions, TranslationRequest, TtsOptions, VoiceClient,
};
use anyhow::{anyhow, bail, Context};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "translate" => cmd_translate(&args[2..]).await,
        "languages" => cmd_languages().await,
        "transcribe" => cmd_transcribe(&args[2..]).await,
        "detect" => cmd_detect(&args[2..]).await,
        "stream" => cmd_stream(&args[2..]).await,
        "synthesize" => cmd_synthesize(&args[2..]).await,
        "voices" => cmd_voices(&args[2..]).await,
        "health" => cmd_health().await,
        "version" | "--version" | "-V" => {
            println!("voice-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"voice-cli: translation / speech-to-text / text-to-speech client

USAGE:
    voice-cli <COMMAND> [OPTIONS]

COMMANDS:
    translate <text> --from <lang> --to <lang>
    languages
    transcribe <audio-file> [--language <lang>] [--model <model>]
    detect <audio-file>
    stream <audio-file> [--language <lang>] [--chunk-bytes <n>]
    synthesize <text> --out <file> [--language <lang>] [--voice <id>]
    voices [--language <lang>]
    health
    version
    help

ENVIRONMENT:
    AI_VOICE_TRANSLATION_URL, AI_VOICE_STT_URL, AI_VOICE_TTS_URL
    AI_VOICE_TIMEOUT_SECS, AI_VOICE_RETRIES, AI_VOICE_RETRY_DELAY_MS
    AI_VOICE_API_KEY
    RUST_LOG                    Log filter (default: warn)"#
    );
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

/// First argument that is neither a flag nor a flag's value.
fn positional(args: &[String]) -> Option<&str> {
    let mut skip = false;
    for arg in args {
        if skip {
            skip = false;
            continue;
        }
        if arg.starts_with("--") {
            skip = true;
            continue;
        }
        return Some(arg.as_str());
    }
    None
}

fn client() -> anyhow::Result<VoiceClient> {
    VoiceClient::from_env().context("invalid client configuration")
}

async fn read_audio(args: &[String]) -> anyhow::Result<AudioInput> {
    let path = positional(args).ok_or_else(|| anyhow!("missing <audio-file>"))?;
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {path}"))?;
    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "audio.wav".to_string());
    Ok(AudioInput::wav(data).with_file_name(file_name))
}

fn stt_options(args: &[String]) -> SttOptions {
    SttOptions {
        language: flag(args, "--language").map(String::from),
        model: flag(args, "--model").map(String::from),
    }
}

async fn cmd_translate(args: &[String]) -> anyhow::Result<()> {
    let text = positional(args).ok_or_else(|| anyhow!("missing <text>"))?;
    let from = flag(args, "--from").ok_or_else(|| anyhow!("missing --from <lang>"))?;
    let to = flag(args, "--to").ok_or_else(|| anyhow!("missing --to <lang>"))?;
    let result = client()?
        .translate(&TranslationRequest::new(text, from, to))
        .await?;
    println!("{}", result.translated_text);
    println!(
        "  {} -> {} (confidence {:.2})",
        result.source_language, result.target_language, result.confidence
    );
    Ok(())
}

async fn cmd_languages() -> anyhow::Result<()> {
    let catalog = client()?.supported_languages().await?;
    for lang in catalog.supported_languages {
        println!("{:<6} {:<20} {}", lang.code, lang.name, lang.native_name);
    }
    Ok(())
}

async fn cmd_transcribe(args: &[String]) -> anyhow::Result<()> {
    let audio = read_audio(args).await?;
    let result = client()?.transcribe(&audio, &stt_options(args)).await?;
    println!("{}", result.text);
    if let Some(lang) = result.language {
        println!("  language: {lang}");
    }
    if let Some(duration) = result.duration {
        println!("  duration: {duration:.1}s");
    }
    Ok(())
}

async fn cmd_detect(args: &[String]) -> anyhow::Result<()> {
    let audio = read_audio(args).await?;
    let result = client()?.detect_language(&audio).await?;
    println!(
        "{} (confidence {:.2})",
        result.detected_language, result.confidence
    );
    Ok(())
}

async fn cmd_stream(args: &[String]) -> anyhow::Result<()> {
    let audio = read_audio(args).await?;
    let chunk_bytes = flag(args, "--chunk-bytes")
        .map(|s| s.parse::<usize>())
        .transpose()
        .context("--chunk-bytes must be a positive integer")?
        .unwrap_or(3200)
        .max(1);

    let client = client()?;
    let (session, mut events) = client.transcribe_stream(&stt_options(args))?;
    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::Opened => {
                for chunk in audio.data.chunks(chunk_bytes) {
                    session.send(chunk);
                    // Pace roughly like a live microphone.
                    tokio::time::sleep(Duration::from_millis(20)).await;
                }
                session.stop();
            }
            SessionEvent::Partial(p) => eprintln!("... {}", p.text),
            SessionEvent::Final(f) => println!("{}", f.text),
            SessionEvent::Error(e) => eprintln!("stream error: {e}"),
            SessionEvent::Closed => break,
        }
    }
    Ok(())
}

async fn cmd_synthesize(args: &[String]) -> anyhow::Result<()> {
    let text = positional(args).ok_or_else(|| anyhow!("missing <text>"))?;
    let out = flag(args, "--out").ok_or_else(|| anyhow!("missing --out <file>"))?;
    let mut options = TtsOptions::default();
    if let Some(lang) = flag(args, "--language") {
        options.language = lang.to_string();
    }
    options.voice = flag(args, "--voice").map(String::from);

    let audio = client()?.synthesize(text, &options).await?;
    if audio.is_empty() {
        bail!("service returned no audio");
    }
    audio
        .save(out)
        .await
        .with_context(|| format!("failed to write {out}"))?;
    println!("wrote {} bytes ({}) to {out}", audio.len(), audio.format.mime_type());
    Ok(())
}

async fn cmd_voices(args: &[String]) -> anyhow::Result<()> {
    let catalog = client()?.voices(flag(args, "--language")).await?;
    for voice in catalog.voices {
        println!(
            "{:<16} {:<20} {:<6} {}",
            voice.id,
            voice.name,
            voice.language,
            voice.gender.unwrap_or_default()
        );
    }
    Ok(())
}

async fn cmd_health() -> anyhow::Result<()> {
    let status = client()?.health_check().await;
    for service in ai_voice_rust::Service::ALL {
        let up = status.get(service);
        println!("{:<12} {}", service.name(), if up { "up" } else { "down" });
    }
    if !status.all_healthy() {
        std::process::exit(2);
    }
    Ok(())
}
