//! Vigil CLI
//!
//! Command-line interface for the Vigil cipher toolkit: manual transforms,
//! known-plaintext attacks, automatic cracking with live progress, and
//! frequency statistics. Presentation only; all cryptanalysis lives in
//! `vigil-cipher`.

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use vigil_cipher::{
    Alphabet, AnalysisConfig, AnalysisEvent, AnalysisOrchestrator, CandidateKeyGenerator,
    CipherTransform, FrequencyTable, KeyLengthEstimator, KeyScorer,
};

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Repeating-key cipher toolkit with automated cryptanalysis")]
#[command(version)]
struct Cli {
    /// Cipher alphabet (defaults to A-Z, overridable via VIGIL_ALPHABET)
    #[arg(short, long, global = true)]
    alphabet: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt text with a repeating key
    Encrypt {
        text: String,
        key: String,
    },

    /// Decrypt text with a repeating key
    Decrypt {
        text: String,
        key: String,
    },

    /// Derive the raw key stream from ciphertext and aligned known plaintext
    RecoverKey {
        ciphertext: String,
        known: String,
    },

    /// Known-plaintext attack: generate and score key candidates
    Kpa {
        ciphertext: String,

        /// Known plaintext words or fragments
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Automatic cracking with live progress
    Crack {
        ciphertext: String,

        /// Emit the raw event stream as JSON lines
        #[arg(long)]
        json: bool,

        /// Deadline for the whole run in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Frequency statistics for a text
    Stats {
        text: String,

        /// Render the ASCII frequency chart
        #[arg(long)]
        chart: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vigil_cipher=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let mut config = AnalysisConfig::from_env();
    if let Some(alphabet) = cli.alphabet {
        config.alphabet = alphabet;
    }
    let alphabet = Alphabet::new(&config.alphabet)?;

    match cli.command {
        Commands::Encrypt { text, key } => cmd_transform(&text, &key, true, &alphabet),
        Commands::Decrypt { text, key } => cmd_transform(&text, &key, false, &alphabet),
        Commands::RecoverKey { ciphertext, known } => cmd_recover_key(&ciphertext, &known, &alphabet),
        Commands::Kpa { ciphertext, words } => cmd_kpa(&ciphertext, &words, &alphabet, &config),
        Commands::Crack {
            ciphertext,
            json,
            timeout_ms,
        } => cmd_crack(&ciphertext, json, timeout_ms, config).await,
        Commands::Stats { text, chart } => cmd_stats(&text, chart, &alphabet, &config),
    }
}

fn cmd_transform(text: &str, key: &str, encrypt: bool, alphabet: &Alphabet) -> Result<()> {
    let output = if encrypt {
        CipherTransform::encrypt(text, key, alphabet)?
    } else {
        CipherTransform::decrypt(text, key, alphabet)?
    };
    println!("{}", output);
    Ok(())
}

fn cmd_recover_key(ciphertext: &str, known: &str, alphabet: &Alphabet) -> Result<()> {
    let stream = CipherTransform::derive_key_stream(ciphertext, known, alphabet)?;
    println!("\n  KEY STREAM");
    println!("  ==========");
    println!("  Cipher: {}", alphabet.normalize(ciphertext));
    println!("  Known:  {}", alphabet.normalize(known));
    println!("  Stream: {}", stream);
    Ok(())
}

fn cmd_kpa(
    ciphertext: &str,
    words: &[String],
    alphabet: &Alphabet,
    config: &AnalysisConfig,
) -> Result<()> {
    let word_refs: Vec<&str> = words.iter().map(String::as_str).collect();
    let candidates = CandidateKeyGenerator::generate(ciphertext, &word_refs, alphabet)?;
    let best = KeyScorer::select_best(ciphertext, &candidates, alphabet, config.language, &word_refs)?;

    println!("\n  KNOWN-PLAINTEXT ATTACK");
    println!("  ======================");
    println!("  Candidates tried: {}", candidates.len());
    println!("  Key:        {}", best.candidate.key);
    println!("  Confidence: {:.2}", KeyScorer::confidence(best.score, alphabet));
    println!("  Decrypted:  {}", best.decrypted);
    Ok(())
}

async fn cmd_crack(
    ciphertext: &str,
    json: bool,
    timeout_ms: Option<u64>,
    config: AnalysisConfig,
) -> Result<()> {
    let deadline = Duration::from_millis(timeout_ms.unwrap_or(config.timeout_ms));
    let alphabet = config.alphabet.clone();
    let mut orchestrator = AnalysisOrchestrator::new(config);
    let mut handle = orchestrator.analyze(ciphertext, &alphabet)?;

    let timer = tokio::time::Instant::now() + deadline;
    loop {
        let event = match tokio::time::timeout_at(timer, handle.recv()).await {
            Err(_) => {
                handle.terminate();
                anyhow::bail!("analysis timed out after {} ms", deadline.as_millis());
            }
            Ok(None) => break,
            Ok(Some(event)) => event,
        };

        if json {
            println!("{}", serde_json::to_string(&event)?);
            continue;
        }

        match event {
            AnalysisEvent::Progress {
                stage,
                percent,
                message,
            } => println!("  [{:3}%] {:?}: {}", percent, stage, message),
            AnalysisEvent::Result { result } => {
                println!("\n  CRACKED");
                println!("  =======");
                println!("  Key:        {}", result.key);
                println!("  Confidence: {:.2}", result.confidence);
                println!("  Decrypted:  {}", result.decrypted_text);
            }
            AnalysisEvent::Error { kind, message } => {
                anyhow::bail!("analysis failed ({:?}): {}", kind, message)
            }
            AnalysisEvent::Cancelled => println!("  analysis cancelled"),
        }
    }
    Ok(())
}

fn cmd_stats(text: &str, chart: bool, alphabet: &Alphabet, config: &AnalysisConfig) -> Result<()> {
    let table = FrequencyTable::observe(text, alphabet);

    if chart {
        println!("{}", table.render_ascii(alphabet));
    } else {
        println!("\n  TEXT STATISTICS");
        println!("  ===============");
        println!("  Symbols counted:      {}", table.total());
        println!("  Index of Coincidence: {:.4}", table.index_of_coincidence());
    }

    match KeyLengthEstimator::estimate(text, alphabet, config) {
        Ok(candidates) => {
            println!("\n  LIKELY KEY LENGTHS:");
            for c in candidates {
                println!("    {:3}  (score {:.3})", c.length, c.score);
            }
        }
        Err(e) => println!("\n  Key-length estimate unavailable: {}", e),
    }
    Ok(())
}
