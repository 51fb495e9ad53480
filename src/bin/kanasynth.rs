//! `kanasynth` — synthesize Japanese text files (or stdin) to WAV.
//!
//! ```text
//! kanasynth -D yomi.tsv -P diphone.zip -o hello.wav input.txt
//! echo 'こんにちは' | kanasynth --raw | aplay -t raw -f S16_LE -r 44100
//! kanasynth --dump input.txt
//! ```

use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kanasynth::{
    DiphoneArchive, RawSink, SampleSink, SynthConfig, Synthesizer, TextCodec, TrieDictionary,
    WavSink,
};

#[derive(Parser)]
#[command(name = "kanasynth", about = "Japanese diphone text-to-speech")]
struct Cli {
    /// Verbose logging (debug level)
    #[arg(short = 'd', long)]
    debug: bool,

    /// Encoding of the input text
    #[arg(short = 'c', long = "codec")]
    codec: Option<String>,

    /// Encoding of the dictionary keys
    #[arg(short = 'C', long = "dict-codec")]
    dict_codec: Option<String>,

    /// Pronunciation dictionary (TSV)
    #[arg(short = 'D', long = "dict", default_value = "yomi.tsv")]
    dict: PathBuf,

    /// Diphone archive (ZIP)
    #[arg(short = 'P', long = "phones", default_value = "diphone.zip")]
    phones: PathBuf,

    /// JSON synthesis settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output WAV file
    #[arg(short = 'o', long, default_value = "out.wav", conflicts_with = "raw")]
    output: PathBuf,

    /// Write headerless S16LE PCM to stdout instead of a WAV file
    #[arg(long)]
    raw: bool,

    /// Print chunks, readings and phone keys instead of synthesizing
    #[arg(long)]
    dump: bool,

    /// Input files; stdin when none are given
    files: Vec<PathBuf>,
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("kanasynth=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kanasynth=info"))
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}

/// Read every input line, decoded with `codec`.  Malformed byte sequences
/// are dropped.
fn read_lines(files: &[PathBuf], codec: TextCodec) -> Result<Vec<String>> {
    let mut readers: Vec<Box<dyn BufRead>> = Vec::new();
    if files.is_empty() {
        readers.push(Box::new(io::stdin().lock()));
    }
    for path in files {
        let file =
            File::open(path).with_context(|| format!("Cannot open input: {}", path.display()))?;
        readers.push(Box::new(BufReader::new(file)));
    }

    let mut lines = Vec::new();
    for reader in readers {
        for raw in reader.split(b'\n') {
            let raw = raw.context("Failed to read input")?;
            let (mut line, dropped) = codec.decode_lossy(&raw);
            if dropped > 0 {
                warn!(dropped, codec = codec.name(), "malformed input bytes dropped");
            }
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
    }
    Ok(lines)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let mut config = match &cli.config {
        Some(path) => SynthConfig::from_json_file(path)?,
        None => SynthConfig::default(),
    };
    if let Some(label) = cli.codec {
        config.text_encoding = label;
    }
    if let Some(label) = cli.dict_codec {
        config.dict_encoding = label;
    }
    let text_codec = config.text_codec()?;
    let dict_codec = config.dict_codec()?;

    let dict = TrieDictionary::open(&cli.dict, dict_codec)
        .with_context(|| format!("Cannot load dictionary: {}", cli.dict.display()))?;
    let phones = if cli.dump {
        DiphoneArchive::default()
    } else {
        DiphoneArchive::open(&cli.phones)?
    };
    let synth = Synthesizer::with_codec(&dict, dict_codec, &phones, config);
    let lines = read_lines(&cli.files, text_codec)?;

    if cli.dump {
        let mut out = io::stdout().lock();
        for line in &lines {
            writeln!(out, "chunks:   {:?}", synth.chunks(line))?;
            for r in synth.readings(line) {
                writeln!(out, "reading:  {} -> {}", r.surface, r.reading)?;
            }
            writeln!(out, "phones:   {}", synth.phone_keys(line).join(" "))?;
        }
        return Ok(());
    }

    let framerate = synth.config().framerate;
    let mut sink: Box<dyn SampleSink> = if cli.raw {
        Box::new(RawSink::new(io::stdout().lock()))
    } else {
        Box::new(WavSink::create(&cli.output, framerate)?)
    };
    for line in &lines {
        synth.synth(&mut *sink, line)?;
    }
    sink.finish()?;

    let frames = sink.frames_written();
    if cli.raw {
        info!(frames, "raw PCM written to stdout");
    } else {
        info!(
            frames,
            seconds = frames as f64 / f64::from(framerate),
            path = %cli.output.display(),
            "WAV written"
        );
    }
    Ok(())
}
