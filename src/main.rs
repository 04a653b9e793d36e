//! granuview CLI - Walk a dump sequence and report per-frame summaries.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use granuview::{
    playback::FrameSession,
    schema::SessionConfig,
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!(
            "Usage: {} <dump-file> [--config <config.json>] [--reference <frame>]",
            args[0]
        );
        eprintln!();
        eprintln!("Walk a particle dump sequence and report per-frame summaries.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  dump-file    Any one file of the sequence; siblings are discovered");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --config     Session configuration file (cache bounds)");
        eprintln!("  --reference  Frame index used as the zero-displacement baseline");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");

        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let dump_path = PathBuf::from(&args[1]);
    let mut config_path: Option<PathBuf> = None;
    let mut reference: Option<u64> = None;

    let mut rest = args[2..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--config" => {
                config_path = Some(PathBuf::from(rest.next().unwrap_or_else(|| {
                    eprintln!("--config needs a file path");
                    std::process::exit(1);
                })));
            }
            "--reference" => {
                let value = rest.next().unwrap_or_else(|| {
                    eprintln!("--reference needs a frame index");
                    std::process::exit(1);
                });
                reference = Some(value.parse().unwrap_or_else(|_| {
                    eprintln!("Invalid frame index: {}", value);
                    std::process::exit(1);
                }));
            }
            other => {
                eprintln!("Unknown option: {}", other);
                std::process::exit(1);
            }
        }
    }

    // Load configuration
    let config: SessionConfig = match &config_path {
        Some(path) => {
            let config_str = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading config file: {}", e);
                std::process::exit(1);
            });
            serde_json::from_str(&config_str).unwrap_or_else(|e| {
                eprintln!("Error parsing config: {}", e);
                std::process::exit(1);
            })
        }
        None => SessionConfig::default(),
    };

    let mut session = FrameSession::new(config).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    let sequence = session.open(&dump_path).unwrap_or_else(|e| {
        eprintln!("Error opening sequence: {}", e);
        std::process::exit(1);
    });

    let indices: Vec<u64> = sequence.indices().collect();

    println!("Dump Sequence");
    println!("=============");
    println!("Sample: {}", dump_path.display());
    match (sequence.first_index(), sequence.last_index()) {
        (Some(first), Some(last)) => {
            println!("Frames: {} ({}..{})", indices.len(), first, last)
        }
        _ => println!("Frames: 0"),
    }
    println!();

    if let Some(frame) = reference {
        session.set_reference(frame).unwrap_or_else(|e| {
            eprintln!("Error setting reference frame: {}", e);
            std::process::exit(1);
        });
        println!("Reference frame: {}", frame);
        println!();
    }

    // Walk every frame
    let start = Instant::now();

    for index in &indices {
        let view = session.goto_frame(*index).unwrap_or_else(|e| {
            eprintln!("Error reading frame {}: {}", index, e);
            std::process::exit(1);
        });

        match view.displacement() {
            Some(displaced) => {
                println!(
                    "  Frame {}: {} particles, {} matched, max displacement {:.6}",
                    index,
                    displaced.len(),
                    displaced.matched_count(),
                    displaced.max_magnitude().unwrap_or(0.0)
                );
            }
            None => {
                println!("  Frame {}: {} particles", index, view.particle_count());
            }
        }
    }

    let elapsed = start.elapsed();
    let stats = session.cache_stats();

    println!();
    println!(
        "Cache: {} hit(s), {} miss(es), {:.1}% hit rate",
        stats.hits,
        stats.misses,
        stats.hit_rate() * 100.0
    );
    println!(
        "Time: {:.2}s ({:.1} frames/s)",
        elapsed.as_secs_f32(),
        indices.len() as f32 / elapsed.as_secs_f32()
    );
}

fn print_example_config() {
    let config = SessionConfig::default();

    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
}
