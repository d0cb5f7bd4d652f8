//! Litro main entry point
//!
//! Line-oriented command loop wiring user input to the playback
//! controller: local synthesis, server synthesis and preprocessing preview.

use litro::api::HttpApiClient;
use litro::config::Config;
use litro::controller::Controller;
use litro::playback::RodioPlayer;
use litro::speech::{NativeSpeech, SpeechEngine};
use litro::ui::{lock_ui, StdPrompt, UiState};
use litro::Result;
use log::{error, info, warn};
use std::io::{self, BufRead, Write};
use std::process;
use std::sync::Arc;

fn main() {
    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let debug_mode = args.iter().any(|arg| arg == "--debug" || arg == "-d");

    // Initialize logger
    if debug_mode {
        // Debug mode: write to litro.log file
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("litro.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open litro.log for debug logging: {}", e);
                eprintln!("Continuing without file logging...");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "litro version {} starting (debug mode, logging to litro.log)",
            litro::VERSION
        );
    } else {
        // Normal mode: minimal logging to stderr, only errors
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Error)
            .init();
    }

    // Run the application
    if let Err(e) = run() {
        error!("Fatal error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::load()?;
    info!("Configuration loaded from {:?}", config.path());

    let language = config.language();
    let api = HttpApiClient::new(config.server_url(), config.request_timeout())?;
    let player = RodioPlayer::new(config.request_timeout())?;

    let ui = UiState::shared();

    // Echo every status transition, including the ones arriving from the
    // synthesis completion callback
    lock_ui(&ui).subscribe(Box::new(|status| {
        println!("[status] {}", status);
    }));

    // Absence of platform synthesis disables local playback for the
    // session; the server flow keeps working
    let engine: Option<Box<dyn SpeechEngine>> = match NativeSpeech::new(Arc::clone(&ui)) {
        Ok(engine) => Some(Box::new(engine)),
        Err(e) => {
            warn!("Platform speech synthesis unavailable: {}", e);
            None
        }
    };

    let mut controller = Controller::new(
        Box::new(api),
        engine,
        Box::new(player),
        Box::new(StdPrompt),
        Arc::clone(&ui),
        language.clone(),
    );

    // Eager catalog load at startup; `refresh` replaces it later
    if let Err(e) = controller.refresh_voices() {
        warn!("Could not load platform voices: {}", e);
    }

    println!("litro {} - {} text-to-speech client", litro::VERSION, language.name);
    println!("Backend: {}", config.server_url());
    print_help();

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let input = line.trim();
        let (command, rest) = match input.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (input, ""),
        };

        match command {
            "" => {}
            "local" | "l" => {
                controller.play_local(rest);
                print_processed(&controller);
            }
            "server" | "s" => {
                controller.play_server(rest);
                print_processed(&controller);
            }
            "preview" | "p" => {
                controller.preview(rest);
                print_processed(&controller);
            }
            "voices" | "v" => print_voices(&controller),
            "voice" => match rest.parse::<usize>() {
                Ok(index) => match (index, controller.select_voice(index)) {
                    (0, _) => println!("Voice selection cleared"),
                    (_, Some(voice)) => println!("Selected {} — {}", voice.name, voice.lang),
                    (_, None) => println!("No voice with that number; see 'voices'"),
                },
                Err(_) => println!("Usage: voice <number> (0 clears the selection)"),
            },
            "refresh" | "r" => {
                if let Err(e) = controller.refresh_voices() {
                    error!("Voice refresh failed: {}", e);
                    println!("Could not refresh voices");
                } else {
                    print_voices(&controller);
                }
            }
            "status" => {
                let ui = lock_ui(controller.ui());
                println!("status: {}", ui.status());
                if !ui.processed().is_empty() {
                    println!("processed text:\n{}", ui.processed());
                }
            }
            "help" | "h" | "?" => print_help(),
            "quit" | "q" | "exit" => break,
            other => println!("Unknown command '{}'; try 'help'", other),
        }
    }

    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  local <text>    preprocess on the server, speak with a local voice");
    println!("  server <text>   synthesize on the server and play the returned audio");
    println!("  preview <text>  show the preprocessed text without audio");
    println!("  voices          list available local voices");
    println!("  voice <n>       select a local voice by number (0 clears)");
    println!("  refresh         reload the local voice catalog");
    println!("  status          show current status and processed text");
    println!("  quit            exit");
}

fn print_processed(controller: &Controller) {
    let ui = lock_ui(controller.ui());
    if !ui.processed().is_empty() {
        println!("processed text:\n{}", ui.processed());
    }
}

fn print_voices(controller: &Controller) {
    let ui = lock_ui(controller.ui());

    if !ui.local_enabled() {
        println!("Local speech synthesis is not available on this platform");
        return;
    }

    println!("  0) — no voice selected —");
    for (i, voice) in ui.catalog().iter().enumerate() {
        let marker = if ui.selected_voice() == Some(voice.name.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{} {}) {} — {}", marker, i + 1, voice.name, voice.lang);
    }
}
