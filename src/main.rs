use std::fs::File;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::sync::mpsc;
use std::{env, thread, time::Duration};

use anyhow::Context;
use log::{info, warn, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode, WriteLogger};

use rgb_controller::config::{Settings, SETTINGS_FILE};
use rgb_controller::profile::SmartLevelTracker;
use rgb_controller::stats::Stats;
use rgb_controller::{Color, Controller, LightingMode, LightingProfile, SerialTransport, Speed};

const HELP: &str = "Commands:
  flowing [fast|medium|slow] [brightness]
  rotate <speed> <brightness> <r,g,b>...
  breathe <speed> <brightness> <r,g,b>...
  static <r> <g> <b> [brightness]
  multi <brightness> <r,g,b> <r,g,b> <r,g,b>
  smart | off | help | quit";

enum Command {
    Apply(LightingProfile),
    Help,
    Quit,
}

fn main() -> anyhow::Result<()> {
    let settings_path = env::args().nth(1).unwrap_or_else(|| SETTINGS_FILE.to_string());
    let mut settings = Settings::load_from_file(&settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path))?;

    init_logging(&settings)?;

    if settings.port.is_empty() {
        settings.port = prompt_port()?;
    }

    let transport = SerialTransport::open(&settings.port, settings.baud_rate)
        .with_context(|| format!("Failed to connect to {}", settings.port))?;
    let controller = Controller::new(transport);
    controller.start()?;
    info!("connected on {}", settings.port);

    let mut stats = Stats::new();
    let mut tracker = SmartLevelTracker::new();

    let temperature = stats.max_temperature();
    if controller.apply_profile(&settings.profile, temperature) {
        info!("restored {} lighting", settings.profile.mode);
        if settings.profile.mode == LightingMode::Smart {
            tracker.update(temperature.unwrap_or(0.0));
        }
    } else {
        warn!("could not restore {} lighting", settings.profile.mode);
    }

    // Create channel for user commands
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines().map_while(Result::ok) {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    println!("{}", HELP);

    loop {
        if let Ok(line) = rx.try_recv() {
            match parse_command(&line, &settings.profile) {
                Ok(Command::Quit) => {
                    println!("Exiting...");
                    break;
                }
                Ok(Command::Help) => println!("{}", HELP),
                Ok(Command::Apply(profile)) => {
                    tracker.reset();
                    let temperature = stats.max_temperature();
                    if controller.apply_profile(&profile, temperature) {
                        println!("Lighting set to {}", profile.mode);
                        if profile.mode == LightingMode::Smart {
                            tracker.update(temperature.unwrap_or(0.0));
                        }
                        settings.profile = profile;
                        if let Err(e) = settings.save_to_file(&settings_path) {
                            warn!("could not save settings: {}", e);
                        }
                    } else {
                        println!("Effect not applied, device busy. Try again.");
                    }
                }
                Err(e) => println!("{}", e),
            }
        }

        if settings.profile.mode == LightingMode::Smart {
            if let Some(level) = stats.max_temperature().and_then(|t| tracker.update(t)) {
                controller.async_set_smart_temp_level(level);
            }
        }

        thread::sleep(Duration::from_millis(settings.poll_interval_ms));
    }

    controller.stop();
    Ok(())
}

fn init_logging(settings: &Settings) -> anyhow::Result<()> {
    let level = LevelFilter::from_str(&settings.log_level).unwrap_or(LevelFilter::Info);
    match &settings.log_file {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Could not create {}", path))?;
            WriteLogger::init(level, Config::default(), file)?;
        }
        None => {
            TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)?;
        }
    }
    Ok(())
}

fn prompt_port() -> anyhow::Result<String> {
    let ports = serialport::available_ports().unwrap_or_default();
    let names: Vec<_> = ports.iter().map(|p| p.port_name.as_str()).collect();
    println!("Available ports: {}", names.join(", "));
    print!("Enter serial port for the device: ");
    io::stdout().flush()?;

    let mut port = String::new();
    io::stdin().read_line(&mut port).context("Failed to read port")?;
    Ok(port.trim().to_string())
}

fn parse_command(line: &str, current: &LightingProfile) -> Result<Command, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(&name) = parts.first() else {
        return Ok(Command::Help);
    };

    let mut profile = current.clone();
    match name {
        "quit" | "exit" => return Ok(Command::Quit),
        "help" => return Ok(Command::Help),
        "smart" => profile.mode = LightingMode::Smart,
        "off" => profile.mode = LightingMode::Off,
        "flowing" => {
            profile.mode = LightingMode::Flowing;
            if let Some(speed) = parts.get(1) {
                profile.speed = Speed::from_name(speed);
            }
            if let Some(brightness) = parts.get(2) {
                profile.brightness = parse_brightness(brightness)?;
            }
        }
        "rotate" | "breathe" => {
            if parts.len() < 3 {
                return Err(format!("Usage: {} <speed> <brightness> <r,g,b>...", name));
            }
            profile.mode = if name == "rotate" {
                LightingMode::Rotation
            } else {
                LightingMode::Breathing
            };
            profile.speed = Speed::from_name(parts[1]);
            profile.brightness = parse_brightness(parts[2])?;
            profile.colors = parts[3..]
                .iter()
                .map(|c| parse_color(c))
                .collect::<Result<_, _>>()?;
        }
        "static" => {
            if parts.len() < 4 {
                return Err("Usage: static <r> <g> <b> [brightness]".to_string());
            }
            let channel = |s: &str| s.parse::<u8>().map_err(|_| format!("Invalid channel: {}", s));
            profile.mode = LightingMode::StaticSingle;
            profile.colors = vec![Color::new(channel(parts[1])?, channel(parts[2])?, channel(parts[3])?)];
            if let Some(brightness) = parts.get(4) {
                profile.brightness = parse_brightness(brightness)?;
            }
        }
        "multi" => {
            if parts.len() < 2 {
                return Err("Usage: multi <brightness> <r,g,b> <r,g,b> <r,g,b>".to_string());
            }
            profile.mode = LightingMode::StaticMulti;
            profile.brightness = parse_brightness(parts[1])?;
            profile.colors = parts[2..]
                .iter()
                .take(3)
                .map(|c| parse_color(c))
                .collect::<Result<_, _>>()?;
        }
        other => return Err(format!("Unknown command: {}", other)),
    }
    Ok(Command::Apply(profile))
}

fn parse_brightness(s: &str) -> Result<u8, String> {
    match s.parse::<u8>() {
        Ok(level) if level <= 100 => Ok(level),
        _ => Err(format!("Brightness must be 0-100, got {}", s)),
    }
}

fn parse_color(s: &str) -> Result<Color, String> {
    let channels: Vec<u8> = s
        .split(',')
        .map(|c| c.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .map_err(|_| format!("Invalid color: {}", s))?;
    match channels[..] {
        [r, g, b] => Ok(Color::new(r, g, b)),
        _ => Err(format!("Color must be r,g,b: {}", s)),
    }
}
