//! Build script for railboard-firmware
//!
//! - Adds the esp-hal and defmt linker scripts
//! - Validates board.toml at compile time
//! - Emits the validated values as `Defaults` constants

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Field capacities, kept in step with `railboard_core::config`
const SSID_LEN: usize = 32;
const PASSWORD_LEN: usize = 64;
const RAIL_TOKEN_LEN: usize = 39;
const MAX_ROWS: i64 = 16;
const MIN_UPDATE_EVERY: i64 = 5;
const MIN_TICKER_MS: i64 = 1000;

fn main() {
    if env::var("PROFILE").unwrap_or_default() == "release" {
        println!("cargo:rustc-env=DEFMT_LOG=off");
    }

    linker_be_nice();
    println!("cargo:rustc-link-arg=-Tdefmt.x");
    println!("cargo:rustc-link-arg=-Tlinkall.x");
    println!("cargo:rerun-if-changed=build.rs");

    let board = validate_config();
    write_defaults(&board);
}

/// Values pulled out of board.toml
struct BoardDefaults {
    ssid: String,
    password: String,
    token: String,
    station: String,
    mode: String,
    rows: i64,
    update_every: i64,
    ticker_ms: i64,
}

/// Validate board.toml and return its values
fn validate_config() -> BoardDefaults {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a board.toml defaults file.               ║\n\
            ║  Please create one in the railboard-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read board.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in board.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();

    for section in ["wifi", "darwin", "board"] {
        if !matches!(config.get(section), Some(toml::Value::Table(_))) {
            errors.push(format!("Missing [{}] section", section));
        }
    }
    report("Missing required sections in board.toml", &errors);

    let ssid = string_field(&config, "wifi", "ssid", &mut errors);
    let password = string_field(&config, "wifi", "password", &mut errors);
    let token = string_field(&config, "darwin", "token", &mut errors);
    let station = string_field(&config, "board", "station", &mut errors);
    let mode = string_field(&config, "board", "mode", &mut errors);
    let rows = integer_field(&config, "board", "rows", &mut errors);
    let update_every = integer_field(&config, "board", "update_every", &mut errors);
    let ticker_ms = integer_field(&config, "board", "ticker_ms", &mut errors);

    if ssid.len() > SSID_LEN {
        errors.push(format!("[wifi] ssid is longer than {} bytes", SSID_LEN));
    }
    if password.len() > PASSWORD_LEN {
        errors.push(format!("[wifi] password is longer than {} bytes", PASSWORD_LEN));
    }
    if token.len() > RAIL_TOKEN_LEN {
        errors.push(format!("[darwin] token is longer than {} bytes", RAIL_TOKEN_LEN));
    }
    if station.len() != 3 || !station.chars().all(|c| c.is_ascii_alphabetic()) {
        errors.push("[board] station must be three letters".to_string());
    }
    if !["departures", "arrivals"].contains(&mode.as_str()) {
        errors.push("[board] mode must be 'departures' or 'arrivals'".to_string());
    }
    if !(1..=MAX_ROWS).contains(&rows) {
        errors.push(format!("[board] rows must be 1-{}", MAX_ROWS));
    }
    if update_every < MIN_UPDATE_EVERY || update_every > u16::MAX as i64 {
        errors.push(format!("[board] update_every must be at least {}", MIN_UPDATE_EVERY));
    }
    if ticker_ms < MIN_TICKER_MS || ticker_ms > u32::MAX as i64 {
        errors.push(format!("[board] ticker_ms must be at least {}", MIN_TICKER_MS));
    }
    report("Invalid board configuration", &errors);

    if ssid.is_empty() {
        println!("cargo:warning=board.toml has no Wi-Fi SSID; set one from the browser");
    }
    println!("cargo:warning=board.toml validated successfully");

    BoardDefaults {
        ssid,
        password,
        token,
        station: station.to_ascii_uppercase(),
        mode,
        rows,
        update_every,
        ticker_ms,
    }
}

fn string_field(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> String {
    match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::String(s)) => s.clone(),
        Some(_) => {
            errors.push(format!("[{}] {} must be a string", section, key));
            String::new()
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            String::new()
        }
    }
}

fn integer_field(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> i64 {
    match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::Integer(n)) => *n,
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            0
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            0
        }
    }
}

/// Panic with every collected error, if any
fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write `defaults.rs` into OUT_DIR for `include!`
fn write_defaults(board: &BoardDefaults) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mode = match board.mode.as_str() {
        "arrivals" => "BoardKind::Arrivals",
        _ => "BoardKind::Departures",
    };
    let source = format!(
        "/// Defaults compiled from board.toml\n\
        pub const DEFAULTS: Defaults = Defaults {{\n    \
            wifi_ssid: {:?},\n    \
            wifi_password: {:?},\n    \
            rail_token: {:?},\n    \
            station: {:?},\n    \
            mode: {},\n    \
            rows: {},\n    \
            update_every_s: {},\n    \
            ticker_ms: {},\n\
        }};\n",
        board.ssid,
        board.password,
        board.token,
        board.station,
        mode,
        board.rows,
        board.update_every,
        board.ticker_ms,
    );
    fs::write(out_dir.join("defaults.rs"), source).unwrap();
}

fn linker_be_nice() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        let kind = &args[1];
        let what = &args[2];

        match kind.as_str() {
            "undefined-symbol" => match what.as_str() {
                "_defmt_timestamp" => {
                    eprintln!();
                    eprintln!(
                        "💡 `defmt` not found - make sure `defmt.x` is added as a linker script and `esp-println` has the `defmt-espflash` feature"
                    );
                    eprintln!();
                }
                "_stack_start" => {
                    eprintln!();
                    eprintln!("💡 Is the linker script `linkall.x` missing?");
                    eprintln!();
                }
                "esp_rtos_initialized" | "esp_rtos_yield_task" | "esp_rtos_task_create" => {
                    eprintln!();
                    eprintln!(
                        "💡 `esp-radio` has no scheduler enabled. Make sure `esp_rtos::start` runs before `esp_radio::init`."
                    );
                    eprintln!();
                }
                _ => (),
            },
            _ => {
                std::process::exit(1);
            }
        }

        std::process::exit(0);
    }

    println!(
        "cargo:rustc-link-arg=-Wl,--error-handling-script={}",
        std::env::current_exe().unwrap().display()
    );
}
