#![forbid(unsafe_code)]

use std::env;
use std::io::{self, IsTerminal, Read};

use remez_engines::route::{IntentRouteConfig, IntentRouteRuntime};
use remez_tools::route_cli::{execute_route_command, parse_now_arg};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || args[0] != "route" {
        return Err(usage());
    }

    let mut query_text: Option<String> = None;
    let mut now = None;
    let mut conversation: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--now" => {
                let value = args.get(i + 1).ok_or_else(usage)?;
                now = Some(parse_now_arg(value)?);
                i += 2;
            }
            "--conversation" => {
                conversation = Some(args.get(i + 1).ok_or_else(usage)?.clone());
                i += 2;
            }
            text if query_text.is_none() => {
                query_text = Some(text.to_string());
                i += 1;
            }
            _ => return Err(usage()),
        }
    }

    let query_text = match query_text {
        Some(text) if text != "-" => text,
        _ => read_query_from_stdin()?,
    };

    let runtime = IntentRouteRuntime::new(IntentRouteConfig::mvp_v1());
    let output = execute_route_command(&runtime, &query_text, now, conversation.as_deref())?;
    println!("{output}");
    Ok(())
}

fn read_query_from_stdin() -> Result<String, String> {
    if io::stdin().is_terminal() {
        return Err(usage());
    }
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| e.to_string())?;
    let trimmed = input.trim().to_string();
    if trimmed.is_empty() {
        return Err("query text must not be empty".to_string());
    }
    Ok(trimmed)
}

fn usage() -> String {
    "usage: remez route <query|-> [--now YYYY-MM-DD] [--conversation <id>]".to_string()
}
