// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{io::Write, time::Duration};

use miette::IntoDiagnostic;
use strum_macros::{Display, EnumIter};
use tokio::sync::broadcast;
use ttyline::{DisplayPreference, Readline, ReadlineConfig, ReadlineError, ReadlineEvent,
              SharedWriter, TerminalConsole, TracingConfig, tracing_setup};

/// This program reads commands from the user while a background task prints the time
/// every few seconds, and `tracing` logs go to the same terminal. Neither garbles the
/// line being typed.
///
/// # Run the binary
///
/// ```text
/// ┌────────────────────────────────────────┐
/// │ > cargo run --example background_clock │
/// └────────────────────────────────────────┘
/// ```
///
/// Type one of the following commands, and keep typing while the clock ticks.
///
/// ```text
/// help, age, color, timer, secret, pause, history, exit
/// ```
#[tokio::main]
pub async fn main() -> miette::Result<()> {
    let Some(console) = TerminalConsole::try_new(ReadlineConfig::default())? else {
        println!("This example needs an interactive terminal.");
        return Ok(());
    };

    let TerminalConsole {
        readline,
        shared_writer,
    } = console;

    tracing_setup::init(TracingConfig::new_display(DisplayPreference::SharedWriter(
        shared_writer.clone(),
    )))?;

    let (shutdown_sender, _) = broadcast::channel::<()>(1);

    let clock_task = spawn_clock(shared_writer, shutdown_sender.clone());

    let result = run_event_loop(&readline).await;

    _ = shutdown_sender.send(());
    _ = clock_task.await;

    // Leave raw mode before exiting, `std::process::exit` skips destructors.
    drop(readline);

    match result? {
        Some(exit_code) => std::process::exit(exit_code),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, Display, EnumIter)]
enum Color {
    Red,
    Green,
    Blue,
}

const HELP: &str = "Commands: help, age, color, timer, secret, pause, history, exit";

/// Runs commands until the user quits. Returns the process exit code when input closed.
async fn run_event_loop(readline: &Readline) -> miette::Result<Option<i32>> {
    readline.write_line(HELP).into_diagnostic()?;

    let exit_code = loop {
        let input = match readline.read_line(false).await.into_diagnostic()? {
            ReadlineEvent::Line(input) => input,
            ReadlineEvent::Eof => {
                break readline.config().exit_code_on(&ReadlineError::InputClosed);
            }
            ReadlineEvent::Interrupted => break None,
        };

        match run_command(readline, input.trim()).await {
            Ok(Continue::Yes) => {}
            Ok(Continue::No) => break None,
            Err(error @ (ReadlineError::InputClosed | ReadlineError::Interrupted)) => {
                break readline.config().exit_code_on(&error);
            }
            Err(error) => return Err(error).into_diagnostic(),
        }
    };

    readline.write_line("Goodbye!").into_diagnostic()?;
    Ok(exit_code)
}

enum Continue {
    Yes,
    No,
}

async fn run_command(readline: &Readline, command: &str) -> Result<Continue, ReadlineError> {
    match command {
        "" => {}
        "help" => readline.write_line(HELP)?,
        "age" => {
            let age = readline.read_i32(Some("How old are you?")).await?;
            tracing::info!(age, "got an age");
            readline.write_line(&next_year_message(age))?;
        }
        "color" => {
            let color: Color = readline.select_enum("Favorite color?").await?;
            readline.write_line(&format!("You picked {color}."))?;
        }
        "timer" => {
            let duration = readline.read_duration(Some("Remind me in (hh:mm:ss)")).await?;
            tracing::info!(seconds = duration.num_seconds(), "timer set");
            readline.write_line(&format!("Timer set for {duration}."))?;
        }
        "secret" => {
            let prompt = readline.config().input_prompt();
            if let ReadlineEvent::Line(secret) =
                readline.read_line_with_prompt(&prompt, true).await?
            {
                readline.write_line(&format!("Your secret has {} chars.", secret.len()))?;
            }
        }
        "pause" => readline.press_any_key_to_continue(None).await?,
        "history" => {
            for (index, entry) in readline.history().await.iter().enumerate() {
                readline.write_line(&format!("{:>3} {entry}", index + 1))?;
            }
        }
        "exit" => {
            if readline.yes_or_no("Really exit?", Some(true)).await? {
                return Ok(Continue::No);
            }
        }
        unknown => {
            tracing::error!(command = unknown, "unknown command");
        }
    }
    Ok(Continue::Yes)
}

fn next_year_message(age: i32) -> String {
    format!("Next year you will be {}.", age.saturating_add(1))
}

fn spawn_clock(
    mut shared_writer: SharedWriter,
    shutdown_sender: broadcast::Sender<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut shutdown_receiver = shutdown_sender.subscribe();
        let mut interval = tokio::time::interval(Duration::from_secs(3));

        loop {
            tokio::select! {
                // Branch: Monitor shutdown signal. This is cancel safe as `recv()` is
                // cancel safe.
                _ = shutdown_receiver.recv() => break,
                // Branch: Tick. This is cancel safe as `tick()` is cancel safe.
                _ = interval.tick() => {
                    let now = chrono::Local::now().format("%H:%M:%S");
                    _ = writeln!(shared_writer, "[clock] {now}");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_next_year_message_does_not_overflow() {
        assert_eq!(next_year_message(41), "Next year you will be 42.");
        assert_eq!(
            next_year_message(i32::MAX),
            format!("Next year you will be {}.", i32::MAX)
        );
    }
}
