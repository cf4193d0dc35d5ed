use crate::render;
use anyhow::Context;
use cocoon_core::domain::Location;
use cocoon_core::view::{Completion, ViewController};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Search(Location),
    History,
    New,
    SignOut,
    Help,
    Quit,
}

fn parse_command(line: &str) -> anyhow::Result<Option<Command>> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(None);
    };
    let rest = parts.collect::<Vec<_>>().join(" ");

    let cmd = match head.to_ascii_lowercase().as_str() {
        "search" | "s" => {
            let location = if rest.is_empty() {
                Location::default()
            } else {
                rest.parse::<Location>()?
            };
            Command::Search(location)
        }
        "history" | "h" => Command::History,
        "new" | "n" => Command::New,
        "signout" | "logout" => Command::SignOut,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => anyhow::bail!("unknown command {other:?} (type `help`)"),
    };
    Ok(Some(cmd))
}

fn print_help() {
    println!("commands:");
    println!("  search [location]   find the best start date (Bengaluru, Ramanagara, Siddlaghatta)");
    println!("  history             show past searches");
    println!("  new                 back to a new search");
    println!("  signout             sign out and leave");
    println!("  quit                leave");
}

fn show(vc: &ViewController) {
    println!("{}", render::render(vc.state()));
    if vc.needs_reauth() {
        println!("(sign in again with `cocoon login`)");
    }
}

/// Reads commands while calls are in flight; responses are applied as they
/// arrive, in whatever order that is.
pub async fn run(mut vc: ViewController) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut calls: JoinSet<Completion> = JoinSet::new();

    print_help();
    show(&vc);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                let cmd = match parse_command(&line) {
                    Ok(Some(cmd)) => cmd,
                    Ok(None) => continue,
                    Err(err) => {
                        println!("{err}");
                        continue;
                    }
                };

                match cmd {
                    Command::Search(location) => match vc.search(location) {
                        Some(call) => {
                            calls.spawn(call.run());
                        }
                        None => println!("A recommendation is already loading."),
                    },
                    Command::History => {
                        calls.spawn(vc.view_history().run());
                    }
                    Command::New => vc.reset_to_new_search(),
                    Command::SignOut => {
                        let _ = vc.sign_out();
                        println!("Signed out.");
                        break;
                    }
                    Command::Help => {
                        print_help();
                        continue;
                    }
                    Command::Quit => break,
                }
                show(&vc);
            }
            Some(joined) = calls.join_next(), if !calls.is_empty() => {
                let completion = joined.context("service call task failed")?;
                if vc.complete(completion) {
                    show(&vc);
                }
            }
        }
    }

    if !calls.is_empty() {
        tracing::debug!(in_flight = calls.len(), "leaving dashboard with calls in flight");
    }
    Ok(())
}
