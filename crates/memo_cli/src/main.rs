//! Line-oriented memo session.
//!
//! # Responsibility
//! - Resolve configuration from flags and environment.
//! - Open the store file (or an in-memory fallback) and drive the store
//!   from stdin commands.

mod backing;
mod cli;
mod command;
mod session;

use crate::backing::{open_backing, Backing};
use crate::cli::CliConfig;
use crate::session::{execute, user_notice, Flow};
use clap::Parser;
use log::{debug, info};
use memo_core::{init_logging, CoreConfig, MemoStore, SqliteKvStore, StoreEvent};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = CliConfig::parse().resolve(CoreConfig::from_env());
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("memo: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &CoreConfig) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }
    info!(
        "event=app_start module=cli status=ok version={}",
        memo_core::core_version()
    );

    let (conn, backing) = open_backing(&config.db_path)?;
    let mut store = MemoStore::open(SqliteKvStore::try_new(&conn)?);
    store.subscribe(Box::new(|event: StoreEvent| {
        debug!("event=store_change module=cli status=ok kind={event:?}");
        if let Some(notice) = user_notice(event) {
            eprintln!("{notice}");
        }
    }));

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    match backing {
        Backing::File => writeln!(
            stdout,
            "memo store at {} (`help` for commands)",
            config.db_path.display()
        )?,
        Backing::Memory => writeln!(
            stdout,
            "warning: cannot use {}; starting empty, changes will not be kept (`help` for commands)",
            config.db_path.display()
        )?,
    }
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        match command::parse(&line) {
            Ok(command) => {
                if execute(&mut store, command, &mut stdout)? == Flow::Exit {
                    break;
                }
            }
            Err(err) => writeln!(stdout, "{err}")?,
        }
    }

    info!("event=app_stop module=cli status=ok");
    Ok(())
}
