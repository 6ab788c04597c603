//! `dayplan` command-line front end.
//!
//! # Responsibility
//! - Map one subcommand to one core operation over the on-disk store.
//! - Keep output line-oriented and deterministic for scripting.

mod cli;

fn main() -> anyhow::Result<()> {
    cli::run()
}
