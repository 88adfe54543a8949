//! Shell completions command

use std::io;

use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use crate::Cli;

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: &CompletionsArgs) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    generate(args.shell, &mut cmd, bin, &mut io::stdout());
    Ok(())
}
