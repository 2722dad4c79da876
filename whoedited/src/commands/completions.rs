use std::io;

use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};

use crate::Opts;

/// Prints a shell completion script to standard output.
#[derive(Parser, Debug)]
pub struct Completion {
    #[clap(value_enum)]
    shell: Shell,
}

impl Completion {
    pub fn run(self) -> Result<(), anyhow::Error> {
        let mut app = Opts::command();
        let name = app.get_name().to_string();
        generate(self.shell, &mut app, name, &mut io::stdout());
        Ok(())
    }
}
