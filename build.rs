//! Renders the `stream-reassembly(1)` man page from the clap definition.

use std::{error::Error, fs, path::Path};

use clap::CommandFactory;

#[path = "src/cli.rs"]
mod cli;

const MAN_DIR: &str = "target/generated-man";

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let page = Path::new(MAN_DIR).join("stream-reassembly.1");
    fs::create_dir_all(MAN_DIR)?;
    let mut rendered = Vec::new();
    clap_mangen::Man::new(cli::Cli::command()).render(&mut rendered)?;
    fs::write(page, rendered)
        .map_err(|err| format!("cannot write man page to {MAN_DIR}: {err}").into())
}
