use edoxaban::prelude::*;
use eyre::{bail, Result};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let (command, path) = match args.as_slice() {
        [_, command, path] => (command.as_str(), path.as_str()),
        _ => bail!("usage: edoxaban <simulate|fit> <settings.toml>"),
    };
    let settings = read_settings(path)?;
    match command {
        "simulate" => {
            entrypoints::simulate(&settings)?;
        }
        "fit" => {
            let result = entrypoints::fit(&settings)?;
            println!("Best cost: {:.6e}", result.cost);
        }
        _ => bail!("unknown command `{}`, expected `simulate` or `fit`", command),
    }
    Ok(())
}
