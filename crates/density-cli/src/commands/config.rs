//! `stream-density config` — print the effective configuration.

use anyhow::Result;

use super::SearchArgs;

pub fn show(args: SearchArgs) -> Result<()> {
    let mut config = args.into_config()?;
    config.validate()?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}
