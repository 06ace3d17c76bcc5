use anyhow::Result;
use phonenorm_core::Normalizer;
use serde::Serialize;
use std::io::{self, Write};

pub mod completions;
pub mod countries;
pub mod normalize;

pub struct Context<'a> {
    pub normalizer: &'a Normalizer,
    pub json: bool,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
