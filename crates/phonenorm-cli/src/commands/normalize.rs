use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    pub phone: String,
    #[arg(long, short)]
    pub country: Option<String>,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    #[arg(long, short)]
    pub country: Option<String>,
    /// Read numbers from a file instead of stdin
    #[arg(long, short)]
    pub input: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct NormalizeDto {
    input: String,
    country: String,
    valid: bool,
    normalized: Option<String>,
    reason: Option<String>,
}

fn evaluate(ctx: &Context<'_>, input: &str, country: Option<&str>) -> NormalizeDto {
    let resolved = ctx.normalizer.registry().resolve_country(country).to_string();
    match ctx.normalizer.check(input, country) {
        Ok(phone) => NormalizeDto {
            input: input.to_string(),
            country: phone.country.to_string(),
            valid: true,
            normalized: Some(phone.international()),
            reason: None,
        },
        Err(reason) => {
            debug!(input, country = %resolved, reason = %reason, "phone number rejected");
            NormalizeDto {
                input: input.to_string(),
                country: resolved,
                valid: false,
                normalized: None,
                reason: Some(reason.to_string()),
            }
        }
    }
}

pub fn normalize(ctx: &Context<'_>, args: NormalizeArgs) -> Result<()> {
    let result = evaluate(ctx, &args.phone, args.country.as_deref());

    if ctx.json {
        print_json(&result)?;
    } else if let Some(normalized) = &result.normalized {
        println!("{}", normalized);
    }

    if !result.valid {
        return Err(invalid_input(format!(
            "{} is not a valid {} phone number",
            result.input, result.country
        )));
    }
    Ok(())
}

pub fn batch(ctx: &Context<'_>, args: BatchArgs) -> Result<()> {
    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let mut results = Vec::new();
    for line in reader.lines() {
        let line = line.with_context(|| "read input")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        results.push(evaluate(ctx, trimmed, args.country.as_deref()));
    }

    let rejected = results.iter().filter(|item| !item.valid).count();
    debug!(total = results.len(), rejected, "batch complete");

    if ctx.json {
        return print_json(&results);
    }

    for item in results {
        match item.normalized {
            Some(normalized) => println!("{}\t{}", item.input, normalized),
            None => println!("{}\tinvalid", item.input),
        }
    }
    Ok(())
}
