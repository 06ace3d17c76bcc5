use crate::commands::{print_json, Context};
use anyhow::Result;
use clap::Args;
use serde::Serialize;

#[derive(Debug, Args)]
pub struct CountriesArgs {}

#[derive(Debug, Serialize)]
struct CountryDto {
    id: String,
    code: String,
    pattern: String,
    length: usize,
    default: bool,
}

pub fn list_countries(ctx: &Context<'_>, _args: CountriesArgs) -> Result<()> {
    let registry = ctx.normalizer.registry();
    let items: Vec<CountryDto> = registry
        .countries()
        .map(|(id, rule)| CountryDto {
            id: id.to_string(),
            code: rule.dialing_code().to_string(),
            pattern: rule.pattern().to_string(),
            length: rule.length(),
            default: id == registry.default_country(),
        })
        .collect();

    if ctx.json {
        print_json(&items)?;
        return Ok(());
    }

    for item in items {
        let marker = if item.default { " (default)" } else { "" };
        println!(
            "{}\t{}\t{}\t{}{}",
            item.id, item.code, item.length, item.pattern, marker
        );
    }
    Ok(())
}
