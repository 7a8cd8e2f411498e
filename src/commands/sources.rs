//! Interactive editing of the source list.

use std::path::Path;

use anyhow::Result;
use calmerge_core::{load_sources, save_sources, Source};
use dialoguer::{Confirm, Input, Select};
use owo_colors::OwoColorize;

pub fn run(json: &Path) -> Result<()> {
    let mut sources = if json.exists() {
        load_sources(json)?
    } else {
        Vec::new()
    };

    loop {
        let choice = Select::new()
            .with_prompt("Sources")
            .items(&["Add", "Edit", "Save and exit"])
            .default(0)
            .interact()?;
        match choice {
            0 => add_entry(&mut sources)?,
            1 => edit_entry(&mut sources)?,
            _ => break,
        }
    }

    save_sources(json, &sources)?;
    println!("{} Saved {}", "✓".green(), json.display());
    Ok(())
}

fn add_entry(sources: &mut Vec<Source>) -> Result<()> {
    let name: String = Input::new().with_prompt("Name").interact_text()?;
    let url: String = Input::new().with_prompt("URL").interact_text()?;
    let prefix: String = Input::new()
        .with_prompt("Prefix")
        .allow_empty(true)
        .interact_text()?;
    let enabled = Confirm::new()
        .with_prompt("Enabled")
        .default(true)
        .interact()?;

    sources.push(Source {
        name,
        url,
        prefix,
        enabled,
    });
    Ok(())
}

fn edit_entry(sources: &mut Vec<Source>) -> Result<()> {
    if sources.is_empty() {
        println!("No entries to edit.");
        return Ok(());
    }

    let labels: Vec<String> = sources
        .iter()
        .map(|s| format!("{} [{}]", s.name, if s.enabled { "on" } else { "off" }))
        .collect();
    let index = Select::new()
        .with_prompt("Entry")
        .items(&labels)
        .default(0)
        .interact()?;

    let action = Select::new()
        .with_prompt(sources[index].name.clone())
        .items(&["Toggle", "Delete", "Back"])
        .default(0)
        .interact()?;
    match action {
        0 => sources[index].enabled = !sources[index].enabled,
        1 => {
            sources.remove(index);
        }
        _ => {}
    }
    Ok(())
}
