//! Entry command implementations.

use super::{open_registry, render_value};
use crate::cli::{ReadArgs, WriteArgs};
use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::validate::parse_value;
use colored::Colorize;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;

/// Output for get and dump.
#[derive(Serialize)]
struct ValueOutput<'a> {
    key: &'a str,
    value: &'a Value,
    found: bool,
}

/// Output for set, overwrite and forget.
#[derive(Serialize)]
struct WriteOutput<'a> {
    key: &'a str,
    action: &'a str,
}

/// Output for store.
#[derive(Serialize)]
struct StoreOutput {
    keys: Vec<String>,
    count: usize,
}

/// Output for all.
#[derive(Serialize)]
struct AllOutput<'a> {
    entries: &'a Map<String, Value>,
    count: usize,
}

/// Execute `reg get`.
pub fn execute_get(args: &ReadArgs, config: &RegistryConfig, json: bool) -> Result<()> {
    let mut registry = open_registry(config)?;
    let found = registry.get(&args.key)?.cloned();
    print_read(&args.key, found, args.default.as_deref(), json)
}

/// Execute `reg dump`.
pub fn execute_dump(args: &ReadArgs, config: &RegistryConfig, json: bool) -> Result<()> {
    let mut registry = open_registry(config)?;
    let found = registry.dump(&args.key)?.cloned();
    print_read(&args.key, found, args.default.as_deref(), json)
}

/// Execute `reg set`.
pub fn execute_set(args: &WriteArgs, config: &RegistryConfig, json: bool) -> Result<()> {
    let mut registry = open_registry(config)?;
    registry.set(&args.key, parse_value(&args.value))?;
    print_write(&args.key, "set", json)
}

/// Execute `reg overwrite`.
pub fn execute_overwrite(args: &WriteArgs, config: &RegistryConfig, json: bool) -> Result<()> {
    let mut registry = open_registry(config)?;
    registry.overwrite(&args.key, parse_value(&args.value))?;
    print_write(&args.key, "overwritten", json)
}

/// Execute `reg forget`.
pub fn execute_forget(key: &str, config: &RegistryConfig, json: bool) -> Result<()> {
    let mut registry = open_registry(config)?;
    registry.forget(key)?;
    print_write(key, "forgotten", json)
}

/// Execute `reg store`.
///
/// `values` is a JSON object, or `@path` naming a file that holds one.
pub fn execute_store(values: &str, config: &RegistryConfig, json: bool) -> Result<()> {
    let raw = match values.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)?,
        None => values.to_string(),
    };

    let Value::Object(entries) = serde_json::from_str(&raw)? else {
        return Err(Error::InvalidArgument(
            "store expects a JSON object of root keys to values".to_string(),
        ));
    };
    let keys: Vec<String> = entries.keys().cloned().collect();

    let mut registry = open_registry(config)?;
    registry.store(entries)?;

    if json {
        let output = StoreOutput {
            count: keys.len(),
            keys,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{} Stored {} entries", "✓".green(), keys.len());
    }

    Ok(())
}

/// Execute `reg all`.
pub fn execute_all(config: &RegistryConfig, json: bool) -> Result<()> {
    let mut registry = open_registry(config)?;
    let entries = registry.entries()?;

    if json {
        let output = AllOutput {
            entries,
            count: entries.len(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if entries.is_empty() {
        println!("No entries found.");
    } else {
        for (key, value) in entries {
            println!("{} = {value}", key.bold());
        }
    }

    Ok(())
}

fn print_read(key: &str, found: Option<Value>, default: Option<&str>, json: bool) -> Result<()> {
    let is_found = found.is_some();
    let value = found.unwrap_or_else(|| default.map_or(Value::Null, parse_value));

    if json {
        let output = ValueOutput {
            key,
            value: &value,
            found: is_found,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{}", render_value(&value)?);
    }

    Ok(())
}

fn print_write(key: &str, action: &str, json: bool) -> Result<()> {
    if json {
        let output = WriteOutput { key, action };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{} {} {key}", "✓".green(), capitalize(action));
    }
    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
