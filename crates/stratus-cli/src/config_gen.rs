use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use stratus_core::config;

/// Run `stratus config`: write the starter template to `dest`, or to a
/// search-path location chosen interactively. Never overwrites.
pub(crate) fn run_config_generate(dest: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let path = match dest {
        Some(d) => PathBuf::from(config::expand_tilde(d)),
        None => choose_location()?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(format!("file already exists: {}", path.display()).into());
        }
        Err(e) => return Err(e.into()),
    };
    file.write_all(config::minimal_config_template().as_bytes())?;

    println!("Config written to: {}", path.display());
    println!("Fill in the credentials for your backend, then run `stratus init`.");
    Ok(())
}

fn choose_location() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let candidates = config::default_config_search_paths();

    eprintln!("Where should the config file live?");
    for (i, (path, level)) in candidates.iter().enumerate() {
        eprintln!("  [{}] {:<8} {}", i + 1, level, path.display());
    }
    eprint!("Choice [1]: ");
    io::stderr().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let index = parse_choice(input.trim(), candidates.len())?;
    Ok(candidates[index].0.clone())
}

/// Zero-based index for a 1-based menu answer; blank picks the first entry.
fn parse_choice(input: &str, count: usize) -> Result<usize, String> {
    if input.is_empty() {
        return Ok(0);
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
        Ok(n) => Err(format!("choice out of range: {n}")),
        Err(_) => Err(format!("invalid choice: '{input}'")),
    }
}
