//! Command line entry point.
//!
//! # Responsibility
//! - Load the user document from the configured data directory.
//! - Expose summary, vCard import and contact search for local use.
//!
//! Usage:
//!   prm_cli summary
//!   prm_cli import <vcf-dir>
//!   prm_cli search <query> [tolerance]

use log::info;
use prm_core::import::vcf::import_directory;
use prm_core::statistics::event_count_by_tag;
use prm_core::{init_logging_from_config, SearchEngine, StoreConfig, User};
use std::error::Error;
use std::path::Path;
use std::process::ExitCode;

const DEFAULT_USER_NAME: &str = "me";
const DEFAULT_TOLERANCE: usize = 2;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let config = StoreConfig::from_env().ok_or("set PRM_DATA_DIR or HOME")?;
    init_logging_from_config(&config)?;
    info!(
        "event=cli_start module=cli status=ok version={}",
        prm_core::core_version()
    );

    let store = config.document_store();
    let mut user = store.load_or_create(DEFAULT_USER_NAME)?;

    match args.first().map(String::as_str) {
        None | Some("summary") => print_summary(&user),
        Some("import") => {
            let dir = args.get(1).ok_or("usage: import <vcf-dir>")?;
            let imported = import_directory(&mut user, Path::new(dir))?;
            store.save(&user)?;
            println!("imported={imported}");
        }
        Some("search") => {
            let query = args.get(1).ok_or("usage: search <query> [tolerance]")?;
            let tolerance = match args.get(2) {
                Some(raw) => raw.parse()?,
                None => DEFAULT_TOLERANCE,
            };
            let engine = SearchEngine::new(user.contacts().to_vec());
            for contact in engine.search(query, tolerance) {
                let contact = contact.borrow();
                println!("{} {}", contact.id(), contact.name());
            }
        }
        Some(other) => return Err(format!("unknown command `{other}`").into()),
    }
    Ok(())
}

fn print_summary(user: &User) {
    println!("user={} id={}", user.name(), user.id());
    println!(
        "contacts={} events={} tags={}",
        user.contacts().len(),
        user.events().len(),
        user.tag_handler().len()
    );
    for (tag, count) in event_count_by_tag(user) {
        println!("tag={tag} events={count}");
    }
}
