/// Docdex API Demo
///
/// Walks one document through its whole lifecycle:
/// - Ingestion (bytes → tokens → index blob)
/// - Storage round trip (JSON blob as a metadata store would keep it)
/// - Activation, phrase search and autocomplete
/// - Removal from the catalog
///
/// Set `RUST_LOG=docdex=debug` to see the engine's own events.

use docdex::core::config::Config;
use docdex::core::engine::{CatalogEvent, Engine};
use docdex::core::types::DocumentFormat;
use tracing_subscriber::EnvFilter;

const SAMPLE: &str = "Rust is a systems programming language. \
    Rust guarantees memory safety without a garbage collector, \
    and systems programming in Rust feels productive.";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("\n╔═══════════════════════════════════════════════╗");
    println!("║        Docdex - Document Search Demo          ║");
    println!("╚═══════════════════════════════════════════════╝\n");

    // Step 1: Engine
    println!("Creating engine...");
    let config = Config::from_env()?;
    let engine = Engine::new(config);
    println!("  Status: {}\n", engine.status().indexed_file);

    // Step 2: INGEST
    println!("Step 2: INGEST - Indexing a plain text document...");
    let filename = "rust-notes.txt";
    let format: DocumentFormat = filename.parse()?;
    let blob = engine.index_document(SAMPLE.as_bytes(), format)?;
    println!("  {} tokens indexed\n", blob.token_count());

    // Step 3: STORE - What the metadata store keeps
    println!("Step 3: STORE - Serializing the index blob...");
    let stored = blob.to_json()?;
    println!("  {} bytes of JSON\n", stored.len());

    // Step 4: ACTIVATE
    println!("Step 4: ACTIVATE - Making the document searchable...");
    let status = engine.on_document_activated_json(&stored, filename)?;
    println!("  Active: {} ({} words, {} distinct)\n",
        status.indexed_file, status.token_count, status.vocabulary_size);

    // Step 5: SEARCH
    println!("Step 5: SEARCH - Phrase queries...");
    for query in ["systems programming", "Rust", "garbage collector", "python"] {
        let results = engine.search_phrase(query);
        println!("  '{}': {} matches", query, results.match_count);
        for snippet in &results.snippets {
            println!("      {}", snippet);
        }
    }
    println!();

    // Step 6: AUTOCOMPLETE
    println!("Step 6: AUTOCOMPLETE - Prefix completion...");
    for prefix in ["pro", "s", "zz"] {
        println!("  '{}': {:?}", prefix, engine.autocomplete_prefix(prefix));
    }
    println!();

    // Step 7: REMOVE
    println!("Step 7: REMOVE - Deleting the document from the catalog...");
    engine.handle_event(CatalogEvent::DocumentRemoved { label: filename.to_string() })?;
    println!("  Status: {}", engine.status().indexed_file);
    println!("  'Rust' now: {} matches\n", engine.search_phrase("Rust").match_count);

    println!("Done!");
    Ok(())
}
