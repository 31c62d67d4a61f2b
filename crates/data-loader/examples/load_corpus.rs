use anyhow::Result;
use data_loader::Corpus;
use std::path::Path;
use std::time::Instant;

fn main() -> Result<()> {
    let path = Path::new("data/movies.jsonl");

    println!("Loading movie corpus...\n");

    let start = Instant::now();
    let corpus = Corpus::load_from_file(path)?;
    let elapsed = start.elapsed();

    let malformed_fields: usize = corpus
        .items()
        .iter()
        .map(|item| {
            [&item.genres, &item.keywords, &item.cast, &item.crew]
                .iter()
                .filter(|field| field.is_malformed())
                .count()
        })
        .sum();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Items: {}", corpus.len());
    println!("Skipped records: {}", corpus.skipped().len());
    println!("Malformed fields: {}", malformed_fields);
    println!("Duplicate titles: {}", corpus.title_index().duplicates());
    Ok(())
}
