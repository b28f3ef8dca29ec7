use std::env;
use std::fs::File;
use std::io::Cursor;

use trigram_core::{Engine, EngineConfig};

const SAMPLE: &str = "\
The cheese was old and the cheese was good.
The town was old and the river was slow.
The river was cold and the cheese was gone.";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Default parameters: grams of 3 words, at most 100 words per text
    let mut config = EngineConfig::default();

    // Drop line breaks and anything but letters, digits and basic punctuation
    config.strip_punctuation = true;

    // Keep the generated texts short
    config.max_words = 20;

    // Start the learn and generate pools over an empty store
    let engine = Engine::start(&config)?;

    // Learn the file given as first argument, or the built-in sample
    let learned = match env::args().nth(1) {
        Some(path) => engine.learn(File::open(&path)?)?,
        None => engine.learn(Cursor::new(SAMPLE))?,
    };
    println!("Learned {} grams", learned);

    let stats = engine.store().stats();
    println!("{} distinct grams, total frequency {}", stats.grams, stats.total_frequency);

    // Generate 10 texts from the learned grams
    for i in 0..10 {
        println!("Generated text {}: {}", i + 1, engine.generate()?);
    }

    engine.stop();
    Ok(())
}
