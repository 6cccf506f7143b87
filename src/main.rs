use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use lemmata::config::config::load_config;
use lemmata::error::Result;
use lemmata::extractor::extractor::Word;
use lemmata::pipeline::pipeline::Pipeline;
use lemmata::sections::sections::GroupBy;

fn print_word(pipeline: &Pipeline, word: &Word) {
    let lemma = word
        .lemma
        .as_deref()
        .map(|lemma| pipeline.format_lemma(lemma))
        .unwrap_or_default();
    println!("{}\t{}\t{}", word.location, word.form, lemma);
}

fn lemmatize(pipeline: &Pipeline, path: &str) -> Result<()> {
    let mut words = pipeline.words_from_path(path)?;
    for word in words.by_ref() {
        print_word(pipeline, &word?);
    }
    let stats = words.stats();
    println!(
        "{} words, {} ambiguous, {} not found",
        stats.words, stats.ambiguous, stats.not_found
    );
    Ok(())
}

fn sections(pipeline: &Pipeline, path: &str, group_by: Option<&str>) -> Result<()> {
    let group_by = match group_by {
        Some(group_by) => group_by.parse::<GroupBy>()?,
        None => pipeline.config().group_by,
    };
    for group in pipeline.groups_from_path_by(path, group_by)? {
        let group = group?;
        println!("[{}]", group.key.as_deref().unwrap_or("-"));
        for word in &group.words {
            print_word(pipeline, word);
        }
    }
    Ok(())
}

fn vocab(pipeline: &Pipeline, path: &str, include_duplicates: bool) -> Result<()> {
    let vocabulary = pipeline.vocabulary_from_path(path, include_duplicates)?;
    for entry in vocabulary.entries() {
        println!(
            "{}\t{}",
            pipeline.format_lemma(&entry.lemma),
            entry.joined_locations()
        );
    }
    Ok(())
}

fn convert(pipeline: &Pipeline, path: &str, source: &str, target: &str) -> Result<()> {
    let (words, report) = pipeline.convert_path(path, source, target)?;
    for word in &words {
        println!(
            "{}\t{}\t{}",
            word.location,
            word.form,
            word.lemma.as_deref().unwrap_or_default()
        );
    }
    println!("{} out of {} lemmata converted", report.converted, report.total);
    Ok(())
}

fn print_help() {
    println!("The valid commands are->");
    println!("lemmatize [file]: Lemmatizes a text, one word per row");
    println!(
        "sections [file] [section|detailed_section|location]: Lemmatizes a text grouped by section"
    );
    println!("vocab [file] [all]: Lists every lemma of a text with its locations");
    println!("import [table.csv]: Adds the equivalencies of a table to the graph");
    println!("resolve [lemma] [from] [to]: Finds the equivalent of a lemma in another convention");
    println!("convert [file] [from] [to]: Lemmatizes a text and converts its lemmata");
    println!("save: Saves the equivalence graph");
    println!("export: Writes the equivalence graph as an adjacency listing");
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config("config.json");

    println!("\nCurrent Configuration:");
    println!("  Language:          {}", config.language);
    println!("  Lexicon:           {}", config.lexicon_path);
    println!("  Data Directory:    {}", config.data_dir);
    println!("  Line Numbers:      {}", config.use_line_numbers);
    println!("  Group By:          {:?}", config.group_by);
    println!("\nType 'help' for commands or 'exit' to quit.\n");

    let mut pipeline = match Pipeline::from_config(config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    loop {
        let readline = rl.readline("> ");

        match readline {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                let parts: Vec<&str> = line.split_whitespace().collect();
                let result = match parts.as_slice() {
                    ["help"] => {
                        print_help();
                        Ok(())
                    }
                    ["lemmatize", path] => lemmatize(&pipeline, path),
                    ["sections", path] => sections(&pipeline, path, None),
                    ["sections", path, group_by] => sections(&pipeline, path, Some(*group_by)),
                    ["vocab", path] => vocab(&pipeline, path, false),
                    ["vocab", path, "all"] => vocab(&pipeline, path, true),
                    ["import", path] => pipeline.import_table(path).map(|summary| {
                        println!(
                            "Imported {} rows: {} new lemmata, {} new equivalencies",
                            summary.rows, summary.lemmata_added, summary.edges_added
                        )
                    }),
                    ["resolve", display, source, target] => pipeline
                        .resolve(display, source, target)
                        .map(|node| println!("{}", pipeline.format_lemma(&node.display))),
                    ["convert", path, source, target] => convert(&pipeline, path, source, target),
                    ["save"] => pipeline
                        .save_graph()
                        .map(|_| println!("The equivalence graph has been saved")),
                    ["export"] => pipeline
                        .export_graph()
                        .map(|path| println!("Exported to {}", path.display())),
                    ["quit"] | ["exit"] => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => {
                        println!("Invalid command. Type help if you want to see the valid commands");
                        Ok(())
                    }
                };

                if let Err(e) = result {
                    println!("Error: {}", e);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
}
