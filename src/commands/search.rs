use super::load_inputs;
use multipick::{Catalog, FuzzyFilter, Item};
use std::path::Path;

pub fn run(
    file: &Path,
    query: &str,
    exclude: &[String],
    limit: Option<usize>,
    config: Option<&Path>,
) {
    if let Err(e) = run_inner(file, query, exclude, limit, config) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run_inner(
    file: &Path,
    query: &str,
    exclude: &[String],
    limit: Option<usize>,
    config: Option<&Path>,
) -> Result<(), String> {
    let (source, config) = load_inputs(file, config)?;
    let catalog = Catalog::build(&source.options, &source.group_options);

    let mut options = config.match_options;
    if limit.is_some() {
        options.limit = limit;
    }
    let filter = FuzzyFilter::new(options);

    let candidates: Vec<&Item> = catalog
        .items()
        .filter(|item| !exclude.contains(&item.value))
        .collect();
    let results = filter.filter(query, candidates);

    if results.is_empty() {
        return Err(format!("No option found matching '{query}'."));
    }

    for item in results {
        let group = catalog.group_of(&item.value).unwrap_or("");
        println!("{}\t{}\t{group}", item.value, item.name);
    }
    Ok(())
}
