use super::load_inputs;
use crate::tui;
use crate::Format;
use multipick::{Item, MultiSelect, Props};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

pub fn run(file: &Path, config: Option<&Path>, format: Format, preselect: &[String]) {
    if let Err(e) = run_inner(file, config, format, preselect) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run_inner(
    file: &Path,
    config: Option<&Path>,
    format: Format,
    preselect: &[String],
) -> Result<(), String> {
    let (source, config) = load_inputs(file, config)?;
    if source.options.is_empty() && source.group_options.iter().all(|g| g.items.is_empty()) {
        return Err(format!("{} contains no options.", file.display()));
    }

    let latest: Rc<RefCell<Vec<Item>>> = Rc::default();
    let sink = Rc::clone(&latest);
    let props = Props {
        options: source.options,
        group_options: source.group_options,
        match_options: config.match_options.clone(),
        window: config.window(),
    };
    let widget = MultiSelect::new(props, move |items| {
        tracing::info!(count = items.len(), "selection changed");
        *sink.borrow_mut() = items.to_vec();
    });

    // Chips are coloured by the group they came from.
    let catalog = widget.catalog();
    let groups: HashMap<String, String> = catalog
        .items()
        .filter_map(|item| {
            let group = catalog.group_of(&item.value)?;
            Some((item.value.clone(), group.to_string()))
        })
        .collect();
    let mut widget = widget.with_item_class(move |item| {
        groups
            .get(&item.value)
            .cloned()
            .unwrap_or_else(|| "ungrouped".to_string())
    });

    for value in preselect {
        if !widget.toggle_value(value) {
            return Err(format!("Unknown value '{value}' in --select."));
        }
    }

    tui::multi_select(&mut widget, &config.display)?;

    let selected = latest.borrow();
    print_selection(&selected, format)
}

fn print_selection(items: &[Item], format: Format) -> Result<(), String> {
    match format {
        Format::Json => {
            let json = serde_json::to_string_pretty(items)
                .map_err(|e| format!("Failed to serialize selection: {e}"))?;
            println!("{json}");
        }
        Format::Lines => {
            for item in items {
                println!("{}", item.value);
            }
        }
    }
    Ok(())
}
