pub fn run() {
    println!("multipick: fuzzy multi-select picker");
    println!();
    println!("Usage: multipick <command>");
    println!();
    println!("Commands:");
    println!("  pick         Pick items interactively from an options file");
    println!("  search       Print ranked matches for a query");
    println!("  completions  Generate shell completions");
    println!();
    println!("Run `multipick <command> --help` for more info on a command.");
}
