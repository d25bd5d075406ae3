pub fn run() {
    println!("fontpick — terminal font picker for Google Fonts");
    println!();
    println!("Usage: fontpick <command>");
    println!();
    println!("Commands:");
    println!("  pick         Choose the active font in an interactive dropdown");
    println!("  list         Print the fonts the picker would offer");
    println!("  completions  Generate shell completions");
    println!();
    println!("Settings come from flags, then fontpick.toml, then FONTPICK_API_KEY.");
    println!("Run `fontpick <command> --help` for more info on a command.");
}
