use clap::CommandFactory;
use clap_complete::Shell;

/// Print completions for `shell` to stdout.
pub fn run(shell: Shell) {
    let mut cmd = crate::Cli::command();
    clap_complete::generate(shell, &mut cmd, "fontpick", &mut std::io::stdout());
}
