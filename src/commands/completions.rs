use clap_complete::Shell;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

const BIN: &str = "multipick";

/// Subcommands left out of shell completions.
const HIDDEN_COMMANDS: &[&str] = &["help"];

/// The clap Command with hidden subcommands removed; global args are kept.
fn filtered_command() -> clap::Command {
    use clap::CommandFactory;
    let cmd = crate::Cli::command();
    let mut clean = clap::Command::new(BIN)
        .disable_help_subcommand(true)
        .args(cmd.get_arguments().cloned().collect::<Vec<_>>());
    for sub in cmd
        .get_subcommands()
        .filter(|sub| !HIDDEN_COMMANDS.contains(&sub.get_name()))
    {
        clean = clean.subcommand(sub.clone());
    }
    clean
}

pub fn run(shell: Shell, install: bool) {
    let mut cmd = filtered_command();

    if !install {
        clap_complete::generate(shell, &mut cmd, BIN, &mut std::io::stdout());
        return;
    }

    if let Err(e) = install_completions(shell, &mut cmd) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn install_completions(shell: Shell, cmd: &mut clap::Command) -> Result<(), String> {
    let home = std::env::var("HOME").map_err(|_| "HOME is not set.".to_string())?;
    let home = PathBuf::from(home);

    let path = match shell {
        Shell::Zsh => home.join(".zfunc").join(format!("_{BIN}")),
        Shell::Bash => home
            .join(".local/share/bash-completion/completions")
            .join(BIN),
        Shell::Fish => home
            .join(".config/fish/completions")
            .join(format!("{BIN}.fish")),
        _ => {
            return Err(format!(
                "Auto-install not supported for {shell:?}. \
                 Use `{BIN} completions {shell:?}` to print completions and install manually."
            ))
        }
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Could not create {}: {e}", parent.display()))?;
    }
    let mut buf = Vec::new();
    clap_complete::generate(shell, cmd, BIN, &mut buf);
    fs::write(&path, &buf).map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    println!("Installed {shell:?} completions to {}", path.display());

    if shell == Shell::Zsh {
        ensure_zsh_fpath(&home)?;
        println!("Restart your shell or run: source ~/.zshrc");
    } else {
        println!("Restart your shell to activate.");
    }
    Ok(())
}

/// Add `~/.zfunc` to the zsh fpath unless `.zshrc` already mentions it.
fn ensure_zsh_fpath(home: &std::path::Path) -> Result<(), String> {
    let zshrc_path = home.join(".zshrc");
    let zshrc = fs::read_to_string(&zshrc_path).unwrap_or_default();
    if zshrc.contains(".zfunc") {
        return Ok(());
    }

    let snippet = format!(
        "\n# {BIN} shell completions\nfpath=(~/.zfunc $fpath)\nautoload -Uz compinit && compinit\n"
    );
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&zshrc_path)
        .and_then(|mut f| f.write_all(snippet.as_bytes()))
        .map_err(|e| format!("Failed to update {}: {e}", zshrc_path.display()))?;
    println!("Added fpath + compinit to ~/.zshrc");
    Ok(())
}
