//! `generate` subcommand.
use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Render man pages for the command and its direct subcommands into
/// `output_dir` (the current directory when unspecified).
///
/// # Errors
///
/// Returns an error if the output directory or a man page file cannot be
/// created.
pub fn generate_man_pages(
    cmd: &clap::Command,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let output_dir = match output_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("opening current directory")?,
    };
    std::fs::create_dir_all(&output_dir)
        .context("create man page output directory")?;

    render_man_page(cmd.clone(), cmd.get_name().to_string(), &output_dir)?;

    // prefixed names so SEE ALSO references line up, e.g. "mq-generate"
    for subcmd in cmd.get_subcommands() {
        let name = format!("{}-{}", cmd.get_name(), subcmd.get_name());
        render_man_page(subcmd.clone(), name, &output_dir)?;
    }

    Ok(())
}

fn render_man_page(
    cmd: clap::Command,
    name: String,
    output_dir: &Path,
) -> Result<()> {
    let path = output_dir.join(format!("{name}.1"));
    let man =
        clap_mangen::Man::new(cmd.name(name).disable_help_subcommand(true));

    let mut file = File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    man.render(&mut file)?;
    println!("Generated: {}", path.display());

    Ok(())
}
