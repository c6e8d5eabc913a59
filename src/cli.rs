use clap::Parser;

use crate::ui::UiKind;

#[derive(Parser, Debug)]
#[command(name = "sfm")]
#[command(
    author,
    version,
    about = "Set up shell functions and aliases for bash, zsh and fish",
    long_about = None
)]
pub struct Cli {
    /// Run without prompts, taking the default answer everywhere
    #[arg(short, long)]
    pub batch: bool,

    /// Default every confirmation to yes
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Configure this shell instead of $SHELL (bash, zsh or fish)
    #[arg(long, value_name = "NAME")]
    pub shell: Option<String>,

    /// Undo a previous installation
    #[arg(long, visible_alias = "rollback")]
    pub uninstall: bool,

    /// User interface to use
    #[arg(long, value_enum, value_name = "KIND")]
    pub ui: Option<UiKind>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Write debug detail to the setup log
    #[arg(short, long)]
    pub verbose: bool,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL", hide = true)]
    pub completions: Option<clap_complete::Shell>,
}
