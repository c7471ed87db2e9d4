use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use drumlog::model::SortMethod;

/// "0.3.2" on tagged release builds, "0.3.2@abc1234 2024-01-15 14:30" otherwise.
fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static LONG_VERSION: OnceLock<String> = OnceLock::new();

    LONG_VERSION.get_or_init(|| {
        let version = env!("CARGO_PKG_VERSION");
        let hash = env!("GIT_HASH");
        if env!("IS_RELEASE") == "true" || hash.is_empty() {
            version.to_string()
        } else {
            format!("{}@{} {}", version, hash, env!("GIT_COMMIT_DATE"))
        }
    })
}

fn parse_sort(s: &str) -> Result<SortMethod, String> {
    s.parse().map_err(|e: drumlog::error::DrumlogError| e.to_string())
}

#[derive(Parser, Debug)]
#[command(
    name = "drumlog",
    bin_name = "drumlog",
    version = get_version(),
    disable_help_flag = true,
    disable_help_subcommand = true
)]
#[command(about = "Track practice progress on drum songs and skills", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Operate on skills instead of songs
    #[arg(long, global = true, help_heading = "Options")]
    pub skills: bool,

    /// Use remote storage regardless of config
    #[arg(long, global = true, help_heading = "Options")]
    pub remote: bool,

    /// Act as this signed-in user
    #[arg(long, global = true, value_name = "UID", help_heading = "Options")]
    pub user: Option<String>,

    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = ArgAction::Count, help_heading = "Options")]
    pub verbose: u8,

    /// Print help
    #[arg(short, long, global = true)]
    pub help: bool,
}

/// Sections of the top-level help screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGroup {
    Core,
    Item,
    Misc,
}

const GROUPS: [CommandGroup; 3] = [CommandGroup::Core, CommandGroup::Item, CommandGroup::Misc];

const GLOBAL_OPTIONS: &[(&str, &str)] = &[
    ("    --skills", "Operate on skills instead of songs"),
    ("    --remote", "Use remote storage regardless of config"),
    ("    --user <UID>", "Act as this signed-in user"),
    ("-v, --verbose", "Verbose output (repeat for more)"),
    ("-h, --help", "Print help"),
    ("-V, --version", "Print version"),
];

impl CommandGroup {
    pub fn title(self) -> &'static str {
        match self {
            CommandGroup::Core => "Practice list:",
            CommandGroup::Item => "Single item:",
            CommandGroup::Misc => "Other:",
        }
    }

    pub fn of(command: &str) -> Option<Self> {
        match command {
            "add" | "list" | "find" => Some(CommandGroup::Core),
            "view" | "edit" | "progress" | "delete" | "note" | "struggle" => {
                Some(CommandGroup::Item)
            }
            "config" | "help" => Some(CommandGroup::Misc),
            _ => None,
        }
    }
}

pub fn get_grouped_help() -> String {
    use std::fmt::Write;

    let cli = Cli::command();
    let mut help = String::new();
    let _ = writeln!(help, "drumlog {}", cli.get_version().unwrap_or_default());
    let _ = writeln!(help, "Track practice progress on drum songs and skills\n");
    let _ = writeln!(help, "Usage: drumlog [OPTIONS] [COMMAND]");

    for group in GROUPS {
        let mut listed = cli
            .get_subcommands()
            .filter(|sub| !sub.is_hide_set() && CommandGroup::of(sub.get_name()) == Some(group))
            .peekable();
        if listed.peek().is_none() {
            continue;
        }
        let _ = writeln!(help, "\n{}", group.title());
        for sub in listed {
            let about = sub.get_about().map(ToString::to_string).unwrap_or_default();
            let _ = writeln!(help, "  {:<12} {}", sub.get_name(), about);
        }
    }

    let _ = writeln!(help, "\nOptions:");
    for (flag, about) in GLOBAL_OPTIONS {
        let _ = writeln!(help, "  {:<17}{}", flag, about);
    }
    help
}

pub fn print_grouped_help() {
    print!("{}", get_grouped_help());
}

pub fn print_subcommand_help(command: &Option<Commands>) {
    let name = match command {
        Some(Commands::Core(c)) => match c {
            CoreCommands::Add { .. } => "add",
            CoreCommands::List { .. } => "list",
            CoreCommands::Find { .. } => "find",
        },
        Some(Commands::Item(c)) => match c {
            ItemCommands::View { .. } => "view",
            ItemCommands::Edit { .. } => "edit",
            ItemCommands::Progress { .. } => "progress",
            ItemCommands::Delete { .. } => "delete",
            ItemCommands::Note { .. } => "note",
            ItemCommands::Struggle { .. } => "struggle",
        },
        Some(Commands::Misc(c)) => match c {
            MiscCommands::Config { .. } => "config",
            MiscCommands::Help { .. } => "help",
        },
        None => {
            print_grouped_help();
            return;
        }
    };

    print_help_for_command(name);
}

pub fn print_help_for_command(name: &str) {
    let mut cli = Cli::command();
    match cli.find_subcommand_mut(name) {
        Some(sub) => print!("{}", sub.render_help()),
        None => {
            eprintln!("Unknown command: {}\n", name);
            print_grouped_help();
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Core(CoreCommands),

    #[command(flatten)]
    Item(ItemCommands),

    #[command(flatten)]
    Misc(MiscCommands),
}

#[derive(Subcommand, Debug)]
pub enum CoreCommands {
    /// Add a song (or a skill with --skills)
    #[command(alias = "a", display_order = 1)]
    Add {
        /// Artist (songs only)
        #[arg(short, long)]
        artist: Option<String>,

        /// Difficulty from 1 (beginner) to 5 (extreme)
        #[arg(short, long, value_parser = clap::value_parser!(i64).range(1..=5))]
        difficulty: Option<i64>,

        /// Starting mastery, 0-100
        #[arg(short, long, value_parser = clap::value_parser!(i64).range(0..=100))]
        progress: Option<i64>,

        /// Notes, one per line
        #[arg(long)]
        notes: Option<String>,

        /// Struggles, one per line
        #[arg(long)]
        struggles: Option<String>,

        /// Fill title and artist from a catalog search
        #[arg(long, value_name = "QUERY")]
        lookup: Option<String>,

        /// Which catalog result to use with --lookup
        #[arg(long, default_value_t = 1, requires = "lookup", value_parser = clap::value_parser!(u32).range(1..))]
        pick: u32,

        /// Title words (joined with spaces)
        #[arg(trailing_var_arg = true)]
        title: Vec<String>,
    },

    /// List songs or skills
    #[command(alias = "ls", display_order = 2)]
    List {
        /// Only show items whose title (or artist) contains this
        #[arg(short, long)]
        search: Option<String>,

        /// Sort order: recent, progress-desc, progress-asc, difficulty-desc, difficulty-asc, title
        #[arg(long, value_parser = parse_sort)]
        sort: Option<SortMethod>,
    },

    /// Search the song catalog
    #[command(display_order = 3)]
    Find {
        /// Maximum number of results
        #[arg(short, long, default_value_t = 5)]
        limit: usize,

        /// Search words
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// Show one or more items in full
    #[command(alias = "v", display_order = 10)]
    View {
        /// Ids or unique id prefixes
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Change an item's fields
    #[command(alias = "e", display_order = 11)]
    Edit {
        /// Id or unique id prefix
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        /// Artist (songs only)
        #[arg(short, long)]
        artist: Option<String>,

        #[arg(short, long, value_parser = clap::value_parser!(i64).range(1..=5))]
        difficulty: Option<i64>,

        #[arg(short, long, value_parser = clap::value_parser!(i64).range(0..=100))]
        progress: Option<i64>,

        /// Replace all notes (one per line)
        #[arg(long)]
        notes: Option<String>,

        /// Replace all struggles (one per line)
        #[arg(long)]
        struggles: Option<String>,
    },

    /// Set mastery (0-100)
    #[command(alias = "p", display_order = 12)]
    Progress {
        /// Id or unique id prefix
        id: String,

        #[arg(value_parser = clap::value_parser!(i64).range(0..=100))]
        value: i64,
    },

    /// Delete one or more items
    #[command(alias = "rm", display_order = 13)]
    Delete {
        /// Ids or unique id prefixes
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Edit an item's notes checklist
    #[command(display_order = 14)]
    Note {
        #[command(subcommand)]
        action: ChecklistCommand,
    },

    /// Edit an item's struggles checklist
    #[command(display_order = 15)]
    Struggle {
        #[command(subcommand)]
        action: ChecklistCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChecklistCommand {
    /// Append an entry
    Add {
        id: String,

        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Mark an entry done, or not done again
    Toggle {
        id: String,

        /// Entry number as shown by `view` (from 1)
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        position: u32,
    },

    /// Remove an entry
    #[command(alias = "remove")]
    Rm {
        id: String,

        /// Entry number as shown by `view` (from 1)
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        position: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum MiscCommands {
    /// Get or set configuration
    #[command(display_order = 30)]
    Config {
        /// Configuration key (e.g., backend, sort)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Print help for drumlog or a subcommand
    #[command(display_order = 31)]
    Help {
        /// Subcommand to get help for
        command: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("drumlog").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_subcommand_parses() {
        let cli = parse(&[]);
        assert!(cli.command.is_none());
        assert!(!cli.skills);
    }

    #[test]
    fn add_joins_title_words() {
        let cli = parse(&["add", "-a", "Toto", "-d", "4", "Rosanna", "Shuffle"]);
        match cli.command {
            Some(Commands::Core(CoreCommands::Add {
                title,
                artist,
                difficulty,
                ..
            })) => {
                assert_eq!(title, vec!["Rosanna", "Shuffle"]);
                assert_eq!(artist.as_deref(), Some("Toto"));
                assert_eq!(difficulty, Some(4));
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["ls", "--skills", "--user", "u1", "-vv"]);
        assert!(cli.skills);
        assert_eq!(cli.user.as_deref(), Some("u1"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn progress_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["drumlog", "progress", "abc", "101"]).is_err());
        assert!(Cli::try_parse_from(["drumlog", "add", "-d", "6", "X"]).is_err());
    }

    #[test]
    fn checklist_positions_start_at_one() {
        assert!(Cli::try_parse_from(["drumlog", "note", "toggle", "abc", "0"]).is_err());
        let cli = parse(&["struggle", "rm", "abc", "2"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Item(ItemCommands::Struggle {
                action: ChecklistCommand::Rm { position: 2, .. }
            }))
        ));
    }

    #[test]
    fn sort_is_validated() {
        let cli = parse(&["list", "--sort", "title"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Core(CoreCommands::List {
                sort: Some(SortMethod::Title),
                ..
            }))
        ));
        assert!(Cli::try_parse_from(["drumlog", "list", "--sort", "loud"]).is_err());
    }

    #[test]
    fn pick_requires_lookup() {
        assert!(Cli::try_parse_from(["drumlog", "add", "--pick", "2", "X"]).is_err());
    }

    #[test]
    fn grouped_help_lists_commands() {
        let help = get_grouped_help();
        assert!(help.contains("Practice list:"));
        assert!(help.contains("struggle"));
    }
}
