#![allow(dead_code)]

use crate::areas::repository::Repository;
use crate::artifacts::core::{exit_code_for, EXIT_USER};
use crate::artifacts::merge::MergeStrategy;
use crate::commands::porcelain::reset::ResetMode;
use clap::{Parser, Subcommand};
use colored::Colorize;

mod areas;
mod artifacts;
mod commands;

#[derive(Parser)]
#[command(
    name = "spgit",
    version = "0.1.0",
    about = "Git-style version control for remote playlists",
    long_about = "spgit keeps the full git data model (objects, refs, reflogs, \
    a staging index, branches and history rewrites) over an ordered remote \
    list instead of a filesystem."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Initialize a new repository")]
    Init {
        #[arg(long, help = "Playlist name recorded in the repository config")]
        name: Option<String>,
    },
    #[command(about = "Clone a remote list into a new repository")]
    Clone {
        #[arg(help = "Catalog url of the list")]
        url: String,
        #[arg(help = "Target directory (defaults to the list name)")]
        directory: Option<String>,
    },
    #[command(about = "Clone a list and create your own copy on the catalog")]
    Fork {
        #[arg(help = "Catalog url of the source list")]
        url: String,
        #[arg(long, help = "Name for the forked list")]
        name: String,
        #[arg(long, help = "Target directory")]
        directory: Option<String>,
    },
    #[command(about = "Inspect or edit configuration")]
    Config {
        #[arg(long = "global", help = "Operate on ~/.spgit/config")]
        global_config: bool,
        #[arg(long, help = "List all configuration entries")]
        list: bool,
        #[arg(long, help = "Read one configuration key")]
        get: Option<String>,
        #[arg(long, num_args = 2, value_names = ["KEY", "VALUE"], help = "Set a configuration key")]
        set: Option<Vec<String>>,
        #[arg(long, help = "Remove a configuration key")]
        unset: Option<String>,
    },
    #[command(
        about = "Stage items",
        long_about = "With '.' (or nothing), reconciles the index with the current \
        remote snapshot. With explicit identifiers, stages each one: present in \
        the snapshot means staged, absent means removed from the index."
    )]
    Add {
        #[arg(help = "Item identifiers, or '.' for everything")]
        specs: Vec<String>,
    },
    #[command(about = "Record the staged snapshot as a commit")]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(about = "Show the staged changes and current branch")]
    Status,
    #[command(about = "Show changes between the index and HEAD, or two revisions")]
    Diff {
        #[arg(help = "Zero or two revisions")]
        revisions: Vec<String>,
    },
    #[command(about = "Show commit history")]
    Log {
        #[arg(long, help = "One line per commit")]
        oneline: bool,
        #[arg(short = 'n', long, help = "Limit the number of commits")]
        limit: Option<usize>,
    },
    #[command(about = "List, create, or delete branches")]
    Branch {
        #[arg(help = "Branch name to create")]
        name: Option<String>,
        #[arg(help = "Revision the new branch starts at (defaults to HEAD)")]
        start: Option<String>,
        #[arg(short = 'd', long = "delete", help = "Delete a branch")]
        delete: Option<String>,
        #[arg(short = 'f', long, help = "Allow deleting an unmerged branch")]
        force: bool,
    },
    #[command(about = "Switch branches or detach onto a commit")]
    Checkout {
        #[arg(help = "Branch name or revision")]
        target: String,
        #[arg(short = 'b', help = "Create the branch first")]
        create: bool,
        #[arg(short = 'f', long, help = "Discard staged changes")]
        force: bool,
    },
    #[command(about = "Merge a branch into the current one")]
    Merge {
        #[arg(help = "Branch or revision to merge")]
        target: String,
        #[arg(long, default_value = "union", help = "union, append, or intersection")]
        strategy: String,
        #[arg(short, long, help = "Merge commit message")]
        message: Option<String>,
    },
    #[command(about = "Fetch the remote list and commit it onto the current branch")]
    Pull {
        #[arg(default_value = "origin", help = "Remote name")]
        remote: String,
    },
    #[command(about = "Publish HEAD's list to the remote catalog")]
    Push {
        #[arg(default_value = "origin", help = "Remote name")]
        remote: String,
    },
    #[command(about = "Snapshot the remote list without touching the current branch")]
    Fetch {
        #[arg(default_value = "origin", help = "Remote name")]
        remote: String,
    },
    #[command(about = "Manage remotes")]
    Remote {
        #[arg(short, long, help = "Show urls")]
        verbose: bool,
        #[arg(long, num_args = 2, value_names = ["NAME", "URL"], help = "Add a remote")]
        add: Option<Vec<String>>,
        #[arg(long, help = "Remove a remote")]
        remove: Option<String>,
    },
    #[command(about = "Move the current branch to another commit")]
    Reset {
        #[arg(default_value = "HEAD", help = "Target revision")]
        revision: String,
        #[arg(long, help = "Move the ref only")]
        soft: bool,
        #[arg(long, help = "Move the ref and rebuild the index (default)")]
        mixed: bool,
        #[arg(long, help = "Also overwrite the remote on the next push")]
        hard: bool,
    },
    #[command(about = "Undo a commit with a new commit")]
    Revert {
        #[arg(help = "Commit to revert")]
        revision: String,
    },
    #[command(about = "Stash the staged snapshot")]
    Stash {
        #[arg(
            default_value = "save",
            help = "save, list, pop, apply, or drop"
        )]
        action: String,
        #[arg(short, long, help = "Stash message")]
        message: Option<String>,
        #[arg(help = "Stash selector such as stash@{1}")]
        stash: Option<String>,
    },
    #[command(about = "Create, list, or delete tags")]
    Tag {
        #[arg(help = "Tag name to create")]
        name: Option<String>,
        #[arg(help = "Revision to tag (defaults to HEAD)")]
        revision: Option<String>,
        #[arg(short, long, help = "Tag message; makes the tag annotated")]
        message: Option<String>,
        #[arg(short = 'd', long = "delete", help = "Delete a tag")]
        delete: Option<String>,
    },
    #[command(about = "Show a commit and its items")]
    Show {
        #[arg(help = "Revision to show (defaults to HEAD)")]
        revision: Option<String>,
    },
    #[command(name = "cherry-pick", about = "Apply one commit's change onto HEAD")]
    CherryPick {
        #[arg(help = "Commit to pick")]
        revision: String,
    },
    #[command(about = "Replay the current branch on top of another")]
    Rebase {
        #[arg(help = "Upstream branch or revision")]
        upstream: String,
    },
    #[command(about = "Report the commit that introduced an item")]
    Blame {
        #[arg(help = "Item identifier")]
        uri: String,
    },
    #[command(about = "Show a ref's log")]
    Reflog {
        #[arg(help = "Ref to show (defaults to HEAD)")]
        reference: Option<String>,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            // help and version are not errors
            if error.exit_code() == 0 {
                let _ = error.print();
                std::process::exit(0);
            }
            let _ = error.print();
            std::process::exit(EXIT_USER);
        }
    };

    if let Err(error) = run(cli) {
        eprintln!("{} {:#}", "fatal:".red(), error);
        std::process::exit(exit_code_for(&error));
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Init { name } => {
            let mut repository = repository_here()?;
            repository.init(name.as_deref())
        }
        Commands::Clone { url, directory } => {
            let target = directory.unwrap_or_else(|| derive_directory_name(&url));
            let path = std::env::current_dir()?.join(target);
            std::fs::create_dir_all(&path)?;
            let mut repository = Repository::at(path, Box::new(std::io::stdout()))?;
            repository.clone_list(&url)
        }
        Commands::Fork {
            url,
            name,
            directory,
        } => {
            let target = directory.unwrap_or_else(|| name.clone());
            let path = std::env::current_dir()?.join(target);
            std::fs::create_dir_all(&path)?;
            let mut repository = Repository::at(path, Box::new(std::io::stdout()))?;
            repository.fork(&url, &name)
        }
        Commands::Config {
            global_config,
            list,
            get,
            set,
            unset,
        } => {
            let mut repository = discover()?;
            if list {
                repository.config_list(global_config)
            } else if let Some(key) = get {
                repository.config_get(&key, global_config)
            } else if let Some(pair) = set {
                repository.config_set(&pair[0], &pair[1], global_config)
            } else if let Some(key) = unset {
                repository.config_unset(&key, global_config)
            } else {
                repository.config_list(global_config)
            }
        }
        Commands::Add { specs } => discover()?.add(&specs),
        Commands::Commit { message } => discover()?.commit(&message),
        Commands::Status => discover()?.status(),
        Commands::Diff { revisions } => discover()?.diff(&revisions),
        Commands::Log { oneline, limit } => discover()?.log(oneline, limit),
        Commands::Branch {
            name,
            start,
            delete,
            force,
        } => {
            let mut repository = discover()?;
            if let Some(branch) = delete {
                repository.branch_delete(&branch, force)
            } else if let Some(branch) = name {
                repository.branch_create(&branch, start.as_deref())
            } else {
                repository.branch_list()
            }
        }
        Commands::Checkout {
            target,
            create,
            force,
        } => discover()?.checkout(&target, create, force),
        Commands::Merge {
            target,
            strategy,
            message,
        } => {
            let strategy: MergeStrategy = strategy
                .parse()
                .map_err(|err: anyhow::Error| {
                    crate::artifacts::core::EngineError::User(err.to_string())
                })?;
            discover()?.merge(&target, strategy, message.as_deref())
        }
        Commands::Pull { remote } => discover()?.pull(&remote),
        Commands::Push { remote } => discover()?.push(&remote),
        Commands::Fetch { remote } => discover()?.fetch(&remote),
        Commands::Remote {
            verbose,
            add,
            remove,
        } => {
            let mut repository = discover()?;
            if let Some(pair) = add {
                repository.remote_add(&pair[0], &pair[1])
            } else if let Some(name) = remove {
                repository.remote_remove(&name)
            } else {
                repository.remote_list(verbose)
            }
        }
        Commands::Reset {
            revision,
            soft,
            mixed: _,
            hard,
        } => {
            let mode = if soft {
                ResetMode::Soft
            } else if hard {
                ResetMode::Hard
            } else {
                ResetMode::Mixed
            };
            discover()?.reset(mode, &revision)
        }
        Commands::Revert { revision } => discover()?.revert(&revision),
        Commands::Stash {
            action,
            message,
            stash,
        } => {
            let mut repository = discover()?;
            match action.as_str() {
                "save" => repository.stash_save(message.as_deref()),
                "list" => repository.stash_list(),
                "pop" => repository.stash_pop(stash.as_deref()),
                "apply" => repository.stash_apply(stash.as_deref()),
                "drop" => repository.stash_drop(stash.as_deref()),
                other => Err(crate::artifacts::core::EngineError::user(format!(
                    "unknown stash action: '{}'",
                    other
                ))),
            }
        }
        Commands::Tag {
            name,
            revision,
            message,
            delete,
        } => {
            let mut repository = discover()?;
            if let Some(tag) = delete {
                repository.tag_delete(&tag)
            } else if let Some(tag) = name {
                repository.tag_create(&tag, revision.as_deref(), message.as_deref())
            } else {
                repository.tag_list()
            }
        }
        Commands::Show { revision } => discover()?.show(revision.as_deref()),
        Commands::CherryPick { revision } => discover()?.cherry_pick(&revision),
        Commands::Rebase { upstream } => discover()?.rebase(&upstream),
        Commands::Blame { uri } => discover()?.blame(&uri),
        Commands::Reflog { reference } => discover()?.reflog_show(reference.as_deref()),
    }
}

fn discover() -> anyhow::Result<Repository> {
    let pwd = std::env::current_dir()?;
    Repository::discover(&pwd, Box::new(std::io::stdout()))
}

fn repository_here() -> anyhow::Result<Repository> {
    let pwd = std::env::current_dir()?;
    Repository::at(pwd, Box::new(std::io::stdout()))
}

fn derive_directory_name(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("playlist")
        .trim_end_matches(".json")
        .to_string()
}
