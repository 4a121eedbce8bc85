use clap::{Parser, Subcommand};
use is_terminal::IsTerminal;
use minus::Pager;
use std::io::Write;
use std::process::ExitCode;
use twig::areas::repository::Repository;
use twig::artifacts::core::PagerWriter;
use twig::logging;

const NO_PAGER_ENV_VAR: &str = "NO_PAGER";

#[derive(Parser)]
#[command(
    name = "twig",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A small local version-control system",
    long_about = "Twig keeps snapshots of a directory as commits on named branches \
    and merges branches with a three-way merge. Everything is local: there is no \
    remote, no line-level diff and no history rewriting.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(name = "add", about = "Stage files for the next commit")]
    Add {
        #[arg(required = true, help = "The files to stage")]
        files: Vec<String>,
    },
    #[command(
        name = "rm",
        about = "Unstage a file, or stop tracking and delete it"
    )]
    Rm {
        #[arg(index = 1)]
        file: String,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command creates a new commit on the current branch from the staged changes."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(name = "log", about = "Show the first-parent history of the current branch")]
    Log,
    #[command(name = "global-log", about = "Show every commit ever made")]
    GlobalLog,
    #[command(name = "find", about = "Print the IDs of the commits with the given message")]
    Find {
        #[arg(index = 1)]
        message: String,
    },
    #[command(name = "status", about = "Show branches, staged files and working tree changes")]
    Status,
    #[command(
        name = "checkout",
        about = "Restore a file or switch branches",
        long_about = "checkout -- <file> restores a file from the current branch, \
        checkout <commit> -- <file> restores it from a commit, \
        and checkout <branch> switches to a branch."
    )]
    Checkout {
        #[arg(help = "A branch name, or a commit ID when a file follows --")]
        target: Option<String>,
        #[arg(last = true, help = "The file to restore")]
        file: Option<String>,
    },
    #[command(name = "branch", about = "Create a branch at the current commit")]
    Branch {
        #[arg(index = 1)]
        name: String,
    },
    #[command(name = "rm-branch", about = "Delete a branch")]
    RmBranch {
        #[arg(index = 1)]
        name: String,
    },
    #[command(
        name = "reset",
        about = "Move the current branch to a commit and check out its files"
    )]
    Reset {
        #[arg(index = 1)]
        commit: String,
    },
    #[command(name = "merge", about = "Merge a branch into the current branch")]
    Merge {
        #[arg(index = 1)]
        branch: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file as a blob and optionally write it to the object database"
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: String,
    },
    #[command(name = "cat-file", about = "Print the content of an object")]
    CatFile {
        #[arg(short = 'p', long, help = "The object ID (or a prefix of it) to print")]
        sha: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(error) = logging::init_logging() {
        eprintln!("warning: logging disabled: {error}");
    }
    colored::control::set_override(std::io::stdout().is_terminal());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let pwd = std::env::current_dir()?.to_string_lossy().to_string();

    match cli.command {
        Commands::Init { path } => {
            let repository = Repository::new(path.as_deref().unwrap_or(&pwd), stdout())?;
            repository.init()
        }
        Commands::Log => with_pager(&pwd, |repository| repository.log()),
        Commands::GlobalLog => with_pager(&pwd, |repository| repository.global_log()),
        command => {
            let repository = Repository::new(&pwd, stdout())?;
            dispatch(&repository, command)
        }
    }
}

fn dispatch(repository: &Repository, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Add { files } => repository.add(&files),
        Commands::Rm { file } => repository.rm(&file),
        Commands::Commit { message } => repository.commit(&message),
        Commands::Find { message } => repository.find(&message),
        Commands::Status => repository.status(),
        Commands::Checkout { target, file } => match (target, file) {
            (None, Some(file)) => repository.checkout_file(&file),
            (Some(commit), Some(file)) => repository.checkout_commit_file(&commit, &file),
            (Some(branch), None) => repository.checkout_branch(&branch),
            (None, None) => anyhow::bail!("Incorrect operands."),
        },
        Commands::Branch { name } => repository.branch(&name),
        Commands::RmBranch { name } => repository.delete_branch(&name),
        Commands::Reset { commit } => repository.reset(&commit),
        Commands::Merge { branch } => repository.merge(&branch),
        Commands::HashObject { write, file } => repository.hash_object(&file, write),
        Commands::CatFile { sha } => repository.cat_file(&sha),
        Commands::Init { .. } | Commands::Log | Commands::GlobalLog => {
            anyhow::bail!("command must be dispatched by run")
        }
    }?;

    repository.writer().flush()?;
    Ok(())
}

fn stdout() -> Box<dyn Write> {
    Box::new(std::io::stdout())
}

/// Run a history command through the pager when stdout is a terminal
fn with_pager(
    pwd: &str,
    command: impl FnOnce(&Repository) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let use_pager = std::io::stdout().is_terminal() && std::env::var_os(NO_PAGER_ENV_VAR).is_none();
    if !use_pager {
        let repository = Repository::new(pwd, stdout())?;
        return command(&repository);
    }

    let pager_writer = PagerWriter::new(Pager::new());
    let repository = Repository::new(pwd, Box::new(pager_writer.clone()))?;
    command(&repository)?;

    pager_writer.page()
}
