use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use folio::areas::store_file::DEFAULT_STORE_PATH;
use folio::artifacts::branch::slug::Slug;
use folio::artifacts::objects::record::{NewRecord, RecordEdit, TagSet};
use folio::commands::porcelain::commit::CommitOutcome;
use folio::{ErrorKind, FolioError, Repository, Session};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "folio",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "Version control for structured records",
    long_about = "folio keeps a collection of records (title, description, body and tags) under \
    git-like version control. Fork a branch off the trunk, edit records on it and merge it back; \
    any conflict aborts the whole merge.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "FOLIO_STORE",
        default_value = DEFAULT_STORE_PATH,
        help = "Path to the store file"
    )]
    store: PathBuf,
    #[arg(
        long,
        global = true,
        env = "FOLIO_AUTHOR",
        default_value = "anonymous",
        help = "Author recorded on new records"
    )]
    author: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new store",
        long_about = "This command writes a fresh store holding only the trunk and makes the trunk \
        the current branch. An existing store is left untouched."
    )]
    Init,
    #[command(name = "branch", about = "Create, list or relabel branches")]
    Branch {
        #[command(subcommand)]
        command: BranchCommands,
    },
    #[command(name = "switch", about = "Make a branch the current branch")]
    Switch {
        #[arg(index = 1, help = "The branch to switch to")]
        name: String,
    },
    #[command(name = "record", about = "Work with records on the current branch")]
    Record {
        #[command(subcommand)]
        command: RecordCommands,
    },
    #[command(
        name = "commit",
        about = "Commit the current branch",
        long_about = "On the trunk this commits the working copies as a new version. On any other \
        branch it merges the branch back into the trunk and retires it."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "merge",
        about = "Merge another branch into the current branch",
        long_about = "This command merges the committed state of the source branch into the working \
        copies of the current branch, using the merge base of both heads as the common ancestor."
    )]
    Merge {
        #[arg(index = 1, help = "The branch to merge from")]
        source: String,
        #[arg(short, long, help = "The merge commit message")]
        message: Option<String>,
    },
    #[command(name = "changes", about = "List what a branch changed since it forked")]
    Changes {
        #[arg(index = 1, default_value = "@", help = "The branch to inspect")]
        branch: String,
    },
    #[command(name = "history", about = "Show the trunk history of a record")]
    History {
        #[arg(index = 1, help = "The record slug")]
        slug: String,
        #[arg(short = 'n', long, help = "Show at most this many entries")]
        limit: Option<usize>,
    },
}

#[derive(Subcommand)]
enum BranchCommands {
    #[command(name = "create", about = "Fork a new branch off the trunk")]
    Create {
        #[arg(index = 1)]
        name: String,
        #[arg(short, long, help = "Human label, defaults to the name")]
        label: Option<String>,
    },
    #[command(name = "list", about = "List all branches")]
    List,
    #[command(name = "label", about = "Change the label of a branch")]
    Label {
        #[arg(index = 1)]
        name: String,
        #[arg(index = 2)]
        label: String,
    },
}

#[derive(Subcommand)]
enum RecordCommands {
    #[command(name = "add", about = "Create a record")]
    Add {
        #[arg(index = 1)]
        slug: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        body: String,
        #[arg(long = "tag", help = "A tag; repeat for several")]
        tags: Vec<String>,
    },
    #[command(name = "edit", about = "Change fields of a record")]
    Edit {
        #[arg(index = 1)]
        slug: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
    #[command(name = "delete", about = "Delete a record")]
    Delete {
        #[arg(index = 1)]
        slug: String,
    },
    #[command(name = "tag", about = "Replace the tags of a record")]
    Tag {
        #[arg(index = 1)]
        slug: String,
        #[arg(index = 2)]
        tags: Vec<String>,
    },
    #[command(name = "track", about = "Include a record in commits, or exclude it with --off")]
    Track {
        #[arg(index = 1)]
        slug: String,
        #[arg(long)]
        off: bool,
    },
    #[command(name = "show", about = "Print a record")]
    Show {
        #[arg(index = 1)]
        slug: String,
    },
    #[command(name = "list", about = "List the records of the current branch")]
    List,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FOLIO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<FolioError>().map(FolioError::kind) {
        Some(ErrorKind::Validation) => 2,
        Some(ErrorKind::NotFound) => 3,
        Some(ErrorKind::Conflict) => 4,
        Some(ErrorKind::Precondition) => 5,
        None => 1,
    }
}

fn print_outcome(branch: &str, outcome: &CommitOutcome, message: &str) {
    let version = outcome
        .version
        .map(|version| format!(" v{version}"))
        .unwrap_or_default();

    println!(
        "[{branch}{version} {}] {}",
        outcome.commit_id.to_short_oid().yellow(),
        message.lines().next().unwrap_or_default()
    );
}

async fn run(cli: Cli) -> Result<()> {
    let session = Session::new(Repository::open(&cli.store)?);
    let repository = session.repository();

    let mutated = match cli.command {
        Commands::Init => {
            let created = repository.init().await?;
            if session.current_branch().await.is_err() {
                session.switch_current("main").await?;
            }

            if created {
                println!("Initialized empty folio store in {}", cli.store.display());
            } else {
                println!("Reinitialized existing folio store in {}", cli.store.display());
            }
            true
        }
        Commands::Branch { command } => match command {
            BranchCommands::Create { name, label } => {
                repository.create_branch(&name, label.as_deref()).await?;
                println!("Created branch '{name}'");
                true
            }
            BranchCommands::List => {
                for branch in repository.list_branches().await {
                    let marker = if branch.is_current { "*" } else { " " };
                    let name = if branch.is_current {
                        branch.name.to_string().green().bold()
                    } else {
                        branch.name.to_string().normal()
                    };
                    let head = branch
                        .head
                        .as_ref()
                        .map(|oid| oid.to_short_oid())
                        .unwrap_or_else(|| "-".to_string());
                    let version = branch
                        .version
                        .or(branch.base_version)
                        .map(|version| format!("v{version}"))
                        .unwrap_or_else(|| "-".to_string());

                    println!(
                        "{marker} {name} {} {} {version} {}",
                        branch.status.as_str().dimmed(),
                        head.yellow(),
                        branch.label
                    );
                }
                false
            }
            BranchCommands::Label { name, label } => {
                session.rename_label(&name, &label).await?;
                true
            }
        },
        Commands::Switch { name } => {
            session.switch_current(&name).await?;
            let branch = session.current_branch().await?;
            println!("Switched to branch '{}'", branch.name);
            true
        }
        Commands::Record { command } => match command {
            RecordCommands::Add {
                slug,
                title,
                description,
                body,
                tags,
            } => {
                let slug = Slug::try_parse(slug)?;
                let new_record = NewRecord::new(slug.clone(), title, cli.author.as_str())
                    .with_description(description)
                    .with_body(body)
                    .with_tags(tags);
                session.create_record(new_record).await?;
                println!("Created record '{slug}'");
                true
            }
            RecordCommands::Edit {
                slug,
                title,
                description,
                body,
            } => {
                let slug = Slug::try_parse(slug)?;
                let edits = title
                    .map(RecordEdit::Title)
                    .into_iter()
                    .chain(description.map(RecordEdit::Description))
                    .chain(body.map(RecordEdit::Body))
                    .collect::<Vec<_>>();
                if edits.is_empty() {
                    return Err(FolioError::Validation(
                        "nothing to edit: pass --title, --description or --body".into(),
                    )
                    .into());
                }
                session.edit_record(&slug, &edits).await?;
                println!("Updated record '{slug}'");
                true
            }
            RecordCommands::Delete { slug } => {
                let slug = Slug::try_parse(slug)?;
                session.delete_record(&slug).await?;
                println!("Deleted record '{slug}'");
                true
            }
            RecordCommands::Tag { slug, tags } => {
                let slug = Slug::try_parse(slug)?;
                session
                    .set_tags(&slug, tags.into_iter().collect::<TagSet>())
                    .await?;
                true
            }
            RecordCommands::Track { slug, off } => {
                let slug = Slug::try_parse(slug)?;
                let branch = session.current_branch().await?;
                repository
                    .set_tracked(branch.name.as_ref(), &slug, !off)
                    .await?;
                true
            }
            RecordCommands::Show { slug } => {
                let slug = Slug::try_parse(slug)?;
                let view = session.get_record(&slug).await?;
                let record = &view.record;

                println!("{} {}", "record".yellow(), record.slug);
                println!("Title:       {}", record.content.title);
                println!("Author:      {}", record.author);
                println!("Updated:     {}", record.updated_at.to_rfc3339());
                if !view.tags.is_empty() {
                    let tags = view.tags.iter().cloned().collect::<Vec<_>>();
                    println!("Tags:        {}", tags.join(", "));
                }
                if !record.tracked {
                    println!("Tracked:     no");
                }
                if !record.content.description.is_empty() {
                    println!("\n    {}", record.content.description);
                }
                if !record.content.body.is_empty() {
                    println!();
                    for line in record.content.body.lines() {
                        println!("    {line}");
                    }
                }
                false
            }
            RecordCommands::List => {
                let branch = session.current_branch().await?;
                for view in repository.list_records(branch.name.as_ref()).await? {
                    println!("{} {}", view.record.slug, view.record.content.title.dimmed());
                }
                false
            }
        },
        Commands::Commit { message } => {
            let outcome = session.commit_current_branch(&message).await?;
            print_outcome("main", &outcome, &message);
            true
        }
        Commands::Merge { source, message } => {
            let outcome = session
                .merge_branch_into_current(&source, message.as_deref())
                .await?;
            let branch = session.current_branch().await?;
            let message = message
                .unwrap_or_else(|| format!("Merge branch '{source}' into {}", branch.name));
            print_outcome(branch.name.as_ref(), &outcome, &message);
            true
        }
        Commands::Changes { branch } => {
            for change in session.branch_changes(&branch).await? {
                let status = match change.change_type.status_char() {
                    'A' => "A".green(),
                    'D' => "D".red(),
                    other => other.to_string().yellow(),
                };
                println!(
                    "{status} {} ({}) {}",
                    change.slug,
                    change.fields.names().join(", "),
                    change.title.dimmed()
                );
            }
            false
        }
        Commands::History { slug, limit } => {
            let slug = Slug::try_parse(slug)?;
            for entry in repository.record_history(&slug, limit).await? {
                let version = entry
                    .version
                    .map(|version| format!("v{version}"))
                    .unwrap_or_default();
                println!(
                    "{} {version} {} ({}) {}",
                    entry.commit_id.to_short_oid().yellow(),
                    entry.change_type,
                    entry.fields.names().join(", "),
                    entry.message.lines().next().unwrap_or_default()
                );
            }
            false
        }
    };

    if mutated {
        repository.persist().await?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::from(exit_code(&error))
        }
    }
}
