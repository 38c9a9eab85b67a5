use chrono::{FixedOffset, Local, TimeZone, Utc};
use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use notemint::api::{CmdMessage, IndexOverview, MessageLevel, MintApi, MintPaths};
use notemint::config::MintConfig;
use notemint::error::{MintError, Result};
use notemint::fix::{AuthorFixer, CreatedFixer, FilenameFixer, Fixer, IdFixer, TitleFixer};
use notemint::registry::Registry;
use notemint::store::fs::FileStore;
use std::path::PathBuf;
use unicode_width::UnicodeWidthStr;

mod args;
use args::{BacklinkCommands, Cli, Commands, FixCommands, IndexCommands};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    api: MintApi<FileStore>,
    cwd: PathBuf,
    skip_confirm: bool,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Summary { count }) => handle_summary(&mut ctx, count),
        Some(Commands::Index { command }) => match command {
            Some(IndexCommands::Create { name }) => handle_index_create(&mut ctx, &name),
            Some(IndexCommands::Delete { name }) => handle_index_delete(&mut ctx, &name),
            Some(IndexCommands::Reload) => handle_index_reload(&mut ctx),
            Some(IndexCommands::Archive { names }) => handle_index_archive(&mut ctx, &names),
            None => handle_index_overview(&mut ctx),
        },
        Some(Commands::Fix { command, count }) => match command {
            Some(command) => handle_fix(&mut ctx, command),
            None => handle_fix_report(&mut ctx, count.unwrap_or(5)),
        },
        Some(Commands::Backlink { command }) => match command {
            BacklinkCommands::Set { mode, files } => handle_backlink_set(&mut ctx, &mode, &files),
            BacklinkCommands::Gen => handle_backlink_gen(&mut ctx),
        },
        Some(Commands::Config { author }) => handle_config(&mut ctx, author.as_deref()),
        None => handle_summary(&mut ctx, 5),
    }
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    // NOTEMINT_HOME overrides the platform dirs, mainly for hermetic tests.
    let (data_dir, config_dir) = match std::env::var_os("NOTEMINT_HOME") {
        Some(home) => {
            let home = PathBuf::from(home);
            (home.join("data"), home.join("config"))
        }
        None => {
            let dirs = ProjectDirs::from("com", "notemint", "notemint")
                .ok_or_else(|| MintError::Api("Could not determine a home directory".into()))?;
            (
                dirs.data_dir().to_path_buf(),
                dirs.config_dir().to_path_buf(),
            )
        }
    };

    let registry = Registry::load(FileStore::new(), local_zone(), &data_dir)?;
    let paths = MintPaths {
        data: data_dir,
        config: config_dir,
    };

    Ok(AppContext {
        api: MintApi::new(registry, paths),
        cwd,
        skip_confirm: cli.yes,
    })
}

/// The local UTC offset at startup, applied to every note timestamp.
fn local_zone() -> FixedOffset {
    *Local::now().offset()
}

fn handle_summary(ctx: &mut AppContext, count: usize) -> Result<()> {
    let result = ctx.api.summary(count)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_index_overview(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.index_overview()?;
    print_indices(&result.indices);
    print_messages(&result.messages);
    Ok(())
}

fn handle_index_create(ctx: &mut AppContext, name: &str) -> Result<()> {
    let cwd = ctx.cwd.clone();
    let result = ctx.api.create_index(name, &cwd, ctx.skip_confirm)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_index_delete(ctx: &mut AppContext, name: &str) -> Result<()> {
    let result = ctx.api.delete_index(name, ctx.skip_confirm)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_index_reload(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.reload_indices()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_index_archive(ctx: &mut AppContext, names: &[String]) -> Result<()> {
    let cwd = ctx.cwd.clone();
    let result = ctx.api.archive_indices(names, &cwd)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_fix_report(ctx: &mut AppContext, count: usize) -> Result<()> {
    let result = ctx.api.fix_report(count)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_fix(ctx: &mut AppContext, command: FixCommands) -> Result<()> {
    let (fixers, files, count) = match command {
        FixCommands::Created { files, count } => {
            (vec![Fixer::Created(CreatedFixer::new())], files, count)
        }
        FixCommands::Id {
            files,
            count,
            resolve,
        } => (vec![Fixer::Id(IdFixer::new(resolve))], files, count),
        FixCommands::Title { files, count } => {
            (vec![Fixer::Title(TitleFixer::new())], files, count)
        }
        FixCommands::Author {
            files,
            count,
            author,
        } => {
            let author = resolve_author(ctx, author)?.ok_or_else(|| {
                MintError::Api(
                    "No author given. Pass --author or set one with 'nm config --author'".into(),
                )
            })?;
            (vec![Fixer::Author(AuthorFixer::new(&author))], files, count)
        }
        FixCommands::Filename {
            files,
            count,
            complete,
            force,
        } => {
            let fixer = if complete {
                FilenameFixer::rebuilding(force)
            } else {
                FilenameFixer::new()
            };
            (vec![Fixer::Filename(fixer)], files, count)
        }
        FixCommands::All {
            files,
            count,
            resolve,
            author,
        } => {
            let mut fixers = vec![
                Fixer::Created(CreatedFixer::new()),
                Fixer::Id(IdFixer::new(resolve)),
                Fixer::Title(TitleFixer::new()),
                Fixer::Filename(FilenameFixer::new()),
            ];
            // The author fixer joins only when an author is actually known.
            if let Some(author) = resolve_author(ctx, author)? {
                fixers.push(Fixer::Author(AuthorFixer::new(&author)));
            }
            (fixers, files, count)
        }
    };

    let cwd = ctx.cwd.clone();
    let result = ctx
        .api
        .fix(&fixers, &files, &cwd, count, ctx.skip_confirm)?;
    print_messages(&result.messages);
    Ok(())
}

fn resolve_author(ctx: &AppContext, flag: Option<String>) -> Result<Option<String>> {
    if let Some(author) = flag {
        if !author.trim().is_empty() {
            return Ok(Some(author));
        }
    }
    let config = MintConfig::load(&ctx.api.paths().config)?;
    if config.has_author() {
        return Ok(Some(config.author));
    }
    Ok(None)
}

fn handle_backlink_set(ctx: &mut AppContext, mode: &str, files: &[PathBuf]) -> Result<()> {
    let cwd = ctx.cwd.clone();
    let result = ctx
        .api
        .set_backlinks(mode == "on", files, &cwd, ctx.skip_confirm)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_backlink_gen(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.generate_backlinks(ctx.skip_confirm)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &mut AppContext, author: Option<&str>) -> Result<()> {
    let result = ctx.api.config(author)?;
    print_messages(&result.messages);
    Ok(())
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

const TIME_WIDTH: usize = 14;

fn print_indices(indices: &[IndexOverview]) {
    if indices.is_empty() {
        return;
    }

    let name_width = indices
        .iter()
        .map(|overview| overview.name.width())
        .max()
        .unwrap_or(0);

    for overview in indices {
        let padding = " ".repeat(name_width.saturating_sub(overview.name.width()) + 2);
        let touched = match overview.last_modified {
            Some(timestamp) => format_time_ago(timestamp),
            None => " ".repeat(TIME_WIDTH),
        };
        println!(
            "{}{}{:>5} notes  {}  {}",
            overview.name.bold(),
            padding,
            overview.notes,
            touched.dimmed(),
            overview.path.display().to_string().dimmed()
        );
    }
}

fn format_time_ago(timestamp: i64) -> String {
    let then = Utc
        .timestamp_opt(timestamp, 0)
        .single()
        .unwrap_or_else(Utc::now);
    let duration = Utc::now().signed_duration_since(then);

    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());

    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
