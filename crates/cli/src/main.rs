use anyhow::{Context, Result};
use bookden_config::Settings;
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

mod commands;

fn build_cli() -> Command {
    Command::new("bookden")
        .version("0.1.0")
        .about("Personal e-book library manager")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Path to the config file (default: user config directory)")
                .global(true),
        )
        .subcommand(Command::new("init").about("Create the library layout, database, and config file"))
        .subcommand(
            Command::new("add")
                .about("Add a book file to the library")
                .arg(Arg::new("path").required(true).value_name("FILE").help("Path to the book file"))
                .arg(Arg::new("author").short('a').long("author").required(true).value_name("AUTHOR").help("Author display name"))
                .arg(Arg::new("title").short('t').long("title").required(true).value_name("TITLE").help("Book title"))
                .arg(Arg::new("tags").long("tags").value_name("TAGS").help("Comma-separated tags"))
                .arg(Arg::new("description").long("description").value_name("TEXT").help("Free-text description"))
                .arg(Arg::new("series").long("series").value_name("SERIES").help("Series name"))
                .arg(Arg::new("series-index").long("series-index").value_name("N").help("Position within the series"))
                .arg(Arg::new("move").long("move").help("Delete the source file after a successful commit").action(ArgAction::SetTrue))
                .arg(Arg::new("no-exif").long("no-exif").help("Skip metadata tagging").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("list")
                .about("List all books in the library")
                .arg(Arg::new("sort").short('s').long("sort").value_name("FIELD").help("Sort by: added, author, title, series, read").default_value("added"))
                .arg(Arg::new("desc").long("desc").help("Sort in descending order").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("search")
                .about("Search books by title or author")
                .arg(Arg::new("query").required(true).value_name("QUERY").help("Search text")),
        )
        .subcommand(
            Command::new("info")
                .about("Show detailed information about a book")
                .arg(Arg::new("id").required(true).value_name("BOOK_ID").help("Book ID (UUID)")),
        )
        .subcommand(
            Command::new("edit")
                .about("Edit fields of an existing book record")
                .arg(Arg::new("id").required(true).value_name("BOOK_ID").help("Book ID (UUID)"))
                .arg(Arg::new("title").short('t').long("title").value_name("TITLE").help("New title"))
                .arg(Arg::new("author").short('a').long("author").value_name("AUTHOR").help("New author"))
                .arg(Arg::new("tags").long("tags").value_name("TAGS").help("Replacement comma-separated tags"))
                .arg(Arg::new("series").long("series").value_name("SERIES").help("Series name (empty clears)"))
                .arg(Arg::new("series-index").long("series-index").value_name("N").help("Series position (empty clears)"))
                .arg(Arg::new("description").long("description").value_name("TEXT").help("Description (empty clears)")),
        )
        .subcommand(
            Command::new("read")
                .about("Mark a book as read")
                .arg(Arg::new("id").required(true).value_name("BOOK_ID").help("Book ID (UUID)")),
        )
        .subcommand(
            Command::new("unread")
                .about("Mark a book as unread")
                .arg(Arg::new("id").required(true).value_name("BOOK_ID").help("Book ID (UUID)")),
        )
        .subcommand(
            Command::new("rm")
                .about("Remove a book record (the file stays on disk)")
                .arg(Arg::new("id").required(true).value_name("BOOK_ID").help("Book ID (UUID)")),
        )
        .subcommand(Command::new("incoming").about("List importable files in the upload directory"))
        .subcommand(Command::new("stats").about("Show library statistics"))
        .subcommand(Command::new("config").about("Show the resolved configuration"))
}

fn resolve_config_path(cli_value: Option<&String>) -> Result<PathBuf> {
    match cli_value {
        Some(path) => Ok(PathBuf::from(path)),
        None => Settings::default_config_path().context("Failed to resolve config directory"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let matches = build_cli().get_matches();
    let config_path = resolve_config_path(matches.get_one::<String>("config"))?;
    let settings = Settings::load_or_default(&config_path);

    match matches.subcommand() {
        Some(("init", _)) => commands::init(&settings, &config_path).await,
        Some(("add", sub_matches)) => commands::add_book(&settings, sub_matches).await,
        Some(("list", sub_matches)) => commands::list_books(&settings, sub_matches).await,
        Some(("search", sub_matches)) => commands::search_books(&settings, sub_matches).await,
        Some(("info", sub_matches)) => commands::show_book_info(&settings, sub_matches).await,
        Some(("edit", sub_matches)) => commands::edit_book(&settings, sub_matches).await,
        Some(("read", sub_matches)) => commands::mark_read(&settings, sub_matches, true).await,
        Some(("unread", sub_matches)) => commands::mark_read(&settings, sub_matches, false).await,
        Some(("rm", sub_matches)) => commands::remove_book(&settings, sub_matches).await,
        Some(("incoming", _)) => commands::list_incoming(&settings).await,
        Some(("stats", _)) => commands::show_stats(&settings).await,
        Some(("config", _)) => commands::show_config(&settings, &config_path),
        _ => {
            build_cli().print_help().context("Failed to print help")?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_requires_author_and_title() {
        let result = build_cli().try_get_matches_from(["bookden", "add", "/tmp/x.pdf"]);
        assert!(result.is_err());

        let result = build_cli().try_get_matches_from([
            "bookden", "add", "/tmp/x.pdf", "-a", "Author", "-t", "Title",
        ]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_add_flags() {
        let matches = build_cli()
            .try_get_matches_from([
                "bookden", "add", "/tmp/x.pdf", "-a", "A", "-t", "T", "--move", "--no-exif",
                "--tags", "a,b",
            ])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert!(sub.get_flag("move"));
        assert!(sub.get_flag("no-exif"));
        assert_eq!(sub.get_one::<String>("tags").unwrap(), "a,b");
    }

    #[test]
    fn test_list_defaults_to_added() {
        let matches = build_cli()
            .try_get_matches_from(["bookden", "list"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.get_one::<String>("sort").unwrap(), "added");
        assert!(!sub.get_flag("desc"));
    }

    #[test]
    fn test_rm_requires_id() {
        assert!(build_cli().try_get_matches_from(["bookden", "rm"]).is_err());
    }

    #[test]
    fn test_resolve_config_path_prefers_cli_value() {
        let path = resolve_config_path(Some(&"/tmp/custom.toml".to_string())).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/custom.toml"));
    }
}
