//! Command implementations for the bookden shell

use anyhow::{anyhow, bail, Context, Result};
use bookden_config::Settings;
use bookden_core::{normalize_tags, Book, BookId, BookPatch};
use bookden_library::{AddBookRequest, AddReport, ImportOptions, LibraryConfig, LibraryManager};
use bookden_store::SortField;
use clap::ArgMatches;
use console::style;
use std::path::Path;

fn library_config(settings: &Settings) -> LibraryConfig {
    let mut config = LibraryConfig::new(&settings.db_path)
        .with_library_root(&settings.library_root)
        .with_upload_dir(&settings.upload_dir);
    if let Some(exiftool) = &settings.exiftool_path {
        config = config.with_exiftool(exiftool);
    }
    config
}

async fn open_manager(settings: &Settings) -> Result<LibraryManager> {
    LibraryManager::new(library_config(settings))
        .await
        .context("Failed to open the library")
}

fn parse_book_id(matches: &ArgMatches) -> Result<BookId> {
    let raw = matches
        .get_one::<String>("id")
        .ok_or_else(|| anyhow!("Book ID is required"))?;
    BookId::from_string(raw).map_err(|_| anyhow!("'{}' is not a valid book ID", raw))
}

fn print_book_summary(book: &Book) {
    let read_marker = if book.is_read() { "read" } else { "unread" };
    println!(
        "{}  {} - {}",
        style(&book.id).dim(),
        style(&book.title).bold(),
        book.author
    );
    println!(
        "    added {}  [{}]  tags: {}",
        book.added,
        read_marker,
        if book.tags.is_empty() {
            "-".to_string()
        } else {
            book.tags.join(", ")
        }
    );
}

/// Create the library layout, database, and config file
pub async fn init(settings: &Settings, config_path: &Path) -> Result<()> {
    std::fs::create_dir_all(&settings.library_root)
        .with_context(|| format!("Failed to create '{}'", settings.library_root.display()))?;
    std::fs::create_dir_all(&settings.upload_dir)
        .with_context(|| format!("Failed to create '{}'", settings.upload_dir.display()))?;

    // Opening the manager runs migrations
    let _manager = open_manager(settings).await?;

    if !config_path.exists() {
        settings
            .save(config_path)
            .context("Failed to write config file")?;
        println!("Config written to {}", config_path.display());
    }

    println!("{} Library initialized", style("✓").green().bold());
    println!("  Database: {}", settings.db_path);
    println!("  Library root: {}", settings.library_root.display());
    println!("  Upload dir: {}", settings.upload_dir.display());
    Ok(())
}

/// Run the add-book workflow
pub async fn add_book(settings: &Settings, matches: &ArgMatches) -> Result<()> {
    let source = matches
        .get_one::<String>("path")
        .ok_or_else(|| anyhow!("File path is required"))?;
    let author = matches
        .get_one::<String>("author")
        .ok_or_else(|| anyhow!("Author is required"))?;
    let title = matches
        .get_one::<String>("title")
        .ok_or_else(|| anyhow!("Title is required"))?;

    let mut request = AddBookRequest::new(source, author, title);
    if let Some(tags) = matches.get_one::<String>("tags") {
        request = request.with_tags(normalize_tags(tags));
    }
    if let Some(description) = matches.get_one::<String>("description") {
        request = request.with_description(description);
    }
    if let Some(series) = matches.get_one::<String>("series") {
        let index = matches
            .get_one::<String>("series-index")
            .map(|raw| raw.parse::<f32>())
            .transpose()
            .map_err(|_| anyhow!("--series-index must be a number"))?;
        request = request.with_series(series, index);
    }

    let options = ImportOptions {
        remove_source: matches.get_flag("move"),
        write_metadata: !matches.get_flag("no-exif"),
    };

    let manager = open_manager(settings).await?;
    let result = manager.add_book(request, options).await;

    // The one fatal outcome gets a distinct, loud block: the library and
    // store disagree and need a manual fix.
    if let Err(e) = &result {
        if e.is_critical() {
            eprintln!();
            eprintln!("{}", style("!! MANUAL INTERVENTION REQUIRED !!").red().bold());
            eprintln!("{}", style(e.to_string()).red());
            eprintln!("{}", e.user_message());
            bail!("add-book failed with a library inconsistency");
        }
    }

    let report = AddReport::from_result(&result);
    if report.success {
        println!("{} {}", style("✓").green().bold(), report.message);
        Ok(())
    } else {
        bail!(report.message)
    }
}

/// List all books, sorted
pub async fn list_books(settings: &Settings, matches: &ArgMatches) -> Result<()> {
    let field: SortField = matches
        .get_one::<String>("sort")
        .map(|s| s.as_str())
        .unwrap_or("added")
        .parse()
        .map_err(|e| anyhow!("{}", e))?;
    let descending = matches.get_flag("desc");

    let manager = open_manager(settings).await?;
    let books = manager
        .sort_books(field, descending)
        .await
        .context("Failed to list books")?;

    if books.is_empty() {
        println!("No books in library. Use 'add' to import one.");
        return Ok(());
    }

    println!("\n{} books in library", style(books.len()).bold().cyan());
    println!("{}", "=".repeat(72));
    for book in &books {
        print_book_summary(book);
    }
    Ok(())
}

/// Search books by title or author
pub async fn search_books(settings: &Settings, matches: &ArgMatches) -> Result<()> {
    let query = matches
        .get_one::<String>("query")
        .ok_or_else(|| anyhow!("Search query is required"))?;

    let manager = open_manager(settings).await?;
    let results = manager.search(query).await.context("Search failed")?;

    if results.is_empty() {
        println!("No books found matching '{}'", query);
        return Ok(());
    }

    println!(
        "\n{} results for '{}'",
        style(results.len()).bold().cyan(),
        query
    );
    println!("{}", "=".repeat(72));
    for book in &results {
        print_book_summary(book);
    }
    Ok(())
}

/// Show one book in full
pub async fn show_book_info(settings: &Settings, matches: &ArgMatches) -> Result<()> {
    let id = parse_book_id(matches)?;
    let manager = open_manager(settings).await?;
    let book = manager.get_book(id).await.context("Book not found")?;

    println!("{}", style(&book.title).bold());
    println!("  ID: {}", book.id);
    println!("  Author: {}", book.author);
    println!("  Added: {}", book.added);
    println!("  Tags: {}", book.tags.join(", "));
    if let Some(series) = &book.series {
        match book.series_index {
            Some(index) => println!("  Series: {} #{}", series, index),
            None => println!("  Series: {}", series),
        }
    }
    if let Some(description) = &book.description {
        println!("  Description: {}", description);
    }
    println!(
        "  Read: {}",
        book.read.as_deref().filter(|r| !r.is_empty()).unwrap_or("no")
    );
    match manager.book_path(&book) {
        Ok(path) => println!("  File: {}", path.display()),
        Err(_) => println!("  File: (none attached)"),
    }
    if !book.other_formats.is_empty() {
        println!("  Other formats: {}", book.other_formats.join(", "));
    }
    Ok(())
}

/// Merge field edits into a record
pub async fn edit_book(settings: &Settings, matches: &ArgMatches) -> Result<()> {
    let id = parse_book_id(matches)?;

    // For optional record fields an empty value clears the field
    let clearable = |raw: &String| -> Option<String> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(raw.clone())
        }
    };

    let mut patch = BookPatch::default();
    if let Some(title) = matches.get_one::<String>("title") {
        patch.title = Some(title.clone());
    }
    if let Some(author) = matches.get_one::<String>("author") {
        patch.author = Some(author.clone());
    }
    if let Some(tags) = matches.get_one::<String>("tags") {
        patch.tags = Some(normalize_tags(tags));
    }
    if let Some(series) = matches.get_one::<String>("series") {
        patch.series = Some(clearable(series));
    }
    if let Some(raw) = matches.get_one::<String>("series-index") {
        patch.series_index = if raw.trim().is_empty() {
            Some(None)
        } else {
            Some(Some(
                raw.parse::<f32>()
                    .map_err(|_| anyhow!("--series-index must be a number"))?,
            ))
        };
    }
    if let Some(description) = matches.get_one::<String>("description") {
        patch.description = Some(clearable(description));
    }

    if patch.is_empty() {
        bail!("Nothing to change; pass at least one field flag");
    }

    let manager = open_manager(settings).await?;
    let book = manager
        .update_book(id, patch)
        .await
        .context("Failed to update book")?;

    println!("{} Book updated", style("✓").green().bold());
    print_book_summary(&book);
    Ok(())
}

/// Mark a book read or unread
pub async fn mark_read(settings: &Settings, matches: &ArgMatches, read: bool) -> Result<()> {
    let id = parse_book_id(matches)?;
    let manager = open_manager(settings).await?;

    let book = if read {
        manager.mark_read(id).await
    } else {
        manager.mark_unread(id).await
    }
    .context("Failed to update read marker")?;

    println!(
        "{} '{}' marked as {}",
        style("✓").green().bold(),
        book.title,
        if read { "read" } else { "unread" }
    );
    Ok(())
}

/// Remove a record; the backing file is intentionally left on disk
pub async fn remove_book(settings: &Settings, matches: &ArgMatches) -> Result<()> {
    let id = parse_book_id(matches)?;
    let manager = open_manager(settings).await?;

    let book = manager.get_book(id).await.context("Book not found")?;
    manager
        .remove_book(id)
        .await
        .context("Failed to remove book")?;

    println!("{} '{}' removed from the library", style("✓").green().bold(), book.title);
    if let Ok(path) = manager.book_path(&book) {
        println!("  The file at '{}' was left in place.", path.display());
    }
    Ok(())
}

/// List importable files waiting in the upload directory
pub async fn list_incoming(settings: &Settings) -> Result<()> {
    let manager = open_manager(settings).await?;
    let files = manager
        .incoming()
        .context("Failed to scan the upload directory")?;

    if files.is_empty() {
        println!("No importable files in '{}'", settings.upload_dir.display());
        return Ok(());
    }

    println!(
        "\n{} importable files in '{}'",
        style(files.len()).bold().cyan(),
        settings.upload_dir.display()
    );
    for file in &files {
        println!("  {}", file.display());
    }
    Ok(())
}

/// Show library statistics
pub async fn show_stats(settings: &Settings) -> Result<()> {
    let manager = open_manager(settings).await?;
    let stats = manager.stats().await.context("Failed to compute stats")?;

    println!("{}", style("Library statistics").bold());
    println!("  Books: {}", stats.total_books);
    println!("  Read: {}", stats.read_count);
    println!("  Authors: {}", stats.unique_authors);
    println!("  Tags: {}", stats.unique_tags);
    Ok(())
}

/// Show the resolved configuration
pub fn show_config(settings: &Settings, config_path: &Path) -> Result<()> {
    println!("Config file: {}", config_path.display());
    println!("  db_path: {}", settings.db_path);
    println!("  library_root: {}", settings.library_root.display());
    println!("  upload_dir: {}", settings.upload_dir.display());
    println!(
        "  exiftool_path: {}",
        settings
            .exiftool_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_config_wiring() {
        let settings = Settings {
            db_path: "x.db".to_string(),
            library_root: "/books".into(),
            upload_dir: "/incoming".into(),
            exiftool_path: Some("/usr/bin/exiftool".into()),
        };

        let config = library_config(&settings);
        assert_eq!(config.db_path, "x.db");
        assert_eq!(config.library_root, Path::new("/books"));
        assert_eq!(config.upload_dir.as_deref(), Some(Path::new("/incoming")));
        assert_eq!(
            config.exiftool_path.as_deref(),
            Some(Path::new("/usr/bin/exiftool"))
        );
    }

    #[test]
    fn test_library_config_without_exiftool() {
        let settings = Settings::default();
        let config = library_config(&settings);
        assert!(config.exiftool_path.is_none());
    }
}
