use clap::ArgMatches;
use colored::Colorize;
use spindle_markdown::MarkdownConverter;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

// Re-export crawl types and functions from spindle-core
pub use spindle_core::crawl::{
    ContentParams, CrawlOptions, CrawlProgressCallback, PageParams, execute_crawl,
    execute_sitemap, extract_url_host, extract_url_path, generate_crawl_report,
    generate_sitemap_outline, tree_to_json,
};

/// Split a --content-tags argument into selector strings
pub fn split_content_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Expand a user-supplied directory path (including ~)
pub fn resolve_download_dir(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

fn page_params_from(sub_matches: &ArgMatches, include_external: bool) -> PageParams {
    PageParams {
        max_depth: *sub_matches.get_one::<usize>("depth").unwrap(),
        restrict_to_path: sub_matches.get_flag("restrict-to-path"),
        dynamic_content: sub_matches.get_flag("dynamic"),
        delay_millis: *sub_matches.get_one::<u64>("delay").unwrap(),
        include_external,
        wait_selector: sub_matches.get_one::<String>("wait-selector").cloned(),
        wait_millis: sub_matches.get_one::<u64>("wait-millis").copied(),
    }
}

fn write_tree_json(sub_matches: &ArgMatches, tree: &spindle_crawler::SiteNode) {
    if let Some(path) = sub_matches.get_one::<PathBuf>("json") {
        match tree_to_json(tree) {
            Ok(json) => match fs::write(path, json) {
                Ok(()) => println!("{} Tree written to {}", "✓".green().bold(), path.display()),
                Err(e) => eprintln!("✗ Failed to write {}: {}", path.display(), e),
            },
            Err(e) => eprintln!("✗ {}", e),
        }
    }
}

pub async fn handle_crawl(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let url = sub_matches.get_one::<Url>("url").unwrap();
    let output_dir = sub_matches.get_one::<String>("output-dir").unwrap();
    let pages = page_params_from(sub_matches, false);
    let content = ContentParams {
        download_images: sub_matches.get_flag("download-images"),
        max_images: *sub_matches.get_one::<usize>("max-images").unwrap(),
        download_documents: sub_matches.get_flag("download-documents"),
        max_documents: *sub_matches.get_one::<usize>("max-documents").unwrap(),
        content_tags: sub_matches
            .get_one::<String>("content-tags")
            .map(|raw| split_content_tags(raw))
            .unwrap_or_default(),
        get_meta_tags: sub_matches.get_flag("meta-tags"),
        raw_html: sub_matches.get_flag("raw-html"),
    };
    let download_dir = resolve_download_dir(output_dir);

    println!("\n🕷  Crawling {}", url.as_str().bright_white());
    println!("Max depth: {}", pages.max_depth);
    println!("Output directory: {}", download_dir.display());
    if pages.dynamic_content {
        println!("Fetch mode: rendered (WebDriver)");
    }
    println!();

    let options = CrawlOptions {
        url: url.as_str().to_string(),
        download_dir,
        pages,
        content,
        show_progress: true,
    };

    let progress_callback = Arc::new(|msg: String| {
        println!("{}", msg);
    });

    let tree = match execute_crawl(options, Some(progress_callback)).await {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    println!("\n{} Crawl complete!\n", "✓".green().bold());
    print!("{}", generate_crawl_report(&tree));
    write_tree_json(sub_matches, &tree);
}

pub async fn handle_map(sub_matches: &ArgMatches) {
    tracing_subscriber::fmt::init();

    let url = sub_matches.get_one::<Url>("url").unwrap();
    let include_external = sub_matches.get_flag("include-external");
    let pages = page_params_from(sub_matches, include_external);

    println!("\n🕸  Mapping {}", url.as_str().bright_white());
    println!("Max depth: {}", pages.max_depth);
    println!();

    let progress_callback = Arc::new(|msg: String| {
        println!("{}", msg);
    });

    let tree = match execute_sitemap(url.as_str(), pages, true, Some(progress_callback)).await {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    println!("\n{} Sitemap complete!\n", "✓".green().bold());
    print!("{}", generate_sitemap_outline(&tree));
    write_tree_json(sub_matches, &tree);
}

pub fn handle_markdown(sub_matches: &ArgMatches) {
    if let Err(e) = run_markdown(sub_matches) {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}

fn run_markdown(sub_matches: &ArgMatches) -> anyhow::Result<()> {
    let html = match sub_matches.get_one::<PathBuf>("input") {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let max_depth = *sub_matches.get_one::<usize>("max-depth").unwrap();
    let converter = MarkdownConverter::new().with_max_depth(max_depth);
    let markdown = converter.convert(&html);

    match sub_matches.get_one::<PathBuf>("output") {
        Some(path) => {
            fs::write(path, markdown)?;
            println!("{} Markdown written to {}", "✓".green().bold(), path.display());
        }
        None => print!("{}", markdown),
    }
    Ok(())
}
