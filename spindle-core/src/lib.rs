pub mod crawl;

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
             _           _ _
   ___ _ __ (_)_ __   __| | | ___
  / __| '_ \| | '_ \ / _` | |/ _ \
  \__ \ |_) | | | | | (_| | |  __/
  |___/ .__/|_|_| |_|\__,_|_|\___|
      |_|
"#;
    println!("{}", banner.bright_cyan());
    println!(
        "  {} v{}\n",
        "site crawler / sitemap / markdown".bright_white(),
        env!("CARGO_PKG_VERSION")
    );
}
