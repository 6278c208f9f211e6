use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("spindle")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("spindle")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl a site from a root URL, capturing page content to disk and \
                building a tree of everything visited.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The URL to start crawling from")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-o --"output-dir" <PATH>)
                        .required(false)
                        .help("Directory for captured pages and downloaded resources")
                        .default_value("./spindle_pages"),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("Maximum link depth to follow from the root")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("2"),
                )
                .arg(
                    arg!(--"restrict-to-path" "Only visit URLs prefixed by the root URL")
                        .required(false)
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"dynamic" "Fetch pages through a WebDriver session (rendered HTML)")
                        .required(false)
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"wait-selector" <CSS>)
                        .required(false)
                        .help("With --dynamic: wait for this selector before reading each page"),
                )
                .arg(
                    arg!(--"wait-millis" <MILLIS>)
                        .required(false)
                        .help("With --dynamic: fixed wait before reading each page")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"delay" <MILLIS>)
                        .required(false)
                        .help("Delay before each request, in milliseconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("0"),
                )
                .arg(
                    arg!(--"download-images" "Also download images found on captured pages")
                        .required(false)
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"max-images" <N>)
                        .required(false)
                        .help("Cap on image downloads per page (0 = unlimited)")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("0"),
                )
                .arg(
                    arg!(--"download-documents" "Also download linked documents (pdf, zip, ...)")
                        .required(false)
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"max-documents" <N>)
                        .required(false)
                        .help("Cap on document downloads per page (0 = unlimited)")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("0"),
                )
                .arg(
                    arg!(--"content-tags" <TAGS>)
                        .required(false)
                        .help("Comma-separated selectors restricting extracted text (default: whole page)"),
                )
                .arg(
                    arg!(--"meta-tags" "Capture meta tags for each page")
                        .required(false)
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"raw-html" "Persist raw HTML instead of extracted text")
                        .required(false)
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"json" <PATH>)
                        .required(false)
                        .help("Write the visited-page tree as JSON to this file")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .subcommand(
            command!("map")
                .about("Build a link-only sitemap tree of a site, without capturing content.")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The URL to start mapping from")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("Maximum link depth to follow from the root")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("2"),
                )
                .arg(
                    arg!(--"restrict-to-path" "Only visit URLs prefixed by the root URL")
                        .required(false)
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"include-external" "Also include external links in the map")
                        .required(false)
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"dynamic" "Fetch pages through a WebDriver session (rendered HTML)")
                        .required(false)
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"wait-selector" <CSS>)
                        .required(false)
                        .help("With --dynamic: wait for this selector before reading each page"),
                )
                .arg(
                    arg!(--"wait-millis" <MILLIS>)
                        .required(false)
                        .help("With --dynamic: fixed wait before reading each page")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"delay" <MILLIS>)
                        .required(false)
                        .help("Delay before each request, in milliseconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("0"),
                )
                .arg(
                    arg!(--"json" <PATH>)
                        .required(false)
                        .help("Write the sitemap tree as JSON to this file")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .subcommand(
            command!("markdown")
                .about("Convert an HTML file (or stdin) to Markdown.")
                .arg(
                    arg!(-i --"input" <PATH>)
                        .required(false)
                        .help("HTML file to convert (default: read stdin)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Write the Markdown here (default: stdout)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"max-depth" <N>)
                        .required(false)
                        .help("Recursion guard for deeply nested markup")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("100"),
                ),
        )
}
