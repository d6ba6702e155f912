use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use orgblog::build::build_site;
use orgblog::config::Config;
use orgblog::post::Loader;
use orgblog::query::{self, Query};
use std::path::Path;

fn main() {
    env_logger::init();

    let matches = App::new("orgblog")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Builds a static blog from org-exported HTML posts")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Render index and post pages into an output directory")
                .arg(
                    Arg::with_name("output")
                        .help("The output directory")
                        .required(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("List posts matching a search term and category")
                .arg(
                    Arg::with_name("search")
                        .long("search")
                        .takes_value(true)
                        .help("Match against titles, excerpts, and tags"),
                )
                .arg(
                    Arg::with_name("category")
                        .long("category")
                        .takes_value(true)
                        .help("Only posts with this tag"),
                )
                .arg(
                    Arg::with_name("page")
                        .long("page")
                        .takes_value(true)
                        .default_value("1")
                        .help("1-indexed page of results"),
                ),
        )
        .get_matches();

    if let Err(err) = run(&matches) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    match matches.subcommand() {
        ("build", Some(matches)) => {
            // `output` is required, so it's always present
            let output = Path::new(matches.value_of("output").unwrap());
            let config = Config::from_directory(&cwd, output)?;
            build_site(&config)?;
        }
        ("list", Some(matches)) => {
            // the output directory is irrelevant for listing
            let config = Config::from_directory(&cwd, &cwd)?;
            let loader = Loader::new(
                &config.index_url,
                &config.posts_url,
                &config.posts_output_directory,
            );
            let posts = loader.load_posts(&config.posts_source_directory, &config.index_file)?;

            let query = Query {
                search: matches.value_of("search").unwrap_or("").to_owned(),
                category: matches.value_of("category").unwrap_or("").to_owned(),
            };
            let matching = query::filter(&posts, &query);
            if matching.is_empty() {
                println!("No posts found.");
                return Ok(());
            }

            let page: usize = matches.value_of("page").unwrap_or("1").parse()?;
            let total = query::total_pages(matching.len(), config.index_page_size);
            for post in query::page_slice(&matching, page, config.index_page_size) {
                let tags: Vec<&str> = post.tags.iter().map(|tag| tag.name.as_str()).collect();
                println!("{}  {}  [{}]", post.date, post.title, tags.join(", "));
            }
            println!("Page {} of {} ({} posts)", page, total, matching.len());
        }
        _ => unreachable!("clap requires a known subcommand"),
    }
    Ok(())
}
