use anyhow::{Context, Result};
use clap::{App, Arg, ArgMatches};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use xmldoc_site::build::build_site;
use xmldoc_site::config::{Config, Overrides};
use xmldoc_site::model::load_tree;

fn main() {
    let matches = App::new("xmldoc-site")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::with_name("symbols")
                .help("The symbol tree to document (YAML)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("DIR")
                .help("Where to write the site"),
        )
        .arg(
            Arg::with_name("templates")
                .short("t")
                .long("templates")
                .takes_value(true)
                .value_name("DIR")
                .help("Site-specific templates; these replace same-named default templates"),
        )
        .arg(
            Arg::with_name("base-templates")
                .long("base-templates")
                .takes_value(true)
                .value_name("DIR")
                .help("The default templates"),
        )
        .arg(
            Arg::with_name("static")
                .long("static")
                .takes_value(true)
                .value_name("DIR")
                .help("Static files copied into the site root (never overwriting)"),
        )
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .takes_value(true)
                .value_name("FILE")
                .help("Project file; defaults to the nearest xmldoc-site.yaml"),
        )
        .arg(
            Arg::with_name("outline")
                .long("outline")
                .help("Print the symbol tree instead of building the site"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("Log progress (-vv for every file)"),
        )
        .get_matches();

    let filter = match matches.occurrences_of("verbose") {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run(&matches) {
        tracing::error!("{:#}", err);
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    // `symbols` is required, so clap has already rejected its absence.
    let symbols = PathBuf::from(matches.value_of("symbols").unwrap_or_default());
    let root = load_tree(&symbols)?;

    if matches.is_present("outline") {
        print!("{}", root.outline());
        return Ok(());
    }

    let config = load_config(matches, &symbols)?.with_overrides(Overrides {
        template_directory: matches.value_of("templates").map(PathBuf::from),
        default_template_directory: matches.value_of("base-templates").map(PathBuf::from),
        static_directory: matches.value_of("static").map(PathBuf::from),
        output_directory: matches.value_of("output").map(PathBuf::from),
    });

    let stats = build_site(&config, &root)
        .with_context(|| format!("Building site into `{}`", config.output_directory.display()))?;
    println!(
        "Wrote {} pages in {} namespaces to {} ({} assets copied, {} already present)",
        stats.pages,
        stats.directories,
        config.output_directory.display(),
        stats.assets.copied,
        stats.assets.skipped,
    );
    Ok(())
}

/// Uses `--config` when given, otherwise the nearest project file above the
/// symbols file, otherwise the defaults.
fn load_config(matches: &ArgMatches, symbols: &Path) -> Result<Config> {
    if let Some(path) = matches.value_of("config") {
        return Config::from_project_file(Path::new(path));
    }
    let symbols_dir = match symbols.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_owned(),
        _ => PathBuf::from("."),
    };
    match Config::find_project_file(&symbols_dir) {
        Some(path) => {
            tracing::info!(path = %path.display(), "Using project file");
            Config::from_project_file(&path)
        }
        None => Ok(Config::default()),
    }
}
