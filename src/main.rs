use anyhow::Result;
use bilingo::build::build_site;
use bilingo::config::Config;
use bilingo::controller::{Controller, Settings, SwitchOutcome};
use bilingo::document::{Direction, Document};
use bilingo::language::Language;
use bilingo::preference::FileStore;
use bilingo::probe::{HttpFetcher, PageFetcher};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use url::Url;

#[tokio::main]
async fn main() {
    let matches = App::new("bilingo")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .global(true)
                .help("Logs debug output"),
        )
        .arg(
            Arg::with_name("project")
                .short("p")
                .long("project")
                .takes_value(true)
                .global(true)
                .help("Directory in or below the project (default: current directory)"),
        )
        .subcommand(
            SubCommand::with_name("build")
                .about("Renders one page per series into the output directory")
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .takes_value(true)
                        .default_value("_site")
                        .help("Output directory"),
                ),
        )
        .subcommand(
            SubCommand::with_name("filter")
                .about("Runs the language filter against a listing page and reports the result")
                .arg(
                    Arg::with_name("url")
                        .required(true)
                        .help("URL of the listing page"),
                )
                .arg(
                    Arg::with_name("lang")
                        .short("l")
                        .long("lang")
                        .takes_value(true)
                        .possible_values(&["vi", "en"])
                        .help("Switches to this language after the page loads"),
                )
                .arg(
                    Arg::with_name("store")
                        .short("s")
                        .long("store")
                        .takes_value(true)
                        .default_value(".bilingo-preferences.yaml")
                        .help("File holding the stored language preference"),
                ),
        )
        .get_matches();

    bilingo::logging::init(matches.is_present("verbose"));

    if let Err(e) = run(&matches).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(matches: &ArgMatches<'_>) -> Result<()> {
    let project = match matches.value_of("project") {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };

    match matches.subcommand() {
        ("build", Some(sub)) => {
            // default_value guarantees presence
            let output = PathBuf::from(sub.value_of("output").unwrap_or("_site"));
            let config = Config::from_directory(&project, &output)?;
            build_site(&config)?;
            Ok(())
        }
        ("filter", Some(sub)) => filter(&project, sub).await,
        _ => Ok(()),
    }
}

async fn filter(project: &Path, matches: &ArgMatches<'_>) -> Result<()> {
    let settings = match Config::from_directory(project, Path::new("_site")) {
        Ok(config) => config.language,
        Err(e) => {
            debug!(error = %e, "using default language settings");
            Settings::default()
        }
    };

    // `url` is required
    let url = Url::parse(matches.value_of("url").unwrap_or_default())?;
    let store = FileStore::open(Path::new(
        matches
            .value_of("store")
            .unwrap_or(".bilingo-preferences.yaml"),
    ));
    let fetcher = HttpFetcher::new(settings.probe_timeout())?;

    let markup = fetcher.fetch(&url).await?;
    let mut page = Document::parse(url, &markup);
    let mut controller = Controller::new(settings, store, fetcher);
    let mut lang = controller.init(&mut page).await;

    if let Some(code) = matches.value_of("lang") {
        let wanted: Language = code.parse()?;
        if wanted != lang {
            match controller.on_switch_click(&mut page, wanted) {
                SwitchOutcome::Redirect(path) => {
                    println!("redirect: {}", path);
                    return Ok(());
                }
                SwitchOutcome::Filtered(_) => {
                    controller.refresh_pagination(&mut page, wanted).await;
                    lang = wanted;
                }
            }
        }
    }

    report(&page, lang);
    Ok(())
}

fn report(page: &Document, lang: Language) {
    println!("language: {}", lang);
    println!("posts:    {}/{} visible", page.visible_count(), page.items.len());
    for item in page.items.iter() {
        println!(
            "  [{}] {}",
            if item.visible { "shown" } else { "hidden" },
            item.lang.as_deref().unwrap_or("-")
        );
    }
    if let Some(banner) = &page.banner {
        if banner.visible {
            println!("banner:   {}", banner.text);
        }
    }
    for &direction in Direction::BOTH.iter() {
        if let Some(control) = page.control(direction) {
            println!(
                "{:<9} {} ({})",
                format!("{}:", direction.name()),
                if control.visible { "shown" } else { "hidden" },
                control.href.as_deref().unwrap_or("-")
            );
        }
    }
}
