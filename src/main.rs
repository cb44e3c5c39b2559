use clap::{Parser, Subcommand};
use dynojax::core::config::{self, ResolvedConfig};
use dynojax::fetch::{FragmentFetcher, HttpTransport};
use dynojax::host::memory::{MemoryHost, MemoryRegion};
use dynojax::host::Region;
use dynojax::{Event, EventBus, Host, NavigateOptions, Navigator};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::error::Error;
use std::fs::File;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "dynojax", about = "Fragment navigation against a dynojax-aware server")]
struct Args {
    /// Server origin page URLs are resolved against
    #[arg(short, long)]
    base_url: Option<String>,

    /// Log level for dynojax.log (falls back to DYNOJAX_LOG, then debug)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch one fragment and print it
    Fetch {
        url: String,
        #[arg(short, long, default_value = "main")]
        component: String,
    },
    /// Run a headless session: load each page in order, then go back
    Browse {
        #[arg(required = true)]
        pages: Vec<String>,
        #[arg(short, long, default_value = "main")]
        component: String,
        /// How many back steps to replay after loading
        #[arg(long, default_value_t = 0)]
        back: usize,
        /// Browser user agent to emulate; old iOS falls back to full page loads
        #[arg(long)]
        user_agent: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let level = args
        .log_level
        .clone()
        .or_else(|| std::env::var("DYNOJAX_LOG").ok())
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Debug);

    // Initialize file logger - writes to dynojax.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("dynojax.log") {
        let _ = WriteLogger::init(level, log_config, log_file);
    }

    let file_config = config::load_config()?;
    let resolved = config::resolve(&file_config, args.base_url.as_deref());
    log::info!("dynojax starting against {}", resolved.base_url);

    match args.command {
        Command::Fetch { url, component } => fetch(&resolved, &component, &url).await,
        Command::Browse {
            pages,
            component,
            back,
            user_agent,
        } => browse(&resolved, &component, &pages, back, user_agent.as_deref()).await,
    }
}

fn print_event(event: &Event) {
    match event {
        Event::End { status_code, .. }
        | Event::WidgetEnd { status_code, .. }
        | Event::PopstateEnd { status_code, .. } => {
            let status = status_code.map_or("-".to_string(), |s| s.to_string());
            let (name, component, page) = (event.name(), event.component(), event.page());
            println!("[{name}] {component} {page} ({status})");
        }
        Event::ResponseFail {
            status_code,
            status_text,
            ..
        } => println!(
            "[{}] {} {} ({} {})",
            event.name(),
            event.component(),
            event.page(),
            status_code,
            status_text
        ),
        Event::Error { cause, .. } => {
            let (name, component, page) = (event.name(), event.component(), event.page());
            println!("[{name}] {component} {page}: {cause}")
        }
        _ => println!("[{}] {} {}", event.name(), event.component(), event.page()),
    }
}

async fn fetch(
    config: &ResolvedConfig,
    component: &str,
    url: &str,
) -> Result<(), Box<dyn Error>> {
    let transport = Arc::new(HttpTransport::with_timeout(&config.base_url, config.timeout)?);
    let host = Arc::new(MemoryHost::new(url, ""));
    let events = EventBus::new();
    events.subscribe(print_event);

    let fetcher = FragmentFetcher::new(transport, host.clone(), events);
    let result = fetcher.fetch_component(component, url, &config.defaults).await;

    let status = result.status_code.map_or("-".to_string(), |s| s.to_string());
    println!("status: {status}");
    println!("title:  {}", result.title.as_deref().unwrap_or("-"));
    if let Some(target) = host.navigations().last() {
        println!("reload: {target}");
    }
    if let Some(data) = result.data {
        println!();
        println!("{data}");
    }
    Ok(())
}

async fn browse(
    config: &ResolvedConfig,
    component: &str,
    pages: &[String],
    back: usize,
    user_agent: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let transport = Arc::new(HttpTransport::with_timeout(&config.base_url, config.timeout)?);
    let host = Arc::new(match user_agent {
        Some(ua) => MemoryHost::with_user_agent("/", "", ua),
        None => MemoryHost::new("/", ""),
    });
    let region = MemoryRegion::new(component, "");

    let navigator = Navigator::builder(host.clone(), transport)
        .region(region.clone())
        .defaults(config.defaults.clone())
        .marker_attribute(config.marker_attribute.clone())
        .build();
    navigator.events().subscribe(print_event);

    for page in pages {
        navigator.load(component, page, &NavigateOptions::default()).await;
    }

    for _ in 0..back {
        match host.back() {
            Some(state) => {
                navigator.handle_popstate(state.as_ref()).await;
            }
            None => {
                println!("(no earlier history entry)");
                break;
            }
        }
    }

    println!();
    println!("location: {}", host.location());
    println!("title:    {}", host.title());
    println!("history:  {} entries", host.history_len());
    if !host.navigations().is_empty() {
        println!("full page loads: {}", host.navigations().join(", "));
    }
    println!("region:   {}", region.selector());
    println!();
    println!("{}", region.content());
    Ok(())
}
