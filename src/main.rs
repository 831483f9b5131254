use anyhow::Result;
use clap::Parser;
use freeswitch_exporter::{
    config::Config,
    fetcher::Fetcher,
    output::{FormattedOutput, OutputFormat},
    server,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// FreeSWITCH host (overrides config)
    #[arg(long, env = "FREESWITCH_HOST")]
    host: Option<String>,

    /// FreeSWITCH event socket port (overrides config)
    #[arg(long, env = "FREESWITCH_PORT")]
    port: Option<u16>,

    /// FreeSWITCH event socket password (overrides config)
    #[arg(long, env = "FREESWITCH_PASSWORD")]
    pass: Option<String>,

    /// Run as an HTTP server instead of printing once
    #[arg(long, env = "EXPORTER_SERVE")]
    serve: bool,

    /// Address to listen on
    #[arg(long, env = "EXPORTER_ADDR")]
    listen_address: Option<String>,

    /// Port to listen on
    #[arg(long, env = "EXPORTER_PORT")]
    listen_port: Option<u16>,

    /// Output format when printing once
    #[arg(long, value_enum, default_value = "line")]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so one-shot output on stdout stays parseable
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)?;

    if let Some(host) = args.host {
        config.freeswitch.host = host;
    }
    if let Some(port) = args.port {
        config.freeswitch.port = port;
    }
    if let Some(pass) = args.pass {
        config.freeswitch.password = secrecy::SecretString::from(pass);
    }
    if args.serve {
        config.server.serve = true;
    }
    if let Some(addr) = args.listen_address {
        config.server.addr = addr;
    }
    if let Some(port) = args.listen_port {
        config.server.port = port;
    }
    config.validate()?;

    if config.freeswitch.uses_default_password() {
        warn!("Using the default event socket password; override it in production");
    }

    if !config.server.serve {
        return print_once(&config, args.format).await;
    }

    info!(
        "Starting FreeSWITCH Exporter v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!(
        "FreeSWITCH event socket: {}:{}",
        config.freeswitch.host, config.freeswitch.port
    );

    if let Err(e) = server::start(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Fetch once and print all three sections to stdout
async fn print_once(config: &Config, format: OutputFormat) -> Result<()> {
    let mut fetcher = match Fetcher::connect(&config.freeswitch).await {
        Ok(fetcher) => fetcher,
        Err(e) => {
            error!("Error connecting to FreeSWITCH: {}", e);
            std::process::exit(1);
        }
    };

    let result = fetcher.get_data().await;
    fetcher.close().await;
    if let Err(e) = result {
        // Still print whatever output there is (empty on failure)
        error!("{}", e);
    }

    let FormattedOutput {
        sessions,
        profiles,
        gateways,
    } = fetcher.format_output(format);
    print!("{}{}{}", sessions, profiles, gateways);

    Ok(())
}
