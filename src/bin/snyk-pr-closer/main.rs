use anyhow::Context;
use snyk_pr_closer::{GitHub, RunOutcome, load_targets, parse_args, run};
use tokio::io::BufReader;

fn handle_clap_help_version(clap_err: &clap::Error) -> ! {
    use clap::error::ErrorKind;
    match clap_err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{clap_err}");
            std::process::exit(0);
        }
        _ => {
            eprint!("{clap_err}");
            std::process::exit(2);
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = match parse_args(std::env::args()) {
        Ok(cli) => cli,
        Err(err) => {
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                handle_clap_help_version(clap_err);
            } else {
                return Err(err);
            }
        }
    };

    // A missing .env is fine; the token may come from the real environment.
    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        return Err(err).context("Failed to load .env");
    }

    let targets = load_targets(&cli.config)?;
    let forge = GitHub::from_env()?;

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    match run(&forge, &targets, &cli.run_options(), &mut stdin, &mut stdout).await? {
        RunOutcome::Completed { summary, .. } if summary.failed() > 0 => {
            tracing::warn!("{} pull request(s) could not be closed", summary.failed());
        }
        _ => {}
    }

    Ok(())
}
