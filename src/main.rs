use anyhow::{bail, Context, Result};
use clap::Parser;
use edi_split::{
    ChannelObserver, FailurePolicy, JobEvent, JobOutcome, SplitJob, SplitterConfig,
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    name = "edi-split",
    about = "Split X12 837/835 batch files into one interchange per transaction set",
    version
)]
struct Cli {
    /// Directory scanned recursively for X12 files (or EDI_SPLIT_SOURCE)
    source: Option<PathBuf>,

    /// Directory the split files are written to (or EDI_SPLIT_DESTINATION)
    destination: Option<PathBuf>,

    #[clap(long)]
    /// Stop the whole job at the first malformed file
    abort_on_malformed: bool,

    #[clap(long)]
    /// First control number to assign
    control_seed: Option<u64>,

    #[clap(long)]
    /// Put a newline after every segment terminator
    line_breaks: bool,

    #[clap(long)]
    /// Also bundle output into archives/{client}.zip
    archive_by_client: bool,

    #[clap(long)]
    /// Write split-report.json into the destination
    report: bool,
}

impl Cli {
    fn into_config(self) -> Result<SplitterConfig> {
        let mut config = match (self.source, self.destination) {
            (Some(source), Some(destination)) => SplitterConfig::new(source, destination)
                .with_env_options()
                .context("Invalid environment options")?,
            (None, None) => SplitterConfig::from_env().context("Incomplete configuration")?,
            _ => bail!("Pass both SOURCE and DESTINATION, or neither to use the environment"),
        };

        if self.abort_on_malformed {
            config.failure_policy = FailurePolicy::Abort;
        }
        if let Some(seed) = self.control_seed {
            config.control_seed = seed;
        }
        config.line_breaks |= self.line_breaks;
        config.archive_by_client |= self.archive_by_client;
        config.write_report |= self.report;

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let started = Instant::now();

    let config = Cli::parse().into_config()?;
    println!(
        "Splitting {} -> {}",
        config.source.display(),
        config.destination.display()
    );

    let (observer, events, _) = ChannelObserver::new();
    let handle = SplitJob::new(config).start(observer)?;

    for event in events.iter() {
        match event {
            JobEvent::Started => {}
            JobEvent::Progress(progress) => {
                eprint!("\r  {}/{} transaction sets", progress.current, progress.maximum);
            }
            JobEvent::Failed(_) | JobEvent::Finished(_) => eprintln!(),
        }
    }

    match handle.join() {
        JobOutcome::Finished(summary) => {
            println!(
                "✓ Wrote {} files from {} sources [{:.2}s]",
                summary.units_written(),
                summary.files_processed,
                started.elapsed().as_secs_f64()
            );
            for skipped in &summary.skipped {
                println!("  skipped {}: {}", skipped.source, skipped.reason);
            }
            for archive in &summary.archives {
                println!("  archive {}", archive.display());
            }
            Ok(())
        }
        JobOutcome::Cancelled(summary) => {
            println!(
                "Cancelled after {} transaction sets from {} files",
                summary.units_written(),
                summary.files_processed
            );
            Ok(())
        }
        JobOutcome::Failed { message, .. } => bail!(message),
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;
    use edi_split::FailurePolicy;

    #[test]
    fn flags_override_defaults() {
        let config = Cli::try_parse_from([
            "edi-split",
            "in",
            "out",
            "--abort-on-malformed",
            "--control-seed",
            "700",
            "--archive-by-client",
        ])
        .unwrap()
        .into_config()
        .unwrap();

        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.control_seed, 700);
        assert!(config.archive_by_client);
        assert!(!config.write_report);
    }

    #[test]
    fn source_without_destination_is_rejected() {
        let cli = Cli::try_parse_from(["edi-split", "in"]).unwrap();
        assert!(cli.into_config().is_err());
    }

    #[test]
    fn zero_seed_is_rejected() {
        let cli = Cli::try_parse_from(["edi-split", "in", "out", "--control-seed", "0"]).unwrap();
        assert!(cli.into_config().is_err());
    }
}
