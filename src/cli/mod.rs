use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::{EntryService, FilePrompt};
use crate::config::AppConfig;
use crate::domain::Precision;

/// Finmon - Personal Finance Entry
#[derive(Parser)]
#[command(name = "finmon")]
#[command(about = "Append amount/description/date records to a plain-text ledger")]
#[command(version)]
pub struct Cli {
    /// Directory holding the settings record
    #[arg(long, env = "FINMON_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Directory for auto-named exports (defaults to the ledger's directory)
    #[arg(long, env = "FINMON_EXPORT_DIR")]
    pub export_dir: Option<PathBuf>,

    /// NTP server used to resolve the "a" date
    #[arg(long, default_value = crate::clock::DEFAULT_NTP_SERVER)]
    pub ntp_server: String,

    /// NTP query timeout in seconds
    #[arg(long, default_value = "2")]
    pub ntp_timeout: u64,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mount a ledger file, creating it if missing (prompts when PATH is omitted)
    Mount {
        /// Ledger file path
        path: Option<PathBuf>,
    },

    /// Forget the mounted ledger (the file is kept)
    Dismount,

    /// Show the mounted ledger and timezone
    Status,

    /// Append a record to the mounted ledger
    Add {
        /// Amount (e.g., "10.5")
        amount: String,

        /// Description
        description: String,

        /// Date text, or "a" for the current date
        date: String,

        /// Resolve "a" to a full timestamp instead of a date
        #[arg(long)]
        full: bool,
    },

    /// Print the mounted ledger
    Show,

    /// Copy the mounted ledger to another file
    Export {
        /// Output file (auto-named when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or set the timezone offset (e.g., "UTC+2")
    Timezone {
        /// New descriptor (omit to show the current one)
        descriptor: Option<String>,
    },

    /// Show what "a" currently resolves to
    Now {
        /// Include the time of day
        #[arg(long)]
        full: bool,
    },
}

impl Cli {
    pub fn config(&self) -> AppConfig {
        AppConfig {
            data_dir: self.data_dir.clone(),
            export_dir: self.export_dir.clone(),
            ntp_server: self.ntp_server.clone(),
            ntp_timeout: Duration::from_secs(self.ntp_timeout),
        }
    }

    pub async fn run(self) -> Result<()> {
        let service = EntryService::from_config(&self.config());

        match self.command {
            Commands::Mount { path } => {
                let mounted = match path {
                    Some(path) => Some(service.imports().mount(absolute(&path)?)?),
                    None => {
                        let mut prompt = LinePrompt::new(std::io::stdin().lock(), std::io::stderr());
                        service.imports().mount_with(&mut prompt)?
                    }
                };
                match mounted {
                    Some(file) => println!("Mounted: {}", file.path.display()),
                    None => println!("Nothing mounted."),
                }
            }

            Commands::Dismount => {
                service.imports().dismount()?;
                println!("Dismounted.");
            }

            Commands::Status => {
                match service.imports().current() {
                    Some(path) => println!("Ledger:   {}", path.display()),
                    None => println!("Ledger:   (none, run 'finmon mount')"),
                }
                println!("Timezone: {}", service.timezone());
            }

            Commands::Add {
                amount,
                description,
                date,
                full,
            } => {
                let service = if full {
                    service.with_precision(Precision::DateTime)
                } else {
                    service
                };
                let entry = service.submit(&amount, &description, &date).await?;
                println!("Recorded: {}", entry);
            }

            Commands::Show => {
                let content = service.read_ledger()?;
                if content.is_empty() {
                    println!("Ledger is empty.");
                } else {
                    print!("{}", content);
                    if !content.ends_with('\n') {
                        println!();
                    }
                }
            }

            Commands::Export { output } => {
                let destination = service.export(output.as_deref())?;
                println!("Exported to {}", destination.display());
            }

            Commands::Timezone { descriptor } => match descriptor {
                Some(descriptor) => {
                    let offset = service.set_timezone(&descriptor)?;
                    println!("Timezone set to {}", offset);
                }
                None => println!("{}", service.timezone()),
            },

            Commands::Now { full } => {
                let service = if full {
                    service.with_precision(Precision::DateTime)
                } else {
                    service
                };
                let (mut preview, mut results) = service.date_preview();
                preview.on_input(crate::domain::DATE_SENTINEL);
                let date = results
                    .recv()
                    .await
                    .context("date preview ended without a result")?;
                println!("{}", date);
            }
        }

        Ok(())
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .with_context(|| format!("Invalid ledger path: {}", path.display()))
}

/// Asks for a ledger path on a line-oriented terminal. An empty answer cancels.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> FilePrompt for LinePrompt<R, W> {
    fn choose(&mut self) -> Option<PathBuf> {
        write!(self.output, "Ledger file path: ").ok()?;
        self.output.flush().ok()?;

        let mut line = String::new();
        self.input.read_line(&mut line).ok()?;
        let answer = line.trim();
        if answer.is_empty() {
            return None;
        }
        std::path::absolute(answer).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Cursor;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from(["finmon", "add", "5", "tea", "a", "--full"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Add { ref date, full: true, .. } if date == "a"
        ));
        assert_eq!(cli.config().ntp_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_line_prompt() {
        let mut out = Vec::new();
        let mut prompt = LinePrompt::new(Cursor::new("/tmp/ledger.txt\n"), &mut out);
        assert_eq!(prompt.choose(), Some(PathBuf::from("/tmp/ledger.txt")));
        assert_eq!(String::from_utf8(out).unwrap(), "Ledger file path: ");
    }

    struct BrokenOutput;

    impl Write for BrokenOutput {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_line_prompt_unwritable_output_cancels() {
        let mut prompt = LinePrompt::new(Cursor::new("/tmp/ledger.txt\n"), BrokenOutput);
        assert_eq!(prompt.choose(), None);
    }

    #[test]
    fn test_line_prompt_empty_cancels() {
        let mut prompt = LinePrompt::new(Cursor::new("  \n"), Vec::new());
        assert_eq!(prompt.choose(), None);

        let mut prompt = LinePrompt::new(Cursor::new(""), Vec::new());
        assert_eq!(prompt.choose(), None);
    }
}
