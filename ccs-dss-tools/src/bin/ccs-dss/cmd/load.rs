use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;

use crate::util::common_options::ConnectionOptions;

#[derive(clap::Parser)]
pub struct Cmd {
    #[clap(flatten)]
    connection: ConnectionOptions,

    /// The binary to load onto the target
    #[arg(long, env = "DSS_BINARY")]
    binary: PathBuf,

    /// Script timeout for the load, in seconds
    #[arg(long, env = "DSS_TIMEOUT", default_value = "150")]
    timeout: u64,
}

impl Cmd {
    pub fn run(self) -> anyhow::Result<()> {
        let mut session = self.connection.open()?;

        session.load(&self.binary, Duration::from_secs(self.timeout))?;
        session.run()?;
        session.close()?;

        println!("{} {}", "Loaded".green().bold(), self.binary.display());
        Ok(())
    }
}
