use colored::Colorize;

use crate::util::common_options::ConnectionOptions;

#[derive(clap::Parser)]
pub struct Cmd {
    #[clap(flatten)]
    connection: ConnectionOptions,
}

impl Cmd {
    pub fn run(self) -> anyhow::Result<()> {
        let mut session = self.connection.open()?;

        session.restart()?;
        session.close()?;

        println!("{}", "Restarted target".green().bold());
        Ok(())
    }
}
