use clap::Parser;
use swanpipe::{Config, cli::Cli, run_with};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if config.general.worker_threads > 0 {
        builder.worker_threads(config.general.worker_threads);
    }

    builder.build()?.block_on(run_with(cli, config))
}
