use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = smc_deploy::arguments::Arguments::parse();
    let obs_config =
        observe::Config::new(&args.log_filter, tracing::Level::ERROR, args.use_json_logs);
    observe::tracing::initialize(&obs_config);
    tracing::info!("running smc-deploy with validated arguments:\n{}", args);
    smc_deploy::run(args).await
}
