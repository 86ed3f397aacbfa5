use anyhow::Context;
use escala_vigilantes_lib::config::RosterConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RosterConfig::from_env_or_yaml().context("load roster config")?;
    escala_vigilantes_lib::run(config).await
}
