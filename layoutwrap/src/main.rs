use env_logger::Env;
use log::info;

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    info!("Wrapping pages in layouts...");
    layoutwrap::run()?;
    Ok(())
}
