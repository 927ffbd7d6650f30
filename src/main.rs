use drop_cidr_summary::config::Config;
use drop_cidr_summary::models::get_current_timestamp;
use drop_cidr_summary::output::print_summary;
use drop_cidr_summary::run;
use std::error::Error;
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    log4rs::init_file("log4rs.yml", Default::default())
        .map_err(|e| format!("Error initializing log4rs: {e}"))?;
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    let start_time = Instant::now();
    log::info!("Start Time: {}", get_current_timestamp(config.timezone));

    let report = run(&config).await?;
    print_summary(&report);

    log::info!("End Time: {}", get_current_timestamp(config.timezone));
    log::info!("Execution time: {:.1} seconds", start_time.elapsed().as_secs_f64());

    Ok(())
}
