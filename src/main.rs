// src/main.rs

use respawn::{cli, logging, run};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    match run_main().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("respawn error: {err:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<i32> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;

    let code = match run(args).await? {
        Some(summary) if summary.final_state.is_unexpected() => {
            eprintln!("quit in {} state", summary.final_state);
            1
        }
        Some(summary) => {
            println!("quit in {} state", summary.final_state);
            0
        }
        None => 0,
    };
    Ok(code)
}
