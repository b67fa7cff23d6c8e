use std::env;
use std::process::ExitCode;

use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    interest::init_tracing();

    let mut args: Vec<String> = env::args().collect();
    if args.get(1).is_some_and(|command| command == "serve") {
        let port = match args.get(2).map(|raw| raw.parse::<u16>()) {
            None => 8080,
            Some(Ok(port)) => port,
            Some(Err(e)) => {
                error!(port = %args[2], "invalid port: {e}");
                return ExitCode::FAILURE;
            }
        };
        return match interest::api::run_http_server(port).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("server error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    if args.get(1).is_some_and(|command| command == "solve") {
        args.remove(1);
    }
    match interest::api::run_cli(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
