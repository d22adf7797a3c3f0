use std::error::Error;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error};

use jansetu::app::Portal;
use jansetu::config::{load_config, print_schema};
use jansetu::guard::RouteOutcome;
use jansetu::models::mask_identity;
use jansetu::navigation::RecordingNavigator;
use jansetu::utils::logger::init_logging;

const CONFIG_PATH_VAR: &str = "JANSETU_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

const USAGE: &str = "usage: jansetu <command>

commands:
  schema                     print the configuration JSON schema
  login <aadhaar>            citizen login; the one-time code is read from stdin
  admin-login <username>     administrator login; the password is read from stdin
  provider-login <aadhaar>   service provider login
  whoami                     show the current session
  route <path>               show what navigating to <path> renders
  profile                    fetch the citizen profile
  logout                     end the session on this machine";

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.first().map(String::as_str) == Some("schema") {
        if let Err(e) = print_schema() {
            eprintln!("Error printing schema: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let config_path =
        std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration from {}: {}", config_path, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Error initialising logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(config, &args).await {
        error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: jansetu::config::ConfigV1, args: &[String]) -> Result<(), Box<dyn Error>> {
    let navigator = Arc::new(RecordingNavigator::new());
    let portal = Portal::bootstrap(config, navigator.clone()).await?;

    let command = args.first().map(String::as_str);
    let argument = args.get(1).map(String::as_str);

    match (command, argument) {
        (Some("login"), Some(aadhaar)) => {
            let flow = portal.login_flow();
            let challenge = flow.submit_identity(aadhaar).await?;
            println!("{}", challenge.message);
            println!(
                "Enter the code sent for {} (valid {}s):",
                mask_identity(aadhaar),
                challenge.expires_in
            );
            let code = read_line().await?;
            let user = flow.submit_code(&code).await?;
            println!("Logged in as {} ({})", mask_identity(&user.aadhar), user.role_name());
        }
        (Some("admin-login"), Some(username)) => {
            println!("Password:");
            let password = read_line().await?;
            let user = portal.gateway.admin_login(username, &password).await?;
            println!("Logged in as administrator {}", user.id);
        }
        (Some("provider-login"), Some(aadhaar)) => {
            let user = portal.gateway.provider_login(aadhaar).await?;
            println!("Logged in as service provider {}", user.id);
        }
        (Some("whoami"), None) => match portal.session.user() {
            Some(user) if portal.session.is_authenticated() => println!(
                "{} ({}), user id {}",
                mask_identity(&user.aadhar),
                user.role_name(),
                user.id
            ),
            _ => println!("Not logged in"),
        },
        (Some("route"), Some(path)) => match portal.resolve(path) {
            RouteOutcome::Render(view) => println!("render {:?}", view),
            RouteOutcome::Redirect(to) => println!("redirect {}", to),
            RouteOutcome::NotFound => println!("not found"),
        },
        (Some("profile"), None) => {
            let profile = portal.resources.citizen_profile().await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        (Some("logout"), None) => {
            portal.logout().await?;
            println!("Logged out");
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    if let Some(route) = navigator.last() {
        debug!(route = %route, "final location");
        println!("-> {}", route);
    }
    Ok(())
}

async fn read_line() -> Result<String, std::io::Error> {
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
