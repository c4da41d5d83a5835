use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Send requests to a running model relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check relay liveness
    Health,
    /// Relay a payload to a custom model
    Send {
        /// Model configuration id
        #[arg(short, long)]
        model: String,

        /// JSON payload file; an empty object when omitted
        #[arg(short, long)]
        payload: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Send { model, payload } => {
            let mut body: Value = match payload {
                Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
                None => Value::Object(Default::default()),
            };
            let object = body
                .as_object_mut()
                .ok_or("payload must be a JSON object")?;
            object.insert(
                model_relay::relay::MODEL_ID_FIELD.to_string(),
                Value::String(model),
            );

            let res = client
                .post(format!("{}{}", base, model_relay::http::RELAY_PATH))
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: relay returned status {}", status);
    }

    // Relayed bodies are not always JSON.
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
