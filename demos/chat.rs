use std::sync::Arc;

use discovery_chat::{ChatSession, DiscoveryClient, Settings};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const NEW_QUESTION: &str = "/new";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // PROJECT_ID and DATA_STORE_ID are required; see `Settings` for the rest.
    let settings = Settings::from_env()?;
    let client = Arc::new(DiscoveryClient::from_settings(&settings).await?);
    let session = ChatSession::start(client, settings.render).await?;

    println!(
        "Welcome to the Chatbot. Please ask your question below ({NEW_QUESTION} starts over)."
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query == NEW_QUESTION {
            session.restart().await?;
            println!("Sure, what's your next question?");
            continue;
        }

        match session.ask(query).await {
            Ok(answer) => println!("{answer}\n"),
            Err(e) => eprintln!("error: {e}"),
        }
    }

    Ok(())
}
