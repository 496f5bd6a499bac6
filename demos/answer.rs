use discovery_chat::{AnswerBackend, Settings, render};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let query = std::env::args()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ");
    let query = if query.is_empty() {
        "how to open a juice bar".to_string()
    } else {
        query
    };

    let settings = Settings::from_env()?;
    let backend = AnswerBackend::new(&settings).await?;

    let payload = backend.answer_once(&query).await?;
    println!("{}", render(&payload, &settings.render));

    if !payload.related_questions.is_empty() {
        println!("\nRelated questions:");
        for question in &payload.related_questions {
            println!("- {question}");
        }
    }

    Ok(())
}
