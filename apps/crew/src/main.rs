use engineering_crew::agents::roster;
use engineering_crew::config::{self, Settings};
use engineering_crew::tools::default_toolset;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing; stdout is reserved for the crew's output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load environment variables
    match config::load_dotenv() {
        Some(path) => tracing::debug!("Loaded {}", path.display()),
        None => tracing::debug!("No .env file loaded"),
    }

    let settings = Settings::from_env();
    println!("{}", settings.announce());
    tracing::debug!(?settings, "Settings loaded");

    let llm = match settings.build_provider() {
        Ok(llm) => llm,
        Err(e) => {
            tracing::error!("Failed to create LLM client: {}", e);
            std::process::exit(1);
        }
    };

    let tools = match default_toolset(&settings) {
        Ok(tools) => tools,
        Err(e) => {
            tracing::error!("Failed to create tools: {}", e);
            std::process::exit(1);
        }
    };
    if !settings.search_enabled() {
        tracing::info!("SERPER_API_KEY not set, web search disabled");
    }

    let crew = match roster::engineering_crew(&settings, llm, tools) {
        Ok(crew) => crew,
        Err(e) => {
            tracing::error!("Invalid crew configuration: {}", e);
            std::process::exit(1);
        }
    };

    println!("Starting Job Monitor Engineering Crew...");
    match crew.kickoff().await {
        Ok(result) => {
            println!("######################");
            println!("{}", result);
        }
        Err(e) => {
            tracing::error!("Crew run failed: {}", e);
            std::process::exit(1);
        }
    }
}
