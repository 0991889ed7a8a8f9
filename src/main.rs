use std::io::BufRead;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use weiborag::config::AppConfig;
use weiborag::embeddings::EmbeddingService;
use weiborag::ingest;
use weiborag::rag::RagService;
use weiborag::Result;

#[derive(Parser)]
#[command(name = "weiborag")]
#[command(about = "WeiboRAG CLI for building the post index and answering questions")]
#[command(version)]
struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the vector index from a processed-posts CSV
    Build {
        /// Path to the processed posts CSV
        csv: PathBuf,
        /// Output index path (defaults to the configured index path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Ask a single question
    Ask {
        /// The question, Chinese or English
        question: String,
        /// Context budget: maximum posts passed to the LLM
        #[arg(short, long)]
        k: Option<usize>,
    },
    /// Interactive question loop
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    weiborag::logging::init_logging_with_config(Some(&config))?;

    match cli.command {
        Commands::Build { csv, output } => {
            let embedding_service = EmbeddingService::new(&config)?;
            let posts = ingest::posts_from_csv(&csv, config.ingest.default_year)?;
            let index = ingest::build_index(posts, &embedding_service).await?;

            let path = output.unwrap_or_else(|| PathBuf::from(config.index_path()));
            index.save(&path)?;
            println!("✅ Built index with {} posts: {}", index.len(), path.display());
        }
        Commands::Ask { question, k } => {
            let service = RagService::new(&config)?;
            let response = match k {
                Some(k) => service.query_with_budget(&question, k).await?,
                None => service.query(&question).await?,
            };
            println!("{}", response.format());
        }
        Commands::Chat => {
            let service = RagService::new(&config)?;
            println!("Weibo QA assistant ready. Ask a question (Chinese or English).");
            println!("Example: 罗云熙最近在微博上有提到他的工作计划吗？");
            println!("Example: What did he say about his latest drama?");
            println!("{}", "-".repeat(60));

            let stdin = std::io::stdin();
            loop {
                print!("\nYour question (or 'exit'): ");
                std::io::stdout().flush()?;

                let mut line = String::new();
                if stdin.lock().read_line(&mut line)? == 0 {
                    break;
                }
                let question = line.trim();
                if question.is_empty() {
                    continue;
                }
                if matches!(question.to_lowercase().as_str(), "exit" | "quit") {
                    println!("Bye!");
                    break;
                }

                match service.query(question).await {
                    Ok(response) => {
                        println!("\n--- Answer ---");
                        println!("{}", response.answer);
                    }
                    Err(e) => eprintln!("Error: {e}"),
                }
            }
        }
    }

    Ok(())
}
