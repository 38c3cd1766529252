use anyhow::Result;
use askr::client::{AskClient, AskEvent};
use askr::config::Config;
use askr::controller::{error_text, ConversationController};
use askr::ui::App;
use clap::{Parser, Subcommand};
use std::io::Write;

#[derive(Parser)]
#[command(name = "askr")]
#[command(version)]
#[command(about = "Chat with a streaming question-answering backend", long_about = None)]
struct Cli {
    /// Base URL of the answering backend (overrides ASKR_API_URL and the
    /// config file)
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask one question and print the streamed answer to stdout
    Ask {
        question: String,
        /// Print the resulting transcript as JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Print the backend documentation and schema URLs
    Docs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.api_base)?;

    match cli.command {
        None => App::new(&config).run().await,
        Some(Commands::Ask { question, json }) => one_shot(&config, &question, json).await,
        Some(Commands::Docs) => {
            println!("{}", config.docs_url());
            println!("{}", config.openapi_url());
            Ok(())
        }
    }
}

/// Non-interactive mode: stream one answer to stdout and exit.
async fn one_shot(config: &Config, question: &str, json: bool) -> Result<()> {
    let mut controller = ConversationController::new();
    if !controller.submit(question) {
        anyhow::bail!("Question must not be empty");
    }

    let client = AskClient::new(&config.api_base);
    let mut rx = client.ask(question.trim());

    let mut failure = None;
    let mut first = true;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    while let Some(event) = rx.recv().await {
        match event {
            AskEvent::Fragment(fragment) => {
                if !json {
                    if !first {
                        let _ = write!(out, " ");
                    }
                    let _ = write!(out, "{}", fragment);
                    let _ = out.flush();
                    first = false;
                }
                controller.push_fragment(&fragment);
            }
            AskEvent::End => {
                controller.complete();
                break;
            }
            AskEvent::Failed(f) => {
                controller.fail(f);
                failure = Some(f);
                break;
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(controller.transcript())?);
    } else if !first {
        let _ = writeln!(out);
    }

    if let Some(f) = failure {
        anyhow::bail!("{}", error_text(f));
    }
    Ok(())
}
