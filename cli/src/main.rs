//! Arbor CLI binary: chat with memory, deliberate with Tree-of-Thought.
//!
//! Subcommands: `chat` (interactive REPL, the default), `think` (one-shot
//! deliberation), `memory` (stats/export/clear). Configuration comes from
//! the environment (seeded by `config::load_and_apply`: env > `.env` > XDG
//! `config.toml`).

mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_stream::StreamExt;

use arbor::llm::ChatOpenAI;
use arbor::memory::{InMemoryVectorStore, MemoryStore, OpenAIEmbedder, SqliteVecStore};
use arbor::prompts;
use arbor::ChatAgent;

#[derive(Parser, Debug)]
#[command(name = "arbor")]
#[command(about = "Arbor: a chat agent with tiered memory and Tree-of-Thought deliberation")]
struct Args {
    #[command(subcommand)]
    cmd: Option<Command>,

    /// Chat model name
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    model: String,

    /// Embedding model for the memory store
    #[arg(long, env = "ARBOR_EMBEDDING_MODEL", default_value = "text-embedding-3-small")]
    embedding_model: String,

    /// SQLite path for persistent long-term memory; in-memory when unset
    #[arg(long, env = "ARBOR_DB", value_name = "PATH")]
    db: Option<PathBuf>,

    /// Prompts file (JSON); embedded defaults when the file is absent
    #[arg(long, value_name = "PATH")]
    prompts: Option<PathBuf>,

    /// Short-term memory window (turns)
    #[arg(long, default_value_t = 10)]
    window: usize,

    /// Long-term memories recalled per turn
    #[arg(long, default_value_t = 5)]
    recall: usize,

    /// Verbose: debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat REPL (default)
    Chat,
    /// One-shot Tree-of-Thought deliberation
    Think {
        /// The problem to deliberate on
        problem: Vec<String>,

        /// Extra context handed to the search
        #[arg(long, default_value = "")]
        context: String,

        /// Branch width (candidates per node and frontier cap)
        #[arg(long)]
        branches: Option<usize>,

        /// Depth limit (expansion layers)
        #[arg(long)]
        depth: Option<usize>,

        /// Print each progress event as it is emitted
        #[arg(long)]
        stream: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Long-term memory inspection
    Memory {
        #[command(subcommand)]
        cmd: MemoryCmd,
    },
}

#[derive(Subcommand, Debug)]
enum MemoryCmd {
    /// Show memory counters
    Stats,
    /// Export all records as JSON to a file
    Export {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Delete all long-term records
    Clear,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_store(args: &Args) -> Result<Arc<dyn MemoryStore>, Box<dyn std::error::Error>> {
    let embedder = Arc::new(OpenAIEmbedder::new(args.embedding_model.clone()));
    match &args.db {
        Some(path) => Ok(Arc::new(SqliteVecStore::new(path, embedder)?)),
        None => Ok(Arc::new(InMemoryVectorStore::new(embedder))),
    }
}

fn build_agent(args: &Args) -> Result<ChatAgent, Box<dyn std::error::Error>> {
    let llm = Arc::new(ChatOpenAI::new(args.model.clone()));
    let store = build_store(args)?;
    let prompts = prompts::load_or_default(args.prompts.as_deref())?;
    Ok(ChatAgent::new(
        llm,
        store,
        prompts,
        args.window,
        args.recall,
    ))
}

async fn run_think(
    agent: &ChatAgent,
    problem: String,
    context: String,
    branches: Option<usize>,
    depth: Option<usize>,
    stream: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if stream {
        let mut events = agent.deliberate_stream(&problem, &context, branches, depth);
        let mut result = None;
        while let Some(event) = events.next().await {
            if let arbor::SearchEvent::End {
                best_score,
                final_answer,
                success,
            } = &event
            {
                result = Some((*best_score, final_answer.clone(), *success));
            }
            eprintln!("{}", event);
        }
        if let Some((best_score, final_answer, success)) = result {
            if json {
                let value = serde_json::json!({
                    "best_score": best_score,
                    "final_answer": final_answer,
                    "success": success,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", final_answer);
            }
        }
        return Ok(());
    }

    let result = agent.deliberate(&problem, &context, branches, depth).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        if !result.success {
            eprintln!("(deliberation produced no valid thought)");
        }
        println!("{}", result.final_answer);
    }
    Ok(())
}

async fn run_memory(
    agent: &mut ChatAgent,
    cmd: MemoryCmd,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        MemoryCmd::Stats => {
            let stats = agent.memory_stats().await;
            println!("long-term records:  {}", stats.long_term);
            println!("short-term turns:   {}", stats.short_term);
        }
        MemoryCmd::Export { path } => {
            let records = agent.export_memories().await?;
            let json = serde_json::to_string_pretty(&records)?;
            std::fs::write(&path, format!("{}\n", json))?;
            println!("exported {} record(s) to {}", records.len(), path.display());
        }
        MemoryCmd::Clear => {
            agent.clear_all().await?;
            println!("long-term memory cleared");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = config::load_and_apply("arbor", None) {
        eprintln!("warning: config load failed: {}", e);
    }

    let mut args = Args::parse();
    init_tracing(args.verbose);
    let cmd = args.cmd.take();

    match cmd {
        None | Some(Command::Chat) => {
            let agent = build_agent(&args)?;
            repl::run_repl_loop(agent).await
        }
        Some(Command::Think {
            problem,
            context,
            branches,
            depth,
            stream,
            json,
        }) => {
            let problem = problem.join(" ");
            if problem.trim().is_empty() {
                return Err("think needs a problem statement".into());
            }
            let agent = build_agent(&args)?;
            run_think(&agent, problem, context, branches, depth, stream, json).await
        }
        Some(Command::Memory { cmd }) => {
            let mut agent = build_agent(&args)?;
            run_memory(&mut agent, cmd).await
        }
    }
}
