//! Interactive REPL loop: read stdin, run one chat turn, print the reply,
//! repeat until EOF or quit.
//!
//! Replies stream token-by-token: a forwarding task prints chunks as the
//! LLM produces them, and the loop waits for both the turn and the printer
//! before prompting again. Meta-commands (`/stats`, `/clear`) hit the agent
//! without spending an LLM call.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use arbor::ChatAgent;

fn is_quit_command(line: &str) -> bool {
    matches!(line.trim(), "quit" | "exit" | "/quit" | "/exit")
}

/// Prints streamed chunks as they arrive; returns how many were printed
/// once the sender is dropped.
async fn print_chunks(mut rx: mpsc::Receiver<arbor::MessageChunk>) -> usize {
    let mut printed = 0;
    while let Some(chunk) = rx.recv().await {
        print!("{}", chunk.content);
        let _ = std::io::stdout().flush();
        printed += 1;
    }
    printed
}

/// Runs the REPL: prompt, read line, run a turn, print, repeat.
///
/// Exits on EOF (Ctrl+D) or `quit`/`exit`. Meta-commands: `/stats` prints
/// memory counters, `/clear` drops the short-term buffer.
pub async fn run_repl_loop(mut agent: ChatAgent) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = match reader.next_line().await? {
            None => break,
            Some(s) if s.trim().is_empty() => continue,
            Some(s) if is_quit_command(&s) => break,
            Some(s) => s,
        };

        match line.trim() {
            "/stats" => {
                let stats = agent.memory_stats().await;
                println!(
                    "long-term records: {}, short-term turns: {}",
                    stats.long_term, stats.short_term
                );
                continue;
            }
            "/clear" => {
                agent.clear_short_term();
                println!("short-term memory cleared");
                continue;
            }
            _ => {}
        }

        let (tx, rx) = mpsc::channel(128);
        let printer = tokio::spawn(print_chunks(rx));
        let reply = agent.chat_stream(&line, tx).await;
        // The sender is dropped inside chat_stream; wait until every chunk
        // is printed before the next prompt.
        let printed = printer.await.unwrap_or(0);
        if printed == 0 {
            // Nothing streamed (e.g. degraded reply); print the full text.
            println!("{}", if reply.is_empty() { "(no reply)" } else { &reply });
        } else {
            println!();
        }
    }

    println!("Bye.");
    Ok(())
}
