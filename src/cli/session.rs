//! Interactive session loop
//!
//! One line in, one reply out, strictly sequential. Three exits: the literal
//! `exit` (case-insensitive), end of input, and an interrupt signal. The
//! interrupt gets its own farewell so the user can tell the difference, and
//! `exit` never touches the dispatcher.

use std::io::Write as _;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use nines::dispatcher::IntentDispatcher;

/// What to do with one line of input.
#[derive(Debug, PartialEq)]
enum SessionEvent {
    Reply(String),
    Skip,
    Exit,
}

async fn handle_line(dispatcher: &mut IntentDispatcher, line: &str) -> SessionEvent {
    let input = line.trim();
    if input.is_empty() {
        return SessionEvent::Skip;
    }
    if input.eq_ignore_ascii_case("exit") {
        return SessionEvent::Exit;
    }
    SessionEvent::Reply(dispatcher.handle(input).await)
}

/// Run the interactive loop until exit, end of input, or interrupt.
pub(crate) async fn run_loop(dispatcher: &mut IntentDispatcher) -> Result<()> {
    println!("9S online [v{}]", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' to end the session.");
    println!();

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("User: ");
        std::io::stdout().flush()?;

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("Shutting down...");
                break;
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => match handle_line(dispatcher, &line).await {
                        SessionEvent::Skip => continue,
                        SessionEvent::Exit => {
                            println!("Goodbye!");
                            break;
                        }
                        SessionEvent::Reply(reply) => {
                            println!();
                            println!("9S: {}", reply);
                            println!();
                        }
                    },
                    Ok(None) => {
                        println!();
                        println!("Goodbye!");
                        break;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nines::actions::ActionRunner;
    use nines::chat::ChatCompletionClient;
    use nines::error::Result as NinesResult;
    use nines::intent::Intent;
    use nines::memory::InteractionMemory;
    use nines::personality::{PersonalityFormatter, PersonalityProfile, RandomChooser};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    struct CountingChat {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ChatCompletionClient for CountingChat {
        async fn complete(&self, _prompt: &str) -> NinesResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(r#"{"intent":"check_email"}"#.to_string())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    struct NoopRunner;

    #[async_trait]
    impl ActionRunner for NoopRunner {
        async fn run(&self, _intent: &Intent) -> String {
            "Command executed".to_string()
        }
    }

    fn dispatcher_in(dir: &std::path::Path, calls: Arc<AtomicUsize>) -> IntentDispatcher {
        let memory = InteractionMemory::new(dir.join("memory.sqlite"));
        memory.init().unwrap();

        let mut categories = HashMap::new();
        categories.insert("acknowledge".to_string(), vec!["Ack.".to_string()]);
        categories.insert("error".to_string(), vec!["Err: {error}".to_string()]);
        let formatter = PersonalityFormatter::new(
            PersonalityProfile::from_categories(categories).unwrap(),
            Box::new(RandomChooser::seeded(0)),
        );

        IntentDispatcher::new(
            Arc::new(CountingChat { calls }),
            Box::new(NoopRunner),
            memory,
            formatter,
        )
    }

    #[tokio::test]
    async fn test_exit_short_circuits_dispatch() {
        let dir = tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = dispatcher_in(dir.path(), calls.clone());

        assert_eq!(handle_line(&mut dispatcher, "exit").await, SessionEvent::Exit);
        assert_eq!(handle_line(&mut dispatcher, "EXIT").await, SessionEvent::Exit);
        assert_eq!(
            handle_line(&mut dispatcher, "  Exit  ").await,
            SessionEvent::Exit
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let memory = InteractionMemory::new(dir.path().join("memory.sqlite"));
        assert_eq!(memory.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_blank_lines_are_skipped() {
        let dir = tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = dispatcher_in(dir.path(), calls.clone());

        assert_eq!(handle_line(&mut dispatcher, "").await, SessionEvent::Skip);
        assert_eq!(handle_line(&mut dispatcher, "   ").await, SessionEvent::Skip);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_regular_input_is_dispatched() {
        let dir = tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = dispatcher_in(dir.path(), calls.clone());

        let event = handle_line(&mut dispatcher, "check my email").await;
        match event {
            SessionEvent::Reply(reply) => assert_eq!(reply, "Ack.\nCommand executed"),
            other => panic!("expected reply, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exit_embedded_in_sentence_is_dispatched() {
        let dir = tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = dispatcher_in(dir.path(), calls.clone());

        let event = handle_line(&mut dispatcher, "how do I exit vim").await;
        assert!(matches!(event, SessionEvent::Reply(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
