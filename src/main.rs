use std::io::Write;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, BufReader};

use kittu_chat::chat::{ChatMessage, ChatSession, HttpTransport, Role};
use kittu_chat::config::ChatConfig;
use kittu_chat::error::{ChatError, ErrorCode};
use kittu_chat::stream::StreamEnd;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let config = match ChatConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(code = e.error_code(), error = %e, "config load failed");
            std::process::exit(1);
        }
    };
    let transport = match HttpTransport::new(&config) {
        Ok(transport) => transport,
        Err(e) => {
            tracing::error!(code = e.error_code(), error = %e, "transport init failed");
            std::process::exit(1);
        }
    };

    let mut session = ChatSession::new(Arc::new(transport), config.language);
    if let Some(name) = &config.user_name {
        session = session.with_user_name(name.clone());
    }
    session.subscribe(echo_observer());

    tracing::info!(endpoint = %config.endpoint_url, language = config.language.as_str(), "kittu-chat ready");
    session.send_greeting();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == "/quit" {
            break;
        }

        let turn = session.send_message(text);
        tokio::pin!(turn);
        let result = tokio::select! {
            result = &mut turn => result,
            _ = tokio::signal::ctrl_c() => {
                session.abort();
                turn.await
            }
        };
        report(result.map(|outcome| outcome.end));
    }
}

fn prompt() {
    let mut out = std::io::stdout();
    let _ = write!(out, "\nyou> ");
    let _ = out.flush();
}

fn report(result: Result<StreamEnd, ChatError>) {
    match result {
        Ok(StreamEnd::Cancelled) => println!("\n[stopped]"),
        Ok(_) => println!(),
        Err(e) if e.is_user_facing() => println!("\n[error] {e}"),
        Err(e) => {
            tracing::warn!(code = e.error_code(), retryable = e.retryable(), error = %e, "turn ended early");
            println!();
        }
    }
}

/// Prints only the text each list update added to the latest assistant message.
fn echo_observer() -> impl Fn(&[ChatMessage]) + Send + Sync + 'static {
    // (index of the message being echoed, bytes of it already printed)
    let printed: Mutex<Option<(usize, usize)>> = Mutex::new(None);
    move |messages| {
        let Some((index, last)) = messages.iter().enumerate().next_back() else {
            return;
        };
        if last.role != Role::Assistant {
            return;
        }
        let mut printed = printed.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut out = std::io::stdout();
        let from = match *printed {
            Some((i, n)) if i == index && last.content.is_char_boundary(n) => n,
            _ => {
                let _ = write!(out, "kittu> ");
                0
            }
        };
        let _ = write!(out, "{}", &last.content[from..]);
        let _ = out.flush();
        *printed = Some((index, last.content.len()));
    }
}
