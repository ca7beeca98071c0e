use std::{
    io::{self, Write},
    rc::Rc,
};

use anyhow::{Context, Result};
use tokio::{
    io::{AsyncBufReadExt, BufReader, Stdin},
    net::TcpStream,
    runtime::Handle,
    select,
};
use tracing::{info, warn};

use crate::{
    cli::Cli,
    codec::{Message, Sender},
    error::SessionError,
    observer::Observer,
    session::Session,
    transport::Transport,
};

pub async fn run(args: Cli) -> Result<()> {
    let stream = establish_connection(&args).await?;

    let terminal = Rc::new(Terminal);
    let observer = Rc::downgrade(&terminal);
    let mut session = Session::new(observer);
    session
        .open(stream, &Handle::current())
        .context("failed to open chat session")?;
    session
        .join(&args.username)
        .await
        .context("failed to join chat")?;
    write_stdout(&format!(
        "*** connected to {}:{} as {}",
        args.host, args.port, args.username
    ));

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut input = String::new();

    run_client_loop(&mut session, &mut stdin, &mut input).await?;
    session.close();

    Ok(())
}

async fn establish_connection(args: &Cli) -> Result<std::net::TcpStream> {
    let stream = TcpStream::connect((args.host.as_str(), args.port))
        .await
        .with_context(|| format!("failed to connect to {}:{}", args.host, args.port))?;

    info!("connected to {}:{}", args.host, args.port);

    // The session registers the socket with the event loop itself.
    stream
        .into_std()
        .context("failed to detach socket from the runtime")
}

async fn run_client_loop<T: Transport>(
    session: &mut Session<T>,
    stdin: &mut BufReader<Stdin>,
    input: &mut String,
) -> Result<()> {
    loop {
        select! {
            event = session.next_event() => {
                session.handle_event(event);
                if !session.is_open() {
                    write_stdout("*** connection closed");
                    break;
                }
            }
            bytes_read = stdin.read_line(input) => {
                let keep_going = handle_stdin_input(bytes_read, input, session).await?;
                input.clear();
                if !keep_going {
                    break;
                }
            }
            ctrl_c = tokio::signal::ctrl_c() => {
                handle_ctrl_c(ctrl_c);
                break;
            }
        }
    }
    Ok(())
}

async fn handle_stdin_input<T: Transport>(
    bytes_read: io::Result<usize>,
    input: &str,
    session: &mut Session<T>,
) -> Result<bool> {
    let bytes_read = bytes_read?;
    if bytes_read == 0 {
        return Ok(false);
    }

    let text = input.trim_end();
    if text.is_empty() {
        return Ok(true);
    }

    if text.eq_ignore_ascii_case("/quit") {
        write_stdout("*** leaving chat");
        return Ok(false);
    }

    match session.send(text).await {
        Ok(_) => Ok(true),
        Err(SessionError::Encoding(error)) => {
            write_stderr(&format!("!!! {error}"));
            Ok(true)
        }
        Err(error) => Err(error).context("failed to send message"),
    }
}

fn handle_ctrl_c(result: io::Result<()>) {
    if let Err(error) = result {
        warn!(?error, "ctrl-c handler failed");
    }
}

struct Terminal;

impl Observer for Terminal {
    fn message_received(&self, message: Message) {
        write_stdout(&render_message(&message));
    }

    fn stream_fault(&self, error: &io::Error) {
        write_stderr(&format!("!!! stream error: {error}"));
    }
}

fn render_message(message: &Message) -> String {
    match message.sender {
        Sender::Ourself => format!("<{}> (you) {}", message.username, message.text),
        Sender::SomeoneElse => format!("<{}> {}", message.username, message.text),
    }
}

fn write_stdout(line: &str) {
    let mut stdout = io::stdout().lock();
    if let Err(error) = writeln!(stdout, "{line}").and_then(|()| stdout.flush()) {
        warn!(?error, "failed to write to stdout");
    }
}

fn write_stderr(line: &str) {
    let mut stderr = io::stderr().lock();
    if let Err(error) = writeln!(stderr, "{line}") {
        warn!(?error, "failed to write to stderr");
    }
}
