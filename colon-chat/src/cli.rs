use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Username announced to the chat with the join frame.
    #[arg(long)]
    pub username: String,

    /// Host of the chat server.
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Port of the chat server.
    #[arg(long, default_value_t = 80)]
    pub port: u16,
}
