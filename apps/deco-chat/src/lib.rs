pub mod client;

use clap::Parser;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::client::ChatClient;

pub const EXAMPLE_QUERIES: [&str; 3] = [
	"I need a comfortable sofa for my living room",
	"Show me some affordable dining tables",
	"I'm looking for a desk that's at least 120cm wide",
];

#[derive(Debug, Parser)]
#[command(
	version = deco_cli::VERSION,
	rename_all = "kebab",
	styles = deco_cli::styles(),
)]
pub struct Args {
	/// Base URL of the DecoChat API.
	#[arg(
		long,
		short = 'u',
		value_name = "URL",
		default_value = "http://127.0.0.1:8000",
		env = "DECOCHAT_URL"
	)]
	pub url: String,
	/// Conversation session id. A fresh one is generated when omitted.
	#[arg(long, short = 's', value_name = "ID")]
	pub session: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
	Quit,
	Reset,
	Help,
	Empty,
	Message(&'a str),
}
impl<'a> Command<'a> {
	pub fn parse(line: &'a str) -> Self {
		let line = line.trim();

		match line.to_lowercase().as_str() {
			"quit" | "exit" => Self::Quit,
			"reset" => Self::Reset,
			"help" => Self::Help,
			"" => Self::Empty,
			_ => Self::Message(line),
		}
	}
}

pub fn help_text() -> String {
	let mut text = String::from(concat!(
		"Available commands:\n",
		"  quit, exit  End the conversation\n",
		"  reset       Start a new conversation\n",
		"  help        Show these instructions\n",
		"\nExample queries:\n",
	));

	for query in EXAMPLE_QUERIES {
		text.push_str(&format!("  {query}\n"));
	}

	text
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let session_id = args.session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
	let client = ChatClient::new(&args.url, &session_id);
	let mut lines = BufReader::new(io::stdin()).lines();
	let mut stdout = io::stdout();

	println!("Welcome to DecoChat, your furniture assistant.");
	println!("Session {}. Type 'help' for commands, 'quit' to leave.", client.session_id());

	loop {
		stdout.write_all(b"\nYou: ").await?;
		stdout.flush().await?;

		let Some(line) = lines.next_line().await? else {
			break;
		};

		match Command::parse(&line) {
			Command::Quit => break,
			Command::Empty => continue,
			Command::Help => println!("\n{}", help_text()),
			Command::Reset => match client.reset().await {
				Ok(()) => println!("\nConversation reset. Starting fresh."),
				Err(err) => eprintln!("\nReset failed: {err}"),
			},
			Command::Message(message) => match client.send(message).await {
				Ok(reply) => {
					println!("\nDecoChat:\n{}", reply.response);

					let items = client::summarize_metadata(&reply.metadata);

					if !items.is_empty() {
						println!("\nItems considered:");

						for item in items {
							println!("  - {item}");
						}
					}
				},
				Err(err) => eprintln!("\nRequest failed: {err}"),
			},
		}
	}

	println!("\nGoodbye. Thanks for chatting.");

	Ok(())
}
