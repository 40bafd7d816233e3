use color_eyre::eyre;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
struct ChatBody<'a> {
	message: &'a str,
	session_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatReply {
	pub response: String,
	#[serde(default)]
	pub metadata: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
	error_code: String,
	message: String,
}

#[derive(Debug, Deserialize)]
struct ResetReply {
	status: String,
}

/// HTTP client bound to one API base URL and one conversation session.
pub struct ChatClient {
	http: Client,
	base_url: String,
	session_id: String,
}
impl ChatClient {
	pub fn new(base_url: &str, session_id: &str) -> Self {
		Self {
			http: Client::new(),
			base_url: base_url.trim_end_matches('/').to_string(),
			session_id: session_id.to_string(),
		}
	}

	pub fn session_id(&self) -> &str {
		&self.session_id
	}

	pub async fn send(&self, message: &str) -> color_eyre::Result<ChatReply> {
		let res = self
			.http
			.post(format!("{}/api/chat", self.base_url))
			.json(&ChatBody { message, session_id: &self.session_id })
			.send()
			.await?;
		let status = res.status();

		if !status.is_success() {
			let body = res.text().await.unwrap_or_default();

			return Err(match serde_json::from_str::<ErrorReply>(&body) {
				Ok(err) =>
					eyre::eyre!("Server returned {status} ({}): {}", err.error_code, err.message),
				Err(_) => eyre::eyre!("Server returned {status}: {body}"),
			});
		}

		Ok(res.json().await?)
	}

	pub async fn reset(&self) -> color_eyre::Result<()> {
		let res = self
			.http
			.delete(format!("{}/api/chat", self.base_url))
			.query(&[("session_id", self.session_id.as_str())])
			.send()
			.await?
			.error_for_status()?;
		let reply: ResetReply = res.json().await?;

		if reply.status != "success" {
			return Err(eyre::eyre!("Reset returned status {}.", reply.status));
		}

		Ok(())
	}
}

/// One line per recommended item: name, category and price when known.
pub fn summarize_metadata(metadata: &[Value]) -> Vec<String> {
	metadata
		.iter()
		.map(|item| {
			let name = item["name"].as_str().unwrap_or("Unnamed item");
			let category = item["category"].as_str().unwrap_or("Uncategorized");

			match item["price"].as_f64() {
				Some(price) => format!("{name} ({category}) - {price:.2}"),
				None => format!("{name} ({category}) - price not available"),
			}
		})
		.collect()
}
