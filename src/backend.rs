use reqwest::Client;
use std::future::Future;
use std::pin::Pin;

use crate::config::Config;
use crate::model::{Message, RemoteError};
use crate::providers;

pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<String, RemoteError>> + 'a>>;

/// The remote chat-completion collaborator: ordered messages in, reply
/// text out. The router only ever talks to this seam, so tests can swap
/// in a recording or failing backend.
pub trait CompletionBackend {
    fn complete<'a>(&'a self, messages: &'a [Message]) -> CompletionFuture<'a>;
}

/// Production backend over the hosted chat-completion API.
pub struct OpenAiBackend<'a> {
    client: &'a Client,
    cfg: &'a Config,
}

impl<'a> OpenAiBackend<'a> {
    pub fn new(client: &'a Client, cfg: &'a Config) -> Self {
        Self { client, cfg }
    }
}

impl CompletionBackend for OpenAiBackend<'_> {
    fn complete<'a>(&'a self, messages: &'a [Message]) -> CompletionFuture<'a> {
        Box::pin(providers::openai::chat(self.client, self.cfg, messages))
    }
}
