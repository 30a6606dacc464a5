use cometd_mock_api_types::{Reply, envelope};

/// What goes back over HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// The protocol envelope, a JSON array of replies.
    Replies(Vec<Reply>),
    /// A bare non-JSON body. Only the chaos adapter produces these.
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: u16,
    pub body: Body,
}

impl Outcome {
    pub fn ok(reply: Reply) -> Self {
        Self::with_status(200, reply)
    }

    pub fn with_status(status: u16, reply: Reply) -> Self {
        Self {
            status,
            body: Body::Replies(envelope(reply)),
        }
    }

    pub fn text(status: u16, text: impl Into<String>) -> Self {
        Self {
            status,
            body: Body::Text(text.into()),
        }
    }

    /// The first reply of the envelope, if the body is one.
    pub fn reply(&self) -> Option<&Reply> {
        match &self.body {
            Body::Replies(replies) => replies.first(),
            Body::Text(_) => None,
        }
    }
}
