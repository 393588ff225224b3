use crate::Event;
use std::fmt;

/// Outcome of a single take within a transaction scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TakeOutcome {
    /// The channel yielded an event.
    Event(Event),
    /// The channel ran dry; the caller should stop collecting.
    Empty,
}

/// Transactional queue the sink drains. Implementations supply their own
/// durability and bounded-blocking behaviour.
pub trait Channel {
    type Transaction: Transaction;

    /// Opens a new transaction scope bounding one batch of takes.
    fn begin_transaction(&mut self) -> Result<Self::Transaction, ChannelError>;
}

/// One begin/commit-or-rollback/close unit. All takes performed within the
/// scope commit or roll back together.
pub trait Transaction {
    /// Takes the next event, or reports the channel empty.
    fn take(&mut self) -> Result<TakeOutcome, ChannelError>;

    /// Commits every take performed in this scope.
    fn commit(&mut self) -> Result<(), ChannelError>;

    /// Rolls back every take performed in this scope.
    fn rollback(&mut self) -> Result<(), ChannelError>;

    /// Releases the scope. Must be idempotent and safe to call after either
    /// commit or rollback.
    fn close(&mut self);
}

/// Store-level error raised by a channel or transaction operation.
#[derive(Debug, Clone)]
pub struct ChannelError {
    message: String,
}

impl ChannelError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel error: {}", self.message)
    }
}

impl std::error::Error for ChannelError {}
