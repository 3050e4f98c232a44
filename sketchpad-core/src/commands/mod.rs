//! # Commands
//!
//! Every user edit that can be reversed is recorded as a [`Command`] on an [`UndoStack`].
//! Drawing records the id of the stroke it began. Erasing records a deep clone of the stroke
//! as it was immediately before removal, so undoing restores it verbatim.
//!
//! History is linear and one-directional - undo pops, and nothing is kept for redo.

use std::collections::VecDeque;

use crate::stroke::{Stroke, StrokeID};

/// Default maximum depth of the history.
pub const DEFAULT_DEPTH: usize = 1024;

#[derive(Debug)]
pub enum Command {
    /// A stroke was begun. Undoing removes it.
    Draw { stroke: StrokeID },
    /// A stroke was erased. Undoing re-appends `backup` under its original id.
    Erase { stroke: StrokeID, backup: Stroke },
}
impl Command {
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Draw { .. } => CommandKind::Draw,
            Self::Erase { .. } => CommandKind::Erase,
        }
    }
    /// The stroke this command concerns.
    #[must_use]
    pub fn stroke(&self) -> StrokeID {
        match self {
            Self::Draw { stroke } | Self::Erase { stroke, .. } => *stroke,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum CommandKind {
    Draw,
    Erase,
}

/// What to do with a push onto a full history.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum OverflowPolicy {
    /// Refuse the new command. Once full, further edits are not undoable
    /// until something is undone.
    #[default]
    Reject,
    /// Forget the oldest command to make room.
    DropOldest,
}

#[derive(thiserror::Error, Debug)]
#[error("undo history is full ({capacity} commands)")]
pub struct HistoryFull {
    pub capacity: usize,
    /// The refused command, handed back to the caller.
    pub command: Command,
}

/// A bounded stack of undoable commands.
#[derive(Debug)]
pub struct UndoStack {
    commands: VecDeque<Command>,
    capacity: usize,
    policy: OverflowPolicy,
}
impl Default for UndoStack {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH, OverflowPolicy::default())
    }
}
impl UndoStack {
    #[must_use]
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            // Erase commands carry a whole stroke, reserve lazily.
            commands: VecDeque::new(),
            capacity,
            policy,
        }
    }
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    #[must_use]
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.commands.len() >= self.capacity
    }
    /// Would a push right now be kept?
    ///
    /// Lets callers skip building an expensive command that would just be refused.
    #[must_use]
    pub fn accepts(&self) -> bool {
        self.capacity != 0 && (!self.is_full() || self.policy == OverflowPolicy::DropOldest)
    }
    /// Record a command.
    ///
    /// On success, returns the command dropped to make room for it, if any.
    /// A zero-capacity history refuses everything regardless of policy.
    pub fn push(&mut self, command: Command) -> Result<Option<Command>, HistoryFull> {
        if !self.accepts() {
            return Err(HistoryFull {
                capacity: self.capacity,
                command,
            });
        }
        let evicted = if self.is_full() {
            self.commands.pop_front()
        } else {
            None
        };
        if let Some(evicted) = &evicted {
            log::debug!("history full, forgot {:?} of {}", evicted.kind(), evicted.stroke());
        }
        self.commands.push_back(command);
        Ok(evicted)
    }
    /// Take the most recent command.
    pub fn pop(&mut self) -> Option<Command> {
        self.commands.pop_back()
    }
    #[must_use]
    pub fn peek(&self) -> Option<&Command> {
        self.commands.back()
    }
    /// Forget every command, releasing any backups.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Command> + '_ {
        self.commands.iter()
    }
}
