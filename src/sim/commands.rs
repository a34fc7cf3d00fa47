//! Toggle commands
//!
//! Input handlers that live on another thread post commands through a
//! [`CommandSender`]; the controller drains its [`CommandQueue`] at the start
//! of each fixed tick, so state is only ever written from the tick thread.

use std::sync::mpsc::{self, Receiver, Sender};

/// Discrete user/external trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePower,
    ToggleMode,
}

/// Single-consumer inbox owned by the controller
#[derive(Debug)]
pub struct CommandQueue {
    tx: Sender<Command>,
    rx: Receiver<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// Producer handle; clone freely
    pub fn sender(&self) -> CommandSender {
        CommandSender(self.tx.clone())
    }

    /// Take every command posted so far, oldest first
    pub fn drain(&self) -> Vec<Command> {
        self.rx.try_iter().collect()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer side of a [`CommandQueue`]
#[derive(Debug, Clone)]
pub struct CommandSender(Sender<Command>);

impl CommandSender {
    /// Post a command; false once the controller is gone
    pub fn send(&self, command: Command) -> bool {
        self.0.send(command).is_ok()
    }

    pub fn toggle_power(&self) -> bool {
        self.send(Command::TogglePower)
    }

    pub fn toggle_mode(&self) -> bool {
        self.send(Command::ToggleMode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_drain_preserves_order() {
        let queue = CommandQueue::new();
        let sender = queue.sender();
        sender.toggle_mode();
        sender.toggle_power();
        sender.toggle_mode();
        assert_eq!(
            queue.drain(),
            vec![Command::ToggleMode, Command::TogglePower, Command::ToggleMode]
        );
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_send_from_other_thread() {
        let queue = CommandQueue::new();
        let sender = queue.sender();
        thread::spawn(move || {
            for _ in 0..4 {
                assert!(sender.toggle_power());
            }
        })
        .join()
        .unwrap();
        assert_eq!(queue.drain().len(), 4);
    }

    #[test]
    fn test_send_after_queue_dropped() {
        let queue = CommandQueue::new();
        let sender = queue.sender();
        drop(queue);
        assert!(!sender.toggle_mode());
    }
}
