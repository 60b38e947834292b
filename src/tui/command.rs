use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxedMsgFuture<Msg> = Pin<Box<dyn Future<Output = Msg> + Send>>;

/// Commands represent side effects that apps want to perform.
/// They are returned from the update() function and executed by the runtime.
pub enum Command<Msg> {
    /// Do nothing
    None,

    /// Execute multiple commands in sequence
    Batch(Vec<Command<Msg>>),

    /// Perform an async operation and send the result as a message
    Perform(BoxedMsgFuture<Msg>),

    /// Quit the application
    Quit,
}

impl<Msg> Command<Msg> {
    /// Helper to create a command that performs an async operation
    pub fn perform<F, T>(future: F, to_msg: impl Fn(T) -> Msg + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        Msg: Send + 'static,
    {
        Command::Perform(Box::pin(async move {
            let result = future.await;
            to_msg(result)
        }))
    }

    /// Helper to batch multiple commands
    pub fn batch(commands: Vec<Command<Msg>>) -> Self {
        Command::Batch(commands)
    }

    pub fn is_none(&self) -> bool {
        match self {
            Command::None => true,
            Command::Batch(commands) => commands.iter().all(Command::is_none),
            _ => false,
        }
    }

    /// Wrap every message this command produces, e.g. to lift an engine
    /// message into the hosting app's message type
    pub fn map<U>(self, f: impl Fn(Msg) -> U + Send + Sync + 'static) -> Command<U>
    where
        Msg: Send + 'static,
        U: Send + 'static,
    {
        self.map_shared(Arc::new(f))
    }

    fn map_shared<U>(self, f: Arc<dyn Fn(Msg) -> U + Send + Sync>) -> Command<U>
    where
        Msg: Send + 'static,
        U: Send + 'static,
    {
        match self {
            Command::None => Command::None,
            Command::Quit => Command::Quit,
            Command::Batch(commands) => {
                Command::Batch(commands.into_iter().map(|c| c.map_shared(Arc::clone(&f))).collect())
            }
            Command::Perform(future) => Command::Perform(Box::pin(async move { f(future.await) })),
        }
    }

    /// Flatten into the pending futures, dropping everything else
    pub fn into_futures(self) -> Vec<BoxedMsgFuture<Msg>> {
        match self {
            Command::Perform(future) => vec![future],
            Command::Batch(commands) => commands.into_iter().flat_map(Command::into_futures).collect(),
            Command::None | Command::Quit => Vec::new(),
        }
    }
}

impl<Msg> Default for Command<Msg> {
    fn default() -> Self {
        Command::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    #[test]
    fn test_map_reaches_nested_futures() {
        let command: Command<u32> = Command::batch(vec![
            Command::None,
            Command::perform(async { 2 }, |n: u32| n),
            Command::batch(vec![Command::perform(async { 5 }, |n: u32| n)]),
        ]);

        let results: Vec<String> = command
            .map(|n| format!("#{}", n))
            .into_futures()
            .into_iter()
            .filter_map(|f| f.now_or_never())
            .collect();
        assert_eq!(results, vec!["#2", "#5"]);
    }

    #[test]
    fn test_is_none() {
        assert!(Command::<()>::None.is_none());
        assert!(Command::<()>::batch(vec![Command::None, Command::batch(vec![])]).is_none());
        assert!(!Command::<()>::Quit.is_none());
    }
}
