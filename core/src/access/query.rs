use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::DropGuard;

use crate::Error;

/// What presentation sees of a read: in flight, failed, or done.
#[derive(Debug)]
pub enum QueryState<T> {
	Loading,
	Failed(Arc<Error>),
	Ready(Arc<Vec<T>>),
}

impl<T> Clone for QueryState<T> {
	fn clone(&self) -> Self {
		match self {
			Self::Loading => Self::Loading,
			Self::Failed(e) => Self::Failed(Arc::clone(e)),
			Self::Ready(rows) => Self::Ready(Arc::clone(rows)),
		}
	}
}

impl<T> QueryState<T> {
	pub fn is_loading(&self) -> bool {
		matches!(self, Self::Loading)
	}

	pub fn data(&self) -> Option<&Arc<Vec<T>>> {
		match self {
			Self::Ready(rows) => Some(rows),
			_ => None,
		}
	}

	pub fn error(&self) -> Option<&Error> {
		match self {
			Self::Failed(e) => Some(e),
			_ => None,
		}
	}
}

impl<T> From<Result<Arc<Vec<T>>, Error>> for QueryState<T> {
	fn from(result: Result<Arc<Vec<T>>, Error>) -> Self {
		match result {
			Ok(rows) => Self::Ready(rows),
			Err(e) => Self::Failed(Arc::new(e)),
		}
	}
}

/// Live view of a read, owned by whatever displays it.
///
/// Dropping the handle cancels the request behind it; a cancelled request never
/// publishes its result.
pub struct QueryHandle<T> {
	rx: watch::Receiver<QueryState<T>>,
	_guard: DropGuard,
}

impl<T> QueryHandle<T> {
	pub(crate) fn new(rx: watch::Receiver<QueryState<T>>, guard: DropGuard) -> Self {
		Self { rx, _guard: guard }
	}

	pub fn state(&self) -> QueryState<T> {
		self.rx.borrow().clone()
	}

	/// Waits for the next state that is not [`QueryState::Loading`].
	pub async fn settled(&mut self) -> QueryState<T> {
		match self.rx.wait_for(|state| !state.is_loading()).await {
			Ok(state) => state.clone(),
			Err(_) => QueryState::Failed(Arc::new(Error::Cancelled)),
		}
	}

	/// Waits until the state changes, then returns it.
	pub async fn changed(&mut self) -> QueryState<T> {
		match self.rx.changed().await {
			Ok(()) => self.rx.borrow_and_update().clone(),
			Err(_) => QueryState::Failed(Arc::new(Error::Cancelled)),
		}
	}
}
