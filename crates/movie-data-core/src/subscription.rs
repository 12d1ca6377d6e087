use futures::Stream;
use movie_data_models::{MovieId, MovieWithReviews};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use crate::outcome::Outcome;

const SUBSCRIPTION_BUFFER: usize = 8;

/// Live view of a movie with its reviews
///
/// Yields one item once the remote data is in, then a new item every time the
/// viewer's own review for the movie changes locally. A failed initial fetch
/// yields that error once and ends the stream.
///
/// Cancelling (or dropping) the subscription aborts the producer task, which
/// cancels any fetch still in flight and releases the store watch.
pub struct MovieWithReviewsSubscription {
    movie_id: MovieId,
    receiver: mpsc::Receiver<Outcome<MovieWithReviews>>,
    active: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl MovieWithReviewsSubscription {
    /// Start `producer` on the runtime, handing it the sending half
    pub(crate) fn spawn<F, Fut>(movie_id: MovieId, producer: F) -> Self
    where
        F: FnOnce(Emitter) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let active = Arc::new(AtomicBool::new(true));
        let emitter = Emitter {
            sender,
            active: active.clone(),
        };
        let task = tokio::spawn(producer(emitter));

        Self {
            movie_id,
            receiver,
            active,
            task: Some(task),
        }
    }

    pub fn movie_id(&self) -> MovieId {
        self.movie_id
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Next combined value, or `None` once the subscription has ended or was cancelled
    pub async fn next(&mut self) -> Option<Outcome<MovieWithReviews>> {
        if !self.is_active() {
            return None;
        }
        self.receiver.recv().await
    }

    pub fn cancel(&mut self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.receiver.close();
        while self.receiver.try_recv().is_ok() {}
        debug!("Subscription for movie {} cancelled", self.movie_id);
    }
}

impl Stream for MovieWithReviewsSubscription {
    type Item = Outcome<MovieWithReviews>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // Buffered items are not handed out after cancel
        if !self.is_active() {
            return Poll::Ready(None);
        }
        self.receiver.poll_recv(cx)
    }
}

impl Drop for MovieWithReviewsSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Sending half held by the producer task
pub(crate) struct Emitter {
    sender: mpsc::Sender<Outcome<MovieWithReviews>>,
    active: Arc<AtomicBool>,
}

impl Emitter {
    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire) && !self.sender.is_closed()
    }

    /// Send one item; returns false once the subscriber is gone
    pub(crate) async fn emit(&self, item: Outcome<MovieWithReviews>) -> bool {
        if !self.is_active() {
            return false;
        }
        self.sender.send(item).await.is_ok()
    }
}
