//! Stream combinators used by the hub accessors.

use std::future::Future;
use std::time::Duration;

use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::watch;
use tokio::time::Instant;

/// Emits values published on `receiver` at most once per `period`.
///
/// The first change is emitted immediately. Changes arriving inside the
/// window are collapsed and the newest one is emitted when the window ends.
/// The stream ends when the channel's sender is dropped.
pub(crate) fn throttle_latest<T>(
    receiver: watch::Receiver<Option<T>>,
    period: Duration,
) -> BoxStream<'static, T>
where
    T: Clone + Send + Sync + 'static,
{
    stream::unfold(
        (receiver, None::<Instant>),
        move |(mut receiver, last_emit)| async move {
            loop {
                if receiver.changed().await.is_err() {
                    return None;
                }
                if let Some(last_emit) = last_emit {
                    tokio::time::sleep_until(last_emit + period).await;
                }
                let value = receiver.borrow_and_update().clone();
                if let Some(value) = value {
                    return Some((value, (receiver, Some(Instant::now()))));
                }
            }
        },
    )
    .boxed()
}

/// Prepends the result of `seed` (when it yields a value) to `rest`.
pub(crate) fn seeded<T, F>(seed: F, rest: BoxStream<'static, T>) -> BoxStream<'static, T>
where
    T: Send + 'static,
    F: Future<Output = Option<T>> + Send + 'static,
{
    stream::once(seed)
        .filter_map(future::ready)
        .chain(rest)
        .boxed()
}

/// Builds the stream with `make` on first poll.
///
/// Accessors subscribe and read their seed inside `make`, so a stream held
/// unpolled for a while still starts from the state current when it is
/// first polled.
pub(crate) fn deferred<T, F>(make: F) -> BoxStream<'static, T>
where
    T: Send + 'static,
    F: FnOnce() -> BoxStream<'static, T> + Send + 'static,
{
    stream::once(future::lazy(move |_| make()))
        .flatten()
        .boxed()
}

/// Drops items whose key equals the key of the previously emitted item.
pub(crate) fn distinct_until_changed_by<T, K, F>(
    source: BoxStream<'static, T>,
    key: F,
) -> BoxStream<'static, T>
where
    T: Send + 'static,
    K: PartialEq + Send + 'static,
    F: Fn(&T) -> K + Send + 'static,
{
    let mut last: Option<K> = None;
    source
        .filter(move |item| {
            let next = key(item);
            let changed = last.as_ref() != Some(&next);
            if changed {
                last = Some(next);
            }
            future::ready(changed)
        })
        .boxed()
}

pub(crate) fn distinct_until_changed<T>(source: BoxStream<'static, T>) -> BoxStream<'static, T>
where
    T: Clone + PartialEq + Send + 'static,
{
    distinct_until_changed_by(source, T::clone)
}
