//! 订阅源与 async 代码之间的桥接

use crate::reactive::{Notification, Observable, Subscription};
use futures::channel::mpsc;
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// 离开作用域时取消订阅
#[derive(Debug)]
pub struct SubscriptionGuard {
    subscription: Subscription,
}

impl SubscriptionGuard {
    /// 包装订阅
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }

    /// 提前取消订阅
    pub fn unsubscribe(&self) {
        self.subscription.unsubscribe();
    }
}

impl From<Subscription> for SubscriptionGuard {
    fn from(subscription: Subscription) -> Self {
        Self::new(subscription)
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

/// 把订阅源转换成 [`Stream`]，源结束时流结束，流被丢弃时取消订阅
pub struct ObservableStream<T> {
    receiver: mpsc::UnboundedReceiver<T>,
    _guard: SubscriptionGuard,
}

impl<T> Stream for ObservableStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.receiver.poll_next_unpin(cx)
    }
}

impl<T> Observable<T>
where
    T: Send + 'static,
{
    /// 等待第一个值；源在发出值之前结束时返回 `None`
    pub async fn first_value(&self) -> Option<T> {
        let (sender, receiver) = oneshot::channel();
        let sender = Arc::new(Mutex::new(Some(sender)));

        let subscription = self.first().subscribe_sink(Arc::new(move |notification: Notification<T>| {
            let Some(sender) = sender.lock().take() else {
                return;
            };
            if let Notification::Next(value) = notification {
                let _ = sender.send(value);
            }
        }));
        let _guard = SubscriptionGuard::new(subscription);

        receiver.await.ok()
    }

    /// 转换为无界 [`Stream`]
    pub fn into_stream(&self) -> ObservableStream<T> {
        let (sender, receiver) = mpsc::unbounded();
        let subscription = self.subscribe_sink(Arc::new(move |notification: Notification<T>| match notification {
            Notification::Next(value) => {
                let _ = sender.unbounded_send(value);
            }
            Notification::Complete => sender.close_channel(),
        }));

        ObservableStream {
            receiver,
            _guard: SubscriptionGuard::new(subscription),
        }
    }
}
