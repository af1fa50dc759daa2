//! 推送式响应流
//!
//! - [`Subject`] 保存最新值并向所有观察者广播，新观察者订阅时立即收到最新值
//! - [`Observable`] 是可组合的订阅源，提供 `map` / `filter` / `filter_map` / `first`
//! - [`Subscription`] 用于取消订阅，取消后观察者引用会被释放
//!
//! 所有通知都在触发它的调用中同步发出。观察者回调中再次推送的值会进入队列，
//! 在当前通知完成后按顺序发出。不同线程的推送由主题的发出锁串行化：
//! `next` 返回时该值已送达所有观察者。回调执行期间只持有发出锁，不持有状态锁，
//! 因此回调中不能等待另一个线程向同一主题推送。

use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::trace;

/// 通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification<T> {
    /// 新值
    Next(T),
    /// 序列结束
    Complete,
}

/// 观察者回调
pub type Sink<T> = Arc<dyn Fn(Notification<T>) + Send + Sync>;

type Teardown = Box<dyn FnOnce() + Send>;

/// 订阅句柄
///
/// 可克隆；`unsubscribe` 只生效一次。丢弃句柄不会取消订阅。
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<SubscriptionInner>,
}

struct SubscriptionInner {
    closed: AtomicBool,
    teardown: Mutex<Option<Teardown>>,
}

impl Subscription {
    /// 创建带清理函数的订阅
    pub fn new<F>(teardown: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            inner: Arc::new(SubscriptionInner {
                closed: AtomicBool::new(false),
                teardown: Mutex::new(Some(Box::new(teardown))),
            }),
        }
    }

    /// 创建已关闭的订阅
    pub fn closed() -> Self {
        Self {
            inner: Arc::new(SubscriptionInner {
                closed: AtomicBool::new(true),
                teardown: Mutex::new(None),
            }),
        }
    }

    /// 取消订阅
    pub fn unsubscribe(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let teardown = self.inner.teardown.lock().take();
        if let Some(teardown) = teardown {
            teardown();
        }
    }

    /// 是否已关闭
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}

struct ObserverSlot<T> {
    id: u64,
    active: Arc<AtomicBool>,
    sink: Sink<T>,
}

impl<T> Clone for ObserverSlot<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            active: self.active.clone(),
            sink: self.sink.clone(),
        }
    }
}

struct SubjectState<T> {
    current: T,
    observers: Vec<ObserverSlot<T>>,
    queue: VecDeque<T>,
    emitting: bool,
}

/// 保存最新值的多播主题
pub struct Subject<T> {
    state: Arc<Mutex<SubjectState<T>>>,
    emission: Arc<ReentrantMutex<()>>,
    next_id: Arc<AtomicU64>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            emission: self.emission.clone(),
            next_id: self.next_id.clone(),
        }
    }
}

impl<T> Subject<T>
where
    T: Clone + Send + 'static,
{
    /// 以初始值创建主题
    pub fn new(initial: T) -> Self {
        Self {
            state: Arc::new(Mutex::new(SubjectState {
                current: initial,
                observers: Vec::new(),
                queue: VecDeque::new(),
                emitting: false,
            })),
            emission: Arc::new(ReentrantMutex::new(())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// 最近一次发出的值
    pub fn value(&self) -> T {
        self.state.lock().current.clone()
    }

    /// 当前观察者数量
    pub fn observer_count(&self) -> usize {
        self.state.lock().observers.len()
    }

    /// 持有发出锁
    ///
    /// 持有期间其他线程的 `next` 和订阅会等待，同一线程可以重入。
    /// 用于让外部状态的修改与对应值的推送保持同一顺序。
    pub fn hold_emission(&self) -> ReentrantMutexGuard<'_, ()> {
        self.emission.lock()
    }

    /// 推送新值
    ///
    /// 若当前线程正在通知观察者（回调中再次推送），新值排队，待当前通知完成后发出。
    pub fn next(&self, value: T) {
        let _emission = self.emission.lock();
        {
            let mut state = self.state.lock();
            state.queue.push_back(value);
            if state.emitting {
                trace!("通知进行中，新值进入队列 (队列长度 {})", state.queue.len());
                return;
            }
            state.emitting = true;
        }
        self.drain();
    }

    /// 订阅，立即收到最新值
    pub fn subscribe_sink(&self, sink: Sink<T>) -> Subscription {
        let _emission = self.emission.lock();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));

        let (current, was_emitting) = {
            let mut state = self.state.lock();
            state.observers.push(ObserverSlot {
                id,
                active: active.clone(),
                sink: sink.clone(),
            });
            let was_emitting = state.emitting;
            state.emitting = true;
            (state.current.clone(), was_emitting)
        };

        let subscription = {
            let state: Weak<Mutex<SubjectState<T>>> = Arc::downgrade(&self.state);
            let active = active.clone();
            Subscription::new(move || {
                active.store(false, Ordering::SeqCst);
                if let Some(state) = state.upgrade() {
                    state.lock().observers.retain(|slot| slot.id != id);
                }
            })
        };

        if was_emitting {
            sink(Notification::Next(current));
        } else {
            let _guard = EmittingGuard { state: &self.state };
            sink(Notification::Next(current));
            self.drain_queued();
        }

        subscription
    }

    /// 转换为可组合的订阅源
    pub fn as_observable(&self) -> Observable<T> {
        let subject = self.clone();
        Observable::new(move |sink| subject.subscribe_sink(sink))
    }

    fn drain(&self) {
        let _guard = EmittingGuard { state: &self.state };
        self.drain_queued();
    }

    fn drain_queued(&self) {
        loop {
            let (value, observers) = {
                let mut state = self.state.lock();
                match state.queue.pop_front() {
                    Some(value) => {
                        state.current = value.clone();
                        (value, state.observers.clone())
                    }
                    None => {
                        state.emitting = false;
                        return;
                    }
                }
            };

            trace!("向 {} 个观察者发出通知", observers.len());
            for slot in observers {
                if slot.active.load(Ordering::SeqCst) {
                    (slot.sink)(Notification::Next(value.clone()));
                }
            }
        }
    }
}

impl<T> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Subject")
            .field("observers", &state.observers.len())
            .field("queued", &state.queue.len())
            .field("emitting", &state.emitting)
            .finish()
    }
}

/// 观察者回调 panic 时清除 emitting 标记，避免主题停止发出通知
struct EmittingGuard<'a, T> {
    state: &'a Mutex<SubjectState<T>>,
}

impl<T> Drop for EmittingGuard<'_, T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.state.lock().emitting = false;
        }
    }
}

type SubscribeFn<T> = dyn Fn(Sink<T>) -> Subscription + Send + Sync;

/// 可组合的订阅源
pub struct Observable<T> {
    subscribe_fn: Arc<SubscribeFn<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe_fn: self.subscribe_fn.clone(),
        }
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Observable(<function>)")
    }
}

impl<T> Observable<T>
where
    T: Send + 'static,
{
    /// 由订阅函数创建订阅源
    pub fn new<F>(subscribe_fn: F) -> Self
    where
        F: Fn(Sink<T>) -> Subscription + Send + Sync + 'static,
    {
        Self {
            subscribe_fn: Arc::new(subscribe_fn),
        }
    }

    /// 以原始回调订阅
    pub fn subscribe_sink(&self, sink: Sink<T>) -> Subscription {
        (self.subscribe_fn)(sink)
    }

    /// 订阅值
    pub fn subscribe<F>(&self, next: F) -> Subscription
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.subscribe_sink(Arc::new(move |notification: Notification<T>| {
            if let Notification::Next(value) = notification {
                next(value);
            }
        }))
    }

    /// 订阅值和结束通知
    pub fn subscribe_with<N, C>(&self, next: N, complete: C) -> Subscription
    where
        N: Fn(T) + Send + Sync + 'static,
        C: Fn() + Send + Sync + 'static,
    {
        self.subscribe_sink(Arc::new(move |notification: Notification<T>| match notification {
            Notification::Next(value) => next(value),
            Notification::Complete => complete(),
        }))
    }

    /// 映射每个值
    pub fn map<U, F>(&self, f: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.filter_map(move |value| Some(f(value)))
    }

    /// 只保留满足条件的值
    pub fn filter<F>(&self, predicate: F) -> Observable<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter_map(move |value| predicate(&value).then_some(value))
    }

    /// 映射并丢弃 `None`
    pub fn filter_map<U, F>(&self, f: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Option<U> + Send + Sync + 'static,
    {
        let source = self.clone();
        let f = Arc::new(f);
        Observable::new(move |sink: Sink<U>| {
            let f = f.clone();
            source.subscribe_sink(Arc::new(move |notification: Notification<T>| match notification {
                Notification::Next(value) => {
                    if let Some(mapped) = f(value) {
                        sink(Notification::Next(mapped));
                    }
                }
                Notification::Complete => sink(Notification::Complete),
            }))
        })
    }

    /// 只取第一个值，随后结束并取消上游订阅
    ///
    /// 上游在订阅时同步发出值的情况下，值在 `subscribe` 返回前送达。
    pub fn first(&self) -> Observable<T> {
        let source = self.clone();
        Observable::new(move |sink: Sink<T>| {
            let upstream: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
            let outer = {
                let upstream = upstream.clone();
                Subscription::new(move || {
                    let subscription = upstream.lock().take();
                    if let Some(subscription) = subscription {
                        subscription.unsubscribe();
                    }
                })
            };

            let inner: Sink<T> = {
                let outer = outer.clone();
                Arc::new(move |notification: Notification<T>| {
                    if outer.is_closed() {
                        return;
                    }
                    outer.unsubscribe();
                    if let Notification::Next(value) = notification {
                        sink(Notification::Next(value));
                    }
                    sink(Notification::Complete);
                })
            };

            let subscription = source.subscribe_sink(inner);
            {
                let mut slot = upstream.lock();
                if !outer.is_closed() {
                    *slot = Some(subscription);
                    return outer;
                }
            }
            subscription.unsubscribe();
            outer
        })
    }
}
