//! Handler trait and utilities

use crate::extract::FromRequest;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::versioning::VersionTag;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Trait representing an async handler function
pub trait Handler<T>: Clone + Send + Sync + Sized + 'static {
    /// The response type
    type Future: Future<Output = Response> + Send + 'static;

    /// Call the handler with the request
    fn call(self, req: Request) -> Self::Future;

    /// Version labels attached to the handler, see [`crate::version`]
    fn version_tag(&self) -> Option<VersionTag> {
        None
    }

    /// Fully qualified type name of the handler
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

// Implement Handler for async functions with 0-5 extractors

// 0 args
impl<F, Fut, Res> Handler<()> for F
where
    F: FnOnce() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Res: IntoResponse,
{
    type Future = Pin<Box<dyn Future<Output = Response> + Send>>;

    fn call(self, _req: Request) -> Self::Future {
        Box::pin(async move { self().await.into_response() })
    }
}

// 1 arg
impl<F, Fut, Res, T1> Handler<(T1,)> for F
where
    F: FnOnce(T1) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Res: IntoResponse,
    T1: FromRequest + Send + 'static,
{
    type Future = Pin<Box<dyn Future<Output = Response> + Send>>;

    fn call(self, mut req: Request) -> Self::Future {
        Box::pin(async move {
            let t1 = match T1::from_request(&mut req).await {
                Ok(v) => v,
                Err(e) => return e.into_response(),
            };
            self(t1).await.into_response()
        })
    }
}

// 2 args
impl<F, Fut, Res, T1, T2> Handler<(T1, T2)> for F
where
    F: FnOnce(T1, T2) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Res: IntoResponse,
    T1: FromRequest + Send + 'static,
    T2: FromRequest + Send + 'static,
{
    type Future = Pin<Box<dyn Future<Output = Response> + Send>>;

    fn call(self, mut req: Request) -> Self::Future {
        Box::pin(async move {
            let t1 = match T1::from_request(&mut req).await {
                Ok(v) => v,
                Err(e) => return e.into_response(),
            };
            let t2 = match T2::from_request(&mut req).await {
                Ok(v) => v,
                Err(e) => return e.into_response(),
            };
            self(t1, t2).await.into_response()
        })
    }
}

// 3 args
impl<F, Fut, Res, T1, T2, T3> Handler<(T1, T2, T3)> for F
where
    F: FnOnce(T1, T2, T3) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Res: IntoResponse,
    T1: FromRequest + Send + 'static,
    T2: FromRequest + Send + 'static,
    T3: FromRequest + Send + 'static,
{
    type Future = Pin<Box<dyn Future<Output = Response> + Send>>;

    fn call(self, mut req: Request) -> Self::Future {
        Box::pin(async move {
            let t1 = match T1::from_request(&mut req).await {
                Ok(v) => v,
                Err(e) => return e.into_response(),
            };
            let t2 = match T2::from_request(&mut req).await {
                Ok(v) => v,
                Err(e) => return e.into_response(),
            };
            let t3 = match T3::from_request(&mut req).await {
                Ok(v) => v,
                Err(e) => return e.into_response(),
            };
            self(t1, t2, t3).await.into_response()
        })
    }
}

// 4 args
impl<F, Fut, Res, T1, T2, T3, T4> Handler<(T1, T2, T3, T4)> for F
where
    F: FnOnce(T1, T2, T3, T4) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Res: IntoResponse,
    T1: FromRequest + Send + 'static,
    T2: FromRequest + Send + 'static,
    T3: FromRequest + Send + 'static,
    T4: FromRequest + Send + 'static,
{
    type Future = Pin<Box<dyn Future<Output = Response> + Send>>;

    fn call(self, mut req: Request) -> Self::Future {
        Box::pin(async move {
            let t1 = match T1::from_request(&mut req).await {
                Ok(v) => v,
                Err(e) => return e.into_response(),
            };
            let t2 = match T2::from_request(&mut req).await {
                Ok(v) => v,
                Err(e) => return e.into_response(),
            };
            let t3 = match T3::from_request(&mut req).await {
                Ok(v) => v,
                Err(e) => return e.into_response(),
            };
            let t4 = match T4::from_request(&mut req).await {
                Ok(v) => v,
                Err(e) => return e.into_response(),
            };
            self(t1, t2, t3, t4).await.into_response()
        })
    }
}

// 5 args
impl<F, Fut, Res, T1, T2, T3, T4, T5> Handler<(T1, T2, T3, T4, T5)> for F
where
    F: FnOnce(T1, T2, T3, T4, T5) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Res: IntoResponse,
    T1: FromRequest + Send + 'static,
    T2: FromRequest + Send + 'static,
    T3: FromRequest + Send + 'static,
    T4: FromRequest + Send + 'static,
    T5: FromRequest + Send + 'static,
{
    type Future = Pin<Box<dyn Future<Output = Response> + Send>>;

    fn call(self, mut req: Request) -> Self::Future {
        Box::pin(async move {
            let t1 = match T1::from_request(&mut req).await {
                Ok(v) => v,
                Err(e) => return e.into_response(),
            };
            let t2 = match T2::from_request(&mut req).await {
                Ok(v) => v,
                Err(e) => return e.into_response(),
            };
            let t3 = match T3::from_request(&mut req).await {
                Ok(v) => v,
                Err(e) => return e.into_response(),
            };
            let t4 = match T4::from_request(&mut req).await {
                Ok(v) => v,
                Err(e) => return e.into_response(),
            };
            let t5 = match T5::from_request(&mut req).await {
                Ok(v) => v,
                Err(e) => return e.into_response(),
            };
            self(t1, t2, t3, t4, t5).await.into_response()
        })
    }
}

/// Type-erased handler stored in the route table.
///
/// Shared between every copy of a route, so versioned copies keep the
/// identity of the registered handler.
pub(crate) type BoxedHandler =
    Arc<dyn Fn(Request) -> Pin<Box<dyn Future<Output = Response> + Send>> + Send + Sync>;

/// Create a boxed handler from any Handler
pub(crate) fn into_boxed_handler<H, T>(handler: H) -> BoxedHandler
where
    H: Handler<T>,
    T: 'static,
{
    Arc::new(
        move |req: Request| -> Pin<Box<dyn Future<Output = Response> + Send>> {
            Box::pin(handler.clone().call(req))
        },
    )
}

/// Short handler name used for generated summaries and operation ids.
///
/// `bakery::routes::list_cookies` becomes `list_cookies`. Closures and
/// generic handlers have no usable name.
pub(crate) fn short_name(type_name: &str) -> Option<String> {
    let name = type_name.rsplit("::").next()?;
    let usable = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_');
    usable.then(|| name.to_string())
}
