//! Radix-tree request router.
//!
//! One tree per HTTP method, plus an optional fallback handler for anything
//! no tree matches (the static pages). You register a path, you get a handler.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

/// The application router.
///
/// Generic over the state type `S` every handler receives as `Arc<S>`.
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
pub struct Router<S> {
    routes: HashMap<Method, MatchitRouter<BoxedHandler<S>>>,
    fallback: Option<BoxedHandler<S>>,
}

/// Outcome of a route lookup.
pub(crate) enum Lookup<S> {
    Found(BoxedHandler<S>),
    /// The path exists, but only for these methods.
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

impl<S: Send + Sync + 'static> Router<S> {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), fallback: None }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// Panics if the path is malformed or conflicts with an existing route.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler<S>) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler<S>) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler<S>) -> Self {
        self.on(Method::Post, path, handler)
    }

    /// Handler for requests that match no route under any method.
    pub fn fallback(mut self, handler: impl Handler<S>) -> Self {
        self.fallback = Some(handler.into_boxed_handler());
        self
    }

    /// `HEAD` falls through to the `GET` route when no explicit `HEAD` route
    /// exists; hyper drops the body on the way out.
    pub(crate) fn lookup(&self, method: Method, path: &str) -> Lookup<S> {
        if let Some(found) = self.find(method, path) {
            return found;
        }
        if method == Method::Head {
            if let Some(found) = self.find(Method::Get, path) {
                return found;
            }
        }

        let mut allowed: Vec<Method> = self.routes.iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(m, _)| *m)
            .collect();
        if !allowed.is_empty() {
            allowed.sort_by_key(|m| m.as_str());
            return Lookup::MethodNotAllowed(allowed);
        }

        match &self.fallback {
            Some(handler) => Lookup::Found(Arc::clone(handler)),
            None => Lookup::NotFound,
        }
    }

    fn find(&self, method: Method, path: &str) -> Option<Lookup<S>> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        Some(Lookup::Found(Arc::clone(matched.value)))
    }
}

impl<S: Send + Sync + 'static> Default for Router<S> {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Request, Response};

    async fn noop(_req: Request, _state: Arc<()>) -> Response {
        Response::text("noop")
    }

    fn router() -> Router<()> {
        Router::new()
            .get("/api/items/{id}", noop)
            .post("/api/items", noop)
    }

    #[test]
    fn matches_wildcard_segment() {
        assert!(matches!(router().lookup(Method::Get, "/api/items/7"), Lookup::Found(_)));
        assert!(matches!(router().lookup(Method::Get, "/api/items/7/extra"), Lookup::NotFound));
    }

    #[test]
    fn head_uses_get_route() {
        assert!(matches!(router().lookup(Method::Head, "/api/items/7"), Lookup::Found(_)));
    }

    #[test]
    fn wrong_method_lists_allowed() {
        match router().lookup(Method::Delete, "/api/items") {
            Lookup::MethodNotAllowed(allowed) => assert_eq!(allowed, vec![Method::Post]),
            _ => panic!("expected 405"),
        }
    }

    #[test]
    fn unknown_path_without_fallback() {
        assert!(matches!(router().lookup(Method::Get, "/nope"), Lookup::NotFound));
    }

    #[test]
    fn unknown_path_uses_fallback() {
        let router = router().fallback(noop);
        assert!(matches!(router.lookup(Method::Get, "/index.html"), Lookup::Found(_)));
    }
}
