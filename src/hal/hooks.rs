//! User extension points: prepare hooks and link functions.
//!
//! Both are stored as shared, boxed async closures. Whether a user's hook does
//! any asynchronous work is irrelevant to the builder: it always awaits the
//! returned future before moving on. Synchronous closures can be wrapped with
//! the `sync` constructors.
//!
//! ```rust,no_run
//! use halform::hal::PrepareHook;
//!
//! let hook = PrepareHook::new(|rep| {
//!     Box::pin(async move {
//!         rep.link("mco:boss", "http://www.whitehouse.gov");
//!         Ok(())
//!     })
//! });
//! # let _ = hook;
//! ```

use crate::hal::link::Link;
use crate::hal::representation::Representation;
use futures::future::{self, BoxFuture};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type PrepareFn =
    dyn for<'a> Fn(&'a mut Representation) -> BoxFuture<'a, anyhow::Result<()>> + Send + Sync;

/// A hook that may mutate a representation before it is serialized.
#[derive(Clone)]
pub struct PrepareHook(Arc<PrepareFn>);

impl PrepareHook {
    /// Wrap an async hook.
    pub fn new<F>(hook: F) -> Self
    where
        F: for<'a> Fn(&'a mut Representation) -> BoxFuture<'a, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(hook))
    }

    /// Wrap a synchronous hook.
    pub fn sync<F>(hook: F) -> Self
    where
        F: Fn(&mut Representation) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::new(move |rep| Box::pin(future::ready(hook(rep))))
    }

    /// Run the hook to completion.
    pub async fn call(&self, rep: &mut Representation) -> anyhow::Result<()> {
        (self.0)(rep).await
    }
}

impl fmt::Debug for PrepareHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrepareHook")
    }
}

/// Entities visible to a link function.
#[derive(Debug, Clone, Copy)]
pub struct LinkContext<'a> {
    /// The entity the link belongs to (for embed hrefs, the parent entity)
    pub entity: &'a Value,
    /// The embedded entity, when resolving an embed href
    pub item: Option<&'a Value>,
    /// The parent entity, inside embedded resources
    pub parent: Option<&'a Value>,
}

type LinkFnInner = dyn for<'a> Fn(&'a Representation, LinkContext<'a>) -> BoxFuture<'a, anyhow::Result<Link>>
    + Send
    + Sync;

/// A function computing a link from the representation and its entities.
///
/// The returned href is resolved against the representation's self path but
/// never template-expanded.
#[derive(Clone)]
pub struct LinkFn(Arc<LinkFnInner>);

impl LinkFn {
    /// Wrap an async link function.
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a Representation, LinkContext<'a>) -> BoxFuture<'a, anyhow::Result<Link>>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wrap a synchronous link function.
    ///
    /// ```rust,no_run
    /// use halform::hal::LinkFn;
    /// use serde_json::json;
    ///
    /// let boss = LinkFn::sync(|rep, ctx| {
    ///     let id = ctx.entity.get("bossId").cloned().unwrap_or_default();
    ///     Ok(rep.route("person", &json!({ "id": id }))?.into())
    /// });
    /// # let _ = boss;
    /// ```
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&Representation, LinkContext<'_>) -> anyhow::Result<Link> + Send + Sync + 'static,
    {
        Self::new(move |rep, ctx| Box::pin(future::ready(f(rep, ctx))))
    }

    /// Evaluate the function.
    pub async fn call(&self, rep: &Representation, ctx: LinkContext<'_>) -> anyhow::Result<Link> {
        (self.0)(rep, ctx).await
    }
}

impl fmt::Debug for LinkFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LinkFn")
    }
}
