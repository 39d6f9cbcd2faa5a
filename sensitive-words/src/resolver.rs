//! Entry points: a collection of policies and the pool that walks values.
//!
//! A [`Resolver`] owns the policies and a rayon pool. Every call takes a
//! [`Request`] naming the traffic direction, an optional tag, an optional
//! cancellation token and an optional pool width. The request's direction and
//! tag select the policies up front; `#[walk(tag = "...")]` markers narrow the
//! selection further inside the walked value.

use std::{fmt, slice, sync::Arc};

use rayon::{ThreadPool, ThreadPoolBuilder};
use tokio_util::sync::CancellationToken;

use crate::{
    context::Context,
    error::{Error, Result},
    options::Direction,
    policy::{MatchResult, WordPolicy},
    walk::{Walk, Walker},
};

/// Ordered policies; text is piped through them in insertion order.
#[derive(Clone, Debug, Default)]
pub struct PolicyCollection {
    policies: Vec<Arc<WordPolicy>>,
}

impl PolicyCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `policy` and returns the shared handle.
    pub fn add(&mut self, policy: impl Into<Arc<WordPolicy>>) -> Arc<WordPolicy> {
        let policy = policy.into();
        self.policies.push(Arc::clone(&policy));
        policy
    }

    /// Removes the policy with `id`.
    pub fn remove(&mut self, id: u64) -> Option<Arc<WordPolicy>> {
        let index = self.policies.iter().position(|policy| policy.id() == id)?;
        Some(self.policies.remove(index))
    }

    #[must_use]
    pub fn get(&self, id: u64) -> Option<&Arc<WordPolicy>> {
        self.policies.iter().find(|policy| policy.id() == id)
    }

    pub fn clear(&mut self) {
        self.policies.clear();
    }

    pub fn iter(&self) -> slice::Iter<'_, Arc<WordPolicy>> {
        self.policies.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Policies whose tag equals `tag`.
    pub fn by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Arc<WordPolicy>> + 'a {
        self.policies
            .iter()
            .filter(move |policy| policy.tag() == Some(tag))
    }

    /// Policies whose direction mask intersects `direction`.
    pub fn by_direction(
        &self,
        direction: Direction,
    ) -> impl Iterator<Item = &Arc<WordPolicy>> + '_ {
        self.policies
            .iter()
            .filter(move |policy| policy.direction().intersects(direction))
    }

    /// Policies a call with `direction` and `tag` runs, in order.
    ///
    /// Untagged policies pass any tag; any policy passes an absent tag.
    fn applicable(&self, direction: Direction, tag: Option<&str>) -> Vec<Arc<WordPolicy>> {
        self.by_direction(direction)
            .filter(|policy| match (policy.tag(), tag) {
                (None, _) | (_, None) => true,
                (Some(own), Some(requested)) => own == requested,
            })
            .cloned()
            .collect()
    }
}

impl<'a> IntoIterator for &'a PolicyCollection {
    type Item = &'a Arc<WordPolicy>;
    type IntoIter = slice::Iter<'a, Arc<WordPolicy>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Per-call options.
#[derive(Clone, Debug, Default)]
pub struct Request {
    direction: Direction,
    tag: Option<String>,
    cancel: Option<CancellationToken>,
    parallelism: Option<usize>,
}

impl Request {
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    /// A request from raw direction bits.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for bits outside `Default|Input|Output`.
    pub fn try_from_bits(bits: u8) -> Result<Self> {
        Direction::try_from(bits).map(Self::new)
    }

    #[must_use]
    pub fn input() -> Self {
        Self::new(Direction::INPUT)
    }

    #[must_use]
    pub fn output() -> Self {
        Self::new(Direction::OUTPUT)
    }

    #[must_use]
    pub fn all() -> Self {
        Self::new(Direction::ALL)
    }

    /// Limits the call to policies tagged `tag` or untagged.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Walks with a pool of `width` workers instead of the resolver's own.
    #[must_use]
    pub fn with_parallelism(mut self, width: usize) -> Self {
        self.parallelism = Some(width);
        self
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    #[must_use]
    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancel.as_ref()
    }

    #[must_use]
    pub const fn parallelism(&self) -> Option<usize> {
        self.parallelism
    }
}

/// Every non-empty per-leaf report of a [`Resolver::match_sensitive`] call.
#[derive(Clone, Debug, Default)]
pub struct MatchResultCollection {
    results: Vec<MatchResult>,
}

impl MatchResultCollection {
    /// Returns `true` when any leaf matched.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.results.iter().any(MatchResult::is_match)
    }

    pub fn iter(&self) -> slice::Iter<'_, MatchResult> {
        self.results.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl fmt::Display for MatchResultCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Count = {}, IsMatch = {}", self.len(), self.is_match())
    }
}

impl IntoIterator for MatchResultCollection {
    type Item = MatchResult;
    type IntoIter = std::vec::IntoIter<MatchResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a MatchResultCollection {
    type Item = &'a MatchResult;
    type IntoIter = slice::Iter<'a, MatchResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Applies a [`PolicyCollection`] to text and to [`Walk`] values.
///
/// ```
/// use sensitive_words::{Request, Resolver, Walk};
///
/// #[derive(Walk)]
/// struct Comment {
///     author: String,
///     body: String,
/// }
///
/// let mut resolver = Resolver::new(Default::default())?;
/// let policy = resolver.new_policy();
/// policy.add_words("spam");
/// policy.build()?;
/// resolver.policies_mut().add(policy);
///
/// let comment = resolver.desensitize(
///     Comment { author: "spam bot".into(), body: "buy spam".into() },
///     &Request::default(),
/// )?;
/// assert_eq!(comment.author, "**** bot");
/// assert_eq!(comment.body, "buy ****");
/// # Ok::<(), sensitive_words::Error>(())
/// ```
pub struct Resolver {
    context: Context,
    policies: PolicyCollection,
    pool: ThreadPool,
}

impl Resolver {
    /// A resolver whose pool leaves one core to the caller.
    ///
    /// # Errors
    ///
    /// [`Error::ThreadPool`] when the pool cannot be started.
    pub fn new(context: Context) -> Result<Self> {
        Self::with_parallelism(context, default_width())
    }

    /// A resolver walking with `width` workers.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for a zero width, [`Error::ThreadPool`] when
    /// the pool cannot be started.
    pub fn with_parallelism(context: Context, width: usize) -> Result<Self> {
        Ok(Self {
            context,
            policies: PolicyCollection::new(),
            pool: build_pool(width)?,
        })
    }

    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// An empty policy sharing this resolver's context.
    #[must_use]
    pub fn new_policy(&self) -> WordPolicy {
        WordPolicy::new(&self.context)
    }

    #[must_use]
    pub const fn policies(&self) -> &PolicyCollection {
        &self.policies
    }

    pub fn policies_mut(&mut self) -> &mut PolicyCollection {
        &mut self.policies
    }

    /// Width of the resolver's own pool.
    #[must_use]
    pub fn parallelism(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Pipes `text` through every applicable policy.
    ///
    /// # Errors
    ///
    /// [`Error::Canceled`] or [`Error::PatternTimeout`].
    pub fn desensitize_text(&self, text: &str, request: &Request) -> Result<String> {
        let policies = self.select(request);
        let mut text = text.to_string();
        let outcome = Walker::new(&policies, true, request.cancellation())
            .desensitize_text(&mut text, None);
        logged("desensitize_text", outcome)?;
        Ok(text)
    }

    /// Desensitizes every string leaf of `value` and returns it.
    ///
    /// # Errors
    ///
    /// [`Error::Canceled`] or [`Error::PatternTimeout`]; leaves visited before
    /// the error keep their rewritten text.
    pub fn desensitize<T: Walk>(&self, mut value: T, request: &Request) -> Result<T> {
        self.desensitize_in_place(&mut value, request)?;
        Ok(value)
    }

    /// Desensitizes every string leaf of `value` in place.
    ///
    /// # Errors
    ///
    /// See [`Resolver::desensitize`].
    pub fn desensitize_in_place<T: Walk>(&self, value: &mut T, request: &Request) -> Result<()> {
        let policies = self.select(request);
        let outcome = self.run(request, |parallel| {
            Walker::new(&policies, true, request.cancellation()).desensitize(value, None, parallel)
        });
        logged("desensitize", outcome)
    }

    /// Returns `true` as soon as any string leaf matches.
    ///
    /// # Errors
    ///
    /// [`Error::Canceled`] or [`Error::PatternTimeout`].
    pub fn contains_sensitive<T: Walk>(&self, value: &T, request: &Request) -> Result<bool> {
        let policies = self.select(request);
        let outcome = self.run(request, |parallel| {
            Walker::new(&policies, true, request.cancellation()).contains(value, None, parallel)
        });
        logged("contains_sensitive", outcome)
    }

    /// Collects the matches of every string leaf.
    ///
    /// # Errors
    ///
    /// [`Error::Canceled`] or [`Error::PatternTimeout`].
    pub fn match_sensitive<T: Walk>(
        &self,
        value: &T,
        request: &Request,
    ) -> Result<MatchResultCollection> {
        let policies = self.select(request);
        let outcome = self.run(request, |parallel| {
            Walker::new(&policies, true, request.cancellation()).matches(value, None, parallel)
        });
        logged("match_sensitive", outcome).map(|results| MatchResultCollection { results })
    }

    /// Desensitizes `value` with `policy` alone.
    ///
    /// Tags and directions play no part: the request only supplies the
    /// cancellation token and pool width.
    ///
    /// # Errors
    ///
    /// See [`Resolver::desensitize`].
    pub fn desensitize_with_policy<T: Walk>(
        &self,
        mut value: T,
        policy: &Arc<WordPolicy>,
        request: &Request,
    ) -> Result<T> {
        let outcome = self.run(request, |parallel| {
            Walker::new(slice::from_ref(policy), false, request.cancellation())
                .desensitize(&mut value, None, parallel)
        });
        logged("desensitize_with_policy", outcome)?;
        Ok(value)
    }

    /// [`Resolver::contains_sensitive`] with `policy` alone.
    ///
    /// # Errors
    ///
    /// [`Error::Canceled`] or [`Error::PatternTimeout`].
    pub fn contains_with_policy<T: Walk>(
        &self,
        value: &T,
        policy: &Arc<WordPolicy>,
        request: &Request,
    ) -> Result<bool> {
        let outcome = self.run(request, |parallel| {
            Walker::new(slice::from_ref(policy), false, request.cancellation())
                .contains(value, None, parallel)
        });
        logged("contains_with_policy", outcome)
    }

    /// [`Resolver::match_sensitive`] with `policy` alone.
    ///
    /// # Errors
    ///
    /// [`Error::Canceled`] or [`Error::PatternTimeout`].
    pub fn match_with_policy<T: Walk>(
        &self,
        value: &T,
        policy: &Arc<WordPolicy>,
        request: &Request,
    ) -> Result<MatchResultCollection> {
        let outcome = self.run(request, |parallel| {
            Walker::new(slice::from_ref(policy), false, request.cancellation())
                .matches(value, None, parallel)
        });
        logged("match_with_policy", outcome).map(|results| MatchResultCollection { results })
    }

    fn select(&self, request: &Request) -> Vec<Arc<WordPolicy>> {
        self.policies.applicable(request.direction(), request.tag())
    }

    /// Runs `walk` on the resolver's pool, or on a pool of the requested
    /// width. A single worker walks sequentially.
    fn run<R, F>(&self, request: &Request, walk: F) -> Result<R>
    where
        R: Send,
        F: FnOnce(bool) -> Result<R> + Send,
    {
        match request.parallelism() {
            Some(width) if width != self.parallelism() => {
                let pool = build_pool(width)?;
                pool.install(|| walk(width > 1))
            }
            _ => {
                let parallel = self.parallelism() > 1;
                self.pool.install(|| walk(parallel))
            }
        }
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("policies", &self.policies)
            .field("parallelism", &self.parallelism())
            .finish_non_exhaustive()
    }
}

fn default_width() -> usize {
    std::thread::available_parallelism()
        .map_or(1, |cores| cores.get().saturating_sub(1))
        .max(1)
}

fn build_pool(width: usize) -> Result<ThreadPool> {
    if width == 0 {
        return Err(Error::invalid_argument(
            "parallelism",
            "at least one worker is required",
        ));
    }
    Ok(ThreadPoolBuilder::new()
        .num_threads(width)
        .thread_name(|index| format!("sensitive-words-{index}"))
        .build()?)
}

fn logged<T>(operation: &'static str, outcome: Result<T>) -> Result<T> {
    if let Err(Error::Canceled) = &outcome {
        tracing::warn!(operation, "desensitization canceled");
    }
    outcome
}
