//! Parallel traversal applying policies at every string leaf.

use std::{borrow::Cow, sync::Arc};

use dashmap::DashSet;
use rayon::prelude::*;
use tokio_util::sync::CancellationToken;

use super::{Child, Shape, ShapeMut, SharedWalk, Walk};
use crate::{
    error::{ensure_active, Error, Result},
    policy::{MatchResult, WordPolicy},
};

/// One traversal: the policies admitted by the call and the shared nodes
/// already visited.
///
/// Siblings fan out on the current rayon pool. A subtree under a lock is
/// walked on the thread holding the lock, so a worker never steals a job
/// that waits on a lock it already holds.
pub(crate) struct Walker<'w> {
    policies: &'w [Arc<WordPolicy>],
    field_tags: bool,
    cancel: Option<&'w CancellationToken>,
    visited: DashSet<usize>,
}

impl<'w> Walker<'w> {
    /// `policies` must already pass the call's direction and tag filters.
    /// With `field_tags` off, `#[walk(tag)]` markers are ignored.
    pub(crate) fn new(
        policies: &'w [Arc<WordPolicy>],
        field_tags: bool,
        cancel: Option<&'w CancellationToken>,
    ) -> Self {
        Self {
            policies,
            field_tags,
            cancel,
            visited: DashSet::new(),
        }
    }

    fn admits(&self, policy: &WordPolicy, field_tag: Option<&str>) -> bool {
        if !self.field_tags {
            return true;
        }
        match (policy.tag(), field_tag) {
            (None, _) | (_, None) => true,
            (Some(own), Some(field)) => own == field,
        }
    }

    fn applicable<'p>(
        &'p self,
        field_tag: Option<&'p str>,
    ) -> impl Iterator<Item = &'p WordPolicy> + 'p {
        self.policies
            .iter()
            .map(Arc::as_ref)
            .filter(move |policy| self.admits(policy, field_tag))
    }

    /// Returns `false` when `node` was already visited by this traversal.
    fn enter(&self, node: &dyn SharedWalk) -> bool {
        self.visited.insert(node.identity())
    }

    /// Pipes `text` through every applicable policy, in order.
    pub(crate) fn desensitize_text(&self, text: &mut String, tag: Option<&str>) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        for policy in self.applicable(tag) {
            let rewritten = match policy.replace(text.as_str(), self.cancel)? {
                Cow::Owned(rewritten) => Some(rewritten),
                Cow::Borrowed(_) => None,
            };
            if let Some(rewritten) = rewritten {
                *text = rewritten;
            }
        }
        Ok(())
    }

    pub(crate) fn desensitize(
        &self,
        value: &mut dyn Walk,
        tag: Option<&str>,
        parallel: bool,
    ) -> Result<()> {
        ensure_active(self.cancel)?;
        match value.shape_mut() {
            ShapeMut::Text(text) => self.desensitize_text(text, tag),
            ShapeMut::Children(children) if parallel => {
                tracing::trace!(children = children.len(), "desensitizing children");
                children
                    .into_par_iter()
                    .try_for_each(|child| self.desensitize(child.value, child.tag.or(tag), true))
            }
            ShapeMut::Children(children) => children
                .into_iter()
                .try_for_each(|child| self.desensitize(child.value, child.tag.or(tag), false)),
            ShapeMut::Shared(node) => {
                if !self.enter(node) {
                    return Ok(());
                }
                let mut outcome = Ok(());
                node.with_write(&mut |inner| outcome = self.desensitize(inner, tag, false));
                outcome
            }
            ShapeMut::Opaque => Ok(()),
        }
    }

    fn text_contains(&self, text: &str, tag: Option<&str>) -> Result<bool> {
        if text.is_empty() {
            return Ok(false);
        }
        for policy in self.applicable(tag) {
            if policy.is_match(text, self.cancel)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub(crate) fn contains(
        &self,
        value: &dyn Walk,
        tag: Option<&str>,
        parallel: bool,
    ) -> Result<bool> {
        ensure_active(self.cancel)?;
        match value.shape() {
            Shape::Text(text) => self.text_contains(text, tag),
            Shape::Children(children) => {
                // Err(None) stops the fan-out on the first hit.
                let check = |child: Child<'_>| match self.contains(
                    child.value,
                    child.tag.or(tag),
                    parallel,
                ) {
                    Ok(false) => Ok(()),
                    Ok(true) => Err(None),
                    Err(err) => Err(Some(err)),
                };
                let outcome: Result<(), Option<Error>> = if parallel {
                    children.into_par_iter().try_for_each(check)
                } else {
                    children.into_iter().try_for_each(check)
                };
                match outcome {
                    Ok(()) => Ok(false),
                    Err(None) => Ok(true),
                    Err(Some(err)) => Err(err),
                }
            }
            Shape::Shared(node) => {
                if !self.enter(node) {
                    return Ok(false);
                }
                let mut outcome = Ok(false);
                node.with_read(&mut |inner| outcome = self.contains(inner, tag, false));
                outcome
            }
            Shape::Opaque => Ok(false),
        }
    }

    fn text_matches(&self, text: &str, tag: Option<&str>) -> Result<Vec<MatchResult>> {
        let mut results = Vec::new();
        if text.is_empty() {
            return Ok(results);
        }
        for policy in self.applicable(tag) {
            let result = policy.matches(text, self.cancel)?;
            if result.is_match() {
                results.push(result);
            }
        }
        Ok(results)
    }

    pub(crate) fn matches(
        &self,
        value: &dyn Walk,
        tag: Option<&str>,
        parallel: bool,
    ) -> Result<Vec<MatchResult>> {
        ensure_active(self.cancel)?;
        match value.shape() {
            Shape::Text(text) => self.text_matches(text, tag),
            Shape::Children(children) => {
                let nested: Vec<Vec<MatchResult>> = if parallel {
                    children
                        .into_par_iter()
                        .map(|child| self.matches(child.value, child.tag.or(tag), true))
                        .collect::<Result<_>>()?
                } else {
                    children
                        .into_iter()
                        .map(|child| self.matches(child.value, child.tag.or(tag), false))
                        .collect::<Result<_>>()?
                };
                Ok(nested.into_iter().flatten().collect())
            }
            Shape::Shared(node) => {
                if !self.enter(node) {
                    return Ok(Vec::new());
                }
                let mut outcome = Ok(Vec::new());
                node.with_read(&mut |inner| outcome = self.matches(inner, tag, false));
                outcome
            }
            Shape::Opaque => Ok(Vec::new()),
        }
    }
}
