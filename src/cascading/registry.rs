//! Subscription Registry
//!
//! Each dynamic provider owns one registry of (subscriber, site) links, keyed
//! by the site's property and capability kind.
//! Subscribers are stored by identity, so a disposed subscriber can never be
//! reached through a dangling reference; the renderer unsubscribes it during
//! the disposal sweep.

use crate::cascading::{CapabilityKind, CascadingParameterSite};
use crate::types::ComponentId;
use std::collections::VecDeque;
use tracing::trace;

/// A live link from a subscriber's parameter site to its provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub subscriber: ComponentId,
    pub property: &'static str,
    pub capability: CapabilityKind,
}

impl Subscription {
    fn links(&self, subscriber: ComponentId, site: &CascadingParameterSite) -> bool {
        self.subscriber == subscriber
            && self.property == site.property
            && self.capability == site.capability
    }
}

/// Registration-ordered subscriptions of one provider
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscription. Returns false if it already existed.
    pub fn subscribe(&mut self, subscriber: ComponentId, site: &CascadingParameterSite) -> bool {
        if self.contains(subscriber, site) {
            return false;
        }
        trace!(
            subscriber = %subscriber,
            property = site.property,
            capability = %site.capability,
            "Subscribed"
        );
        self.subscriptions.push(Subscription {
            subscriber,
            property: site.property,
            capability: site.capability,
        });
        true
    }

    /// Remove a subscription. Removing an absent subscription is a no-op.
    pub fn unsubscribe(&mut self, subscriber: ComponentId, site: &CascadingParameterSite) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| !s.links(subscriber, site));
        let removed = self.subscriptions.len() != before;
        if removed {
            trace!(subscriber = %subscriber, property = site.property, "Unsubscribed");
        }
        removed
    }

    /// Remove every subscription held by `subscriber`; returns how many were removed.
    pub fn unsubscribe_all(&mut self, subscriber: ComponentId) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.subscriber != subscriber);
        before - self.subscriptions.len()
    }

    pub fn contains(&self, subscriber: ComponentId, site: &CascadingParameterSite) -> bool {
        self.subscriptions.iter().any(|s| s.links(subscriber, site))
    }

    pub fn is_subscribed(&self, subscriber: ComponentId) -> bool {
        self.subscriptions.iter().any(|s| s.subscriber == subscriber)
    }

    /// Distinct subscribers in registration order
    pub fn subscribers(&self) -> Vec<ComponentId> {
        let mut seen = Vec::new();
        for subscription in &self.subscriptions {
            if !seen.contains(&subscription.subscriber) {
                seen.push(subscription.subscriber);
            }
        }
        seen
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscription> {
        self.subscriptions.iter()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Start notifying the current subscribers.
    ///
    /// The returned cursor owns a snapshot of the subscriber list, so the
    /// registry can be mutated while notifications are delivered.
    pub fn notify_all(&self) -> Notification {
        Notification {
            pending: self.subscribers().into(),
        }
    }
}

/// Cursor over a notification in progress.
#[derive(Debug)]
pub struct Notification {
    pending: VecDeque<ComponentId>,
}

impl Notification {
    /// Next subscriber that is still registered, in registration order.
    ///
    /// Subscribers removed since the notification began (for example disposed
    /// by an earlier subscriber's update) are skipped.
    pub fn next_live(&mut self, registry: &SubscriptionRegistry) -> Option<ComponentId> {
        while let Some(subscriber) = self.pending.pop_front() {
            if registry.is_subscribed(subscriber) {
                return Some(subscriber);
            }
        }
        None
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}
