//! Route policy - the single variation point between topologies
//!
//! The three bridge modes differ only in how a message's destination topic
//! is chosen. Expressing that as one enum keeps the flow engine a single
//! struct instead of a subclass hierarchy.

use shunt_protocol::Message;

use crate::{DestinationResolver, Result, RouteError, TopicMap};

/// Destination selection strategy for a flow
#[derive(Debug, Clone)]
pub enum RoutePolicy {
    /// Funnel: every message goes to one configured topic
    Fixed(String),

    /// Fan: the destination is resolved from message content
    Resolve(DestinationResolver),

    /// One-to-one: destination looked up by source topic
    Mapped(TopicMap),
}

impl RoutePolicy {
    /// Choose the destination topic for a message
    ///
    /// # Errors
    ///
    /// Fan resolution errors pass through; an unmapped source topic in
    /// one-to-one mode yields `UnmappedTopic`. `Fixed` never fails.
    pub fn destination_for(&self, message: &Message) -> Result<String> {
        match self {
            Self::Fixed(topic) => Ok(topic.clone()),
            Self::Resolve(resolver) => resolver.resolve(message),
            Self::Mapped(map) => map
                .destination(message.source_topic())
                .map(str::to_owned)
                .ok_or_else(|| RouteError::unmapped(message.source_topic())),
        }
    }

    /// Short name for logging
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Fixed(_) => "funnel",
            Self::Resolve(_) => "fan",
            Self::Mapped(_) => "one_to_one",
        }
    }
}
