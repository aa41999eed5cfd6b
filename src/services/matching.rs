// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Match checking and retrieval.
//!
//! The paginated `view-matches` endpoint is the primary source. When the
//! first page cannot be loaded the client falls back once to the
//! unpaginated all-matches listing and filters it locally; that feed is
//! marked degraded and has no further pages.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::error::{ClientError, Result};
use crate::models::wire::{self, MatchListEnvelope};
use crate::models::{
    match_color, ComparisonForm, ItemKind, Match, MatchDescriptions, MatchStatus,
    RecordMatchRequest, SimilarityResult,
};
use crate::services::RemoteGateway;

/// Per-user pagination cursor and the matches loaded so far.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchFeed {
    pub matches: Vec<Match>,
    /// Page the next non-refresh fetch will request
    pub next_page: u32,
    pub has_more: bool,
    /// Loaded through the all-matches fallback
    pub degraded: bool,
}

impl Default for MatchFeed {
    fn default() -> Self {
        Self {
            matches: Vec::new(),
            next_page: 1,
            has_more: true,
            degraded: false,
        }
    }
}

/// Keep the matches where `user_id` reported either side.
pub fn filter_matches_for_user(matches: Vec<Match>, user_id: &str) -> Vec<Match> {
    matches
        .into_iter()
        .filter(|m| m.involves_user(user_id))
        .collect()
}

/// Per-user locks serializing feed updates.
type FeedLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Match API client. Cheap to clone; clones share pagination state.
#[derive(Clone)]
pub struct MatchClient {
    gateway: Arc<dyn RemoteGateway>,
    page_size: u32,
    feeds: Arc<DashMap<String, MatchFeed>>,
    /// Held from reading a user's cursor until the updated feed is stored.
    feed_locks: FeedLocks,
}

impl MatchClient {
    pub fn new(gateway: Arc<dyn RemoteGateway>, page_size: u32) -> Self {
        Self {
            gateway,
            page_size: page_size.max(1),
            feeds: Arc::new(DashMap::new()),
            feed_locks: Arc::new(DashMap::new()),
        }
    }

    fn feed_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.feed_locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Snapshot of a user's feed.
    pub fn feed(&self, user_id: &str) -> MatchFeed {
        self.feeds
            .get(user_id)
            .map(|f| f.clone())
            .unwrap_or_default()
    }

    /// Compare two free-text descriptions.
    pub async fn check_similarity(&self, lost: &str, found: &str) -> Result<SimilarityResult> {
        let (lost, found) = (lost.trim(), found.trim());
        if lost.is_empty() || found.is_empty() {
            return Err(ClientError::Validation(
                ClientError::EMPTY_DESCRIPTIONS.to_string(),
            ));
        }

        let body = self.gateway.check_similarity(lost, found).await?;
        let result = wire::parse_similarity(&body)?;

        tracing::debug!(score = result.score, "Similarity checked");
        Ok(result)
    }

    /// Load the user's matches, one page per call.
    ///
    /// A refresh starts over at page 1 and replaces the collection; other
    /// calls append the next page. Returns the whole collection so far.
    /// Calls for the same user run one at a time.
    pub async fn fetch_user_matches(&self, user_id: &str, is_refresh: bool) -> Result<Vec<Match>> {
        let lock = self.feed_lock(user_id);
        let _guard = lock.lock().await;

        let mut feed = if is_refresh {
            MatchFeed::default()
        } else {
            self.feed(user_id)
        };

        if !feed.has_more && !is_refresh {
            return Ok(feed.matches);
        }

        let page = feed.next_page;
        let result = match self.gateway.view_matches(user_id, page, self.page_size).await {
            Ok(body) => MatchListEnvelope::parse(&body).and_then(MatchListEnvelope::require_success),
            Err(e) => Err(e),
        };

        match result {
            Ok(page_matches) => {
                let count = page_matches.len();
                feed.has_more = count == self.page_size as usize;
                feed.next_page = page + 1;
                feed.degraded = false;
                feed.matches.extend(page_matches);

                tracing::debug!(user_id, page, count, has_more = feed.has_more, "Loaded matches page");
                let matches = feed.matches.clone();
                self.feeds.insert(user_id.to_string(), feed);
                Ok(matches)
            }
            Err(e) if page == 1 => {
                tracing::warn!(user_id, error = %e, "Primary match listing failed, using fallback");
                self.load_fallback(user_id).await
            }
            Err(e) => {
                tracing::warn!(user_id, page, error = %e, "Failed to load matches page");
                Err(e)
            }
        }
    }

    /// Unpaginated fallback: every match, filtered to this user.
    pub async fn fetch_all_matches_filtered(&self, user_id: &str) -> Result<Vec<Match>> {
        let lock = self.feed_lock(user_id);
        let _guard = lock.lock().await;
        self.load_fallback(user_id).await
    }

    /// Caller holds the user's feed lock.
    async fn load_fallback(&self, user_id: &str) -> Result<Vec<Match>> {
        let body = self.gateway.all_matches().await?;
        let all = MatchListEnvelope::parse(&body)?.require_success()?;
        let total = all.len();
        let matches = filter_matches_for_user(all, user_id);

        tracing::info!(user_id, total, count = matches.len(), "Loaded matches via fallback");
        self.feeds.insert(
            user_id.to_string(),
            MatchFeed {
                matches: matches.clone(),
                next_page: 1,
                has_more: false,
                degraded: true,
            },
        );
        Ok(matches)
    }

    /// Record a match between two database items.
    ///
    /// Refused locally, without contacting the server, when the score is too
    /// low or either item id is missing.
    pub async fn record_match(
        &self,
        lost_item_id: Option<&str>,
        found_item_id: Option<&str>,
        similarity_score: f64,
        descriptions: &MatchDescriptions,
    ) -> Result<()> {
        if !match_color(similarity_score).is_recordable() {
            return Err(ClientError::Validation(ClientError::LOW_SIMILARITY.to_string()));
        }

        let (Some(lost_item_id), Some(found_item_id)) = (
            lost_item_id.filter(|id| !id.is_empty()),
            found_item_id.filter(|id| !id.is_empty()),
        ) else {
            return Err(ClientError::Validation(ClientError::DESCRIPTION_ONLY.to_string()));
        };

        let request = RecordMatchRequest {
            lost_item_id: lost_item_id.to_string(),
            found_item_id: found_item_id.to_string(),
            similarity_score,
            lost_item_description: descriptions.lost.clone(),
            found_item_description: descriptions.found.clone(),
            create_notifications: true,
        };

        let body = self.gateway.record_match(&request).await?;
        wire::require_ack(&body)?;

        tracing::info!(lost_item_id, found_item_id, similarity_score, "Recorded match");
        Ok(())
    }

    /// Record the match described by a comparison form.
    ///
    /// Checks similarity first if the form has no result yet. On success the
    /// form is cleared and the user's match list is refreshed and returned.
    pub async fn submit_comparison(
        &self,
        user_id: &str,
        form: &mut ComparisonForm,
    ) -> Result<Vec<Match>> {
        let score = match &form.similarity {
            Some(result) => result.score,
            None => {
                let result = self
                    .check_similarity(&form.lost_description, &form.found_description)
                    .await?;
                let score = result.score;
                form.similarity = Some(result);
                score
            }
        };

        let descriptions = MatchDescriptions {
            lost: form.lost_description.trim().to_string(),
            found: form.found_description.trim().to_string(),
        };
        self.record_match(
            form.lost_item_id.as_deref(),
            form.found_item_id.as_deref(),
            score,
            &descriptions,
        )
        .await?;

        form.clear();
        self.fetch_user_matches(user_id, true).await
    }

    /// Matches for a user from `GET /api/matches/user/:userId`.
    pub async fn user_matches(&self, user_id: &str) -> Result<Vec<Match>> {
        let body = self.gateway.user_matches(user_id).await?;
        MatchListEnvelope::parse(&body)?.into_matches()
    }

    pub async fn match_details(&self, match_id: &str) -> Result<Match> {
        let body = self.gateway.match_details(match_id).await?;
        wire::parse_match_details(&body)
    }

    pub async fn update_match_status(&self, match_id: &str, status: MatchStatus) -> Result<()> {
        let body = self.gateway.update_match_status(match_id, status).await?;
        wire::require_ack(&body)?;
        tracing::info!(match_id, status = status.as_str(), "Updated match status");
        Ok(())
    }

    /// Candidate matches the server computed for one item.
    pub async fn potential_matches(&self, item_id: &str, kind: ItemKind) -> Result<Vec<Match>> {
        let body = self.gateway.potential_matches(item_id, kind).await?;
        MatchListEnvelope::parse(&body)?.into_matches()
    }

    pub async fn confirm_match(&self, match_id: &str) -> Result<()> {
        let body = self.gateway.confirm_match(match_id).await?;
        wire::require_ack(&body)?;
        tracing::info!(match_id, "Confirmed match");
        Ok(())
    }
}
